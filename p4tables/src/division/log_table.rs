// SPDX-License-Identifier: Apache-2.0

//! The ternary `log` table and its first-match lookup.

use super::config::DivisionConfig;
use super::keys::{gen_log_keys, TernaryKey};
use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

/// One ternary entry: `(priority, data, mask, log_value)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    /// Position in generation order; lower values win.
    pub priority: usize,
    pub data: u64,
    pub mask: u64,
    pub log_value: u32,
}

impl LogEntry {
    pub fn matches(&self, x: u64) -> bool {
        self.data == (x & self.mask)
    }
}

/// Discretized logarithm of `x`, scaled so `2^N - 1` maps to `2^l - 1`.
pub fn f_log(config: &DivisionConfig, x: f64) -> u32 {
    let scale = config.max_log() as f64;
    let v = (x.ln() / (config.max_uint() as f64).ln() * scale).round();
    // x >= 1 keeps this in [0, 2^l - 1]; the clamp only absorbs -0.0.
    v.max(0.0) as u32
}

/// Ternary log table in priority order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTable {
    entries: Vec<LogEntry>,
}

impl LogTable {
    /// Builds the table from the generated keys, evaluating each key at the
    /// midpoint of the range it covers.
    pub fn build(config: &DivisionConfig) -> Self {
        Self::from_keys(config, &gen_log_keys(config))
    }

    pub fn from_keys(config: &DivisionConfig, keys: &[TernaryKey]) -> Self {
        let entries = keys
            .iter()
            .enumerate()
            .map(|(priority, key)| LogEntry {
                priority,
                data: key.data,
                mask: key.mask,
                log_value: f_log(config, key.midpoint()),
            })
            .collect::<Vec<_>>();
        log::debug!("LogTable::from_keys; {} entries", entries.len());
        LogTable { entries }
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the first entry, in priority order, whose masked data matches
    /// `x`. This is the ternary-match semantics of the switch.
    pub fn lookup(&self, x: u64) -> Result<&LogEntry> {
        self.entries
            .iter()
            .find(|e| e.matches(x))
            .ok_or(P4TablesError::CoverageViolation { input: x })
    }

    pub fn apply(&self, x: u64) -> Result<u32> {
        self.lookup(x).map(|e| e.log_value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn small() -> (DivisionConfig, LogTable) {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        let table = LogTable::build(&config);
        (config, table)
    }

    #[test]
    fn test_log_values_small() {
        let (_, table) = small();
        let got: Vec<(usize, u64, u64, u32)> = table
            .entries()
            .iter()
            .map(|e| (e.priority, e.data, e.mask, e.log_value))
            .collect();
        assert_eq!(
            got,
            vec![
                (0, 1, 255, 0),
                (1, 2, 255, 2),
                (2, 3, 255, 3),
                (3, 4, 254, 4),
                (4, 6, 254, 5),
                (5, 8, 252, 6),
                (6, 12, 252, 7),
                (7, 16, 248, 8),
                (8, 24, 248, 9),
                (9, 32, 240, 10),
                (10, 48, 240, 11),
                (11, 64, 224, 12),
                (12, 96, 224, 13),
                (13, 128, 192, 14),
                (14, 192, 192, 15),
            ]
        );
    }

    #[test]
    fn test_lookup_hits_covering_entry() {
        let (_, table) = small();
        assert_eq!(table.apply(1).unwrap(), 0);
        assert_eq!(table.apply(100).unwrap(), 13);
        assert_eq!(table.apply(200).unwrap(), 15);
        assert_eq!(table.lookup(7).unwrap().priority, 4);
    }

    #[test]
    fn test_zero_is_not_covered() {
        let (_, table) = small();
        assert_eq!(
            table.apply(0),
            Err(P4TablesError::CoverageViolation { input: 0 })
        );
    }

    #[test]
    fn test_first_match_wins() {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        // A catch-all key after a specific one: the specific one must win.
        let keys = [
            TernaryKey {
                data: 4,
                mask: 0xfe,
                wildcard_bits: 1,
                width: 8,
            },
            TernaryKey {
                data: 0,
                mask: 0,
                wildcard_bits: 8,
                width: 8,
            },
        ];
        let table = LogTable::from_keys(&config, &keys);
        assert_eq!(table.lookup(5).unwrap().priority, 0);
        assert_eq!(table.lookup(6).unwrap().priority, 1);
    }

    #[test]
    fn test_f_log_endpoints() {
        let config = DivisionConfig::new(16, 9, 6).unwrap();
        assert_eq!(f_log(&config, 1.0), 0);
        assert_eq!(f_log(&config, 65535.0), 511);
    }
}

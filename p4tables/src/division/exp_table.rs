// SPDX-License-Identifier: Apache-2.0

//! The exact-match `exp` table mapping `[0, 2^l - 1]` back to `[1, 2^N - 1]`.

use super::config::DivisionConfig;
use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ExpEntry {
    pub key: u32,
    pub value: u64,
}

/// Inverse of the discretized logarithm.
pub fn f_log_inv(config: &DivisionConfig, key: u32) -> u64 {
    let fraction = key as f64 / config.max_log() as f64;
    (fraction * (config.max_uint() as f64).ln()).exp().round() as u64
}

/// Exact-match table sorted by key with no gaps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpTable {
    entries: Vec<ExpEntry>,
}

impl ExpTable {
    pub fn build(config: &DivisionConfig) -> Self {
        let entries: Vec<ExpEntry> = (0..=config.max_log())
            .map(|key| ExpEntry {
                key,
                value: f_log_inv(config, key),
            })
            .collect();

        let distinct = 1 + entries
            .windows(2)
            .filter(|w| w[0].value != w[1].value)
            .count();
        if distinct * 2 < entries.len() {
            log::warn!(
                "exp table for {} has only {} distinct values across {} keys",
                config,
                distinct,
                entries.len()
            );
        }
        log::debug!("ExpTable::build; {} entries", entries.len());
        ExpTable { entries }
    }

    pub fn entries(&self) -> &[ExpEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Binary search for `key`. Signed so that a negative logarithm
    /// difference is reported instead of wrapping.
    pub fn apply(&self, key: i64) -> Result<u64> {
        let miss = P4TablesError::DomainViolation {
            key,
            table_len: self.entries.len(),
        };
        let key = u32::try_from(key).map_err(|_| miss.clone())?;
        self.entries
            .binary_search_by_key(&key, |e| e.key)
            .map(|i| self.entries[i].value)
            .map_err(|_| miss)
    }

    /// Linear scan equivalent of [`ExpTable::apply`].
    pub fn apply_slow(&self, key: i64) -> Result<u64> {
        self.entries
            .iter()
            .find(|e| i64::from(e.key) == key)
            .map(|e| e.value)
            .ok_or(P4TablesError::DomainViolation {
                key,
                table_len: self.entries.len(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_values_small() {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        let table = ExpTable::build(&config);
        let values: Vec<u64> = table.entries().iter().map(|e| e.value).collect();
        assert_eq!(
            values,
            vec![1, 1, 2, 3, 4, 6, 9, 13, 19, 28, 40, 58, 84, 122, 176, 255]
        );
    }

    #[test]
    fn test_keys_dense_and_sorted() {
        let config = DivisionConfig::new(16, 9, 6).unwrap();
        let table = ExpTable::build(&config);
        assert_eq!(table.len(), 512);
        for (i, e) in table.entries().iter().enumerate() {
            assert_eq!(e.key as usize, i);
        }
        assert_eq!(table.apply(0).unwrap(), 1);
        assert_eq!(table.apply(511).unwrap(), 65535);
    }

    #[test]
    fn test_out_of_domain() {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        let table = ExpTable::build(&config);
        for key in [-1i64, 16, i64::MAX] {
            assert_eq!(
                table.apply(key),
                Err(P4TablesError::DomainViolation { key, table_len: 16 })
            );
            assert_eq!(table.apply(key), table.apply_slow(key));
        }
    }

    #[test]
    fn test_binary_search_agrees_with_scan() {
        let config = DivisionConfig::new(12, 7, 4).unwrap();
        let table = ExpTable::build(&config);
        for key in 0..=i64::from(config.max_log()) {
            assert_eq!(table.apply(key), table.apply_slow(key));
        }
    }
}

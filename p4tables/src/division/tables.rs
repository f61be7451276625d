// SPDX-License-Identifier: Apache-2.0

//! Approximate integer division as `exp(log(a) - log(b))` over the two lookup
//! tables.

use super::config::DivisionConfig;
use super::exp_table::ExpTable;
use super::log_table::LogTable;
use crate::p4tables_error::Result;
use serde::Serialize;

/// Entry counts and estimated switch memory for a built table pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TableStats {
    pub log_entries: usize,
    pub exp_entries: usize,
    /// Ternary entries store data and mask (2N bits) plus an l-bit value.
    pub log_table_bits: u64,
    /// Exact entries store an l-bit key and an N-bit value.
    pub exp_table_bits: u64,
}

impl TableStats {
    pub fn total_bytes(&self) -> f64 {
        (self.log_table_bits + self.exp_table_bits) as f64 / 8.0
    }
}

/// The immutable pair of tables built for one configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DivisionTables {
    config: DivisionConfig,
    log_table: LogTable,
    exp_table: ExpTable,
}

impl DivisionTables {
    pub fn build(config: DivisionConfig) -> Self {
        let log_table = LogTable::build(&config);
        let exp_table = ExpTable::build(&config);
        log::info!(
            "built division tables for {}: len(log_table) = {}, len(exp_table) = {}",
            config,
            log_table.len(),
            exp_table.len()
        );
        DivisionTables {
            config,
            log_table,
            exp_table,
        }
    }

    pub fn config(&self) -> &DivisionConfig {
        &self.config
    }

    pub fn log_table(&self) -> &LogTable {
        &self.log_table
    }

    pub fn exp_table(&self) -> &ExpTable {
        &self.exp_table
    }

    pub fn apply_log_table(&self, x: u64) -> Result<u32> {
        self.log_table.apply(x)
    }

    pub fn apply_exp_table(&self, k: i64) -> Result<u64> {
        self.exp_table.apply(k)
    }

    /// Approximates `a / b` for `a >= b > 0`; returns 0 when either operand
    /// is zero or `b > a`. Operands wider than `N` bits are rejected before
    /// any lookup.
    pub fn divide(&self, a: u64, b: u64) -> Result<u64> {
        self.config.check_size(a)?;
        self.config.check_size(b)?;

        if a == 0 || b == 0 || b > a {
            return Ok(0);
        }

        let log_a = self.apply_log_table(a)?;
        let log_b = self.apply_log_table(b)?;
        let diff = i64::from(log_a) - i64::from(log_b);
        if diff < 0 {
            log::warn!(
                "divide({}, {}): log difference {} - {} is negative",
                a,
                b,
                log_a,
                log_b
            );
        }
        self.apply_exp_table(diff)
    }

    pub fn stats(&self) -> TableStats {
        let n = u64::from(self.config.uint_bits());
        let l = u64::from(self.config.log_bits());
        TableStats {
            log_entries: self.log_table.len(),
            exp_entries: self.exp_table.len(),
            log_table_bits: self.log_table.len() as u64 * (2 * n + l),
            exp_table_bits: self.exp_table.len() as u64 * (l + n),
        }
    }
}

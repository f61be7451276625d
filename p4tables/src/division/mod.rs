// SPDX-License-Identifier: Apache-2.0

//! Integer division for match-action pipelines that have no divide unit.
//!
//! `a / b` is computed as `exp(log(a) - log(b))`. `log` is a ternary table
//! whose keys keep the `m` most significant bits of the input and wildcard the
//! rest, so its size is `(2^m - 1) + (N - m) * 2^(m-1)` rather than `2^N`.
//! `exp` is an exact-match table over every `l`-bit logarithm.
//!
//! ```
//! use p4tables::division::{DivisionConfig, DivisionTables};
//!
//! let tables = DivisionTables::build(DivisionConfig::new(8, 4, 2).unwrap());
//! assert_eq!(tables.divide(200, 100).unwrap(), 2);
//! assert_eq!(tables.divide(3, 4).unwrap(), 0);
//! ```
//!
//! All `round` operations are half-away-from-zero (`f64::round`).

pub mod accuracy;
mod config;
mod exp_table;
mod keys;
mod log_table;
mod tables;

pub use config::{
    DivisionConfig, DEFAULT_LOG_ACCURACY, DEFAULT_LOG_BITS, DEFAULT_UINT_BITS, MAX_LOG_BITS,
    MAX_UINT_BITS,
};
pub use exp_table::{f_log_inv, ExpEntry, ExpTable};
pub use keys::{gen_log_keys, TernaryKey};
pub use log_table::{f_log, LogEntry, LogTable};
pub use tables::{DivisionTables, TableStats};

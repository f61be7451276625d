// SPDX-License-Identifier: Apache-2.0

use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

/// Largest supported operand width. Every exp-table value, and the scale
/// constant `2^N - 1`, stays exact through `f64` arithmetic at this width.
pub const MAX_UINT_BITS: u32 = 32;

/// Largest supported logarithm width; bounds the exp table at 2^20 entries.
pub const MAX_LOG_BITS: u32 = 20;

pub const DEFAULT_UINT_BITS: u32 = 31;
pub const DEFAULT_LOG_BITS: u32 = 10;
pub const DEFAULT_LOG_ACCURACY: u32 = 6;

/// The `(N, l, m)` triple a pair of division tables is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DivisionConfig {
    /// `N`: bit width of the operands and of the quotient.
    uint_bits: u32,
    /// `l`: bit width of the discretized logarithm.
    log_bits: u32,
    /// `m`: number of significant high-order bits kept exact in every key.
    log_accuracy: u32,
}

impl DivisionConfig {
    pub fn new(uint_bits: u32, log_bits: u32, log_accuracy: u32) -> Result<Self> {
        if !(2..=MAX_UINT_BITS).contains(&uint_bits) {
            return Err(P4TablesError::invalid_config(
                "division",
                format!(
                    "uint_bits (N) must be in [2, {}]; got {}",
                    MAX_UINT_BITS, uint_bits
                ),
            ));
        }
        if !(1..=MAX_LOG_BITS).contains(&log_bits) {
            return Err(P4TablesError::invalid_config(
                "division",
                format!(
                    "log_bits (l) must be in [1, {}]; got {}",
                    MAX_LOG_BITS, log_bits
                ),
            ));
        }
        if log_accuracy < 1 || log_accuracy > uint_bits {
            return Err(P4TablesError::invalid_config(
                "division",
                format!(
                    "log_accuracy (m) must be in [1, uint_bits={}]; got {}",
                    uint_bits, log_accuracy
                ),
            ));
        }
        Ok(DivisionConfig {
            uint_bits,
            log_bits,
            log_accuracy,
        })
    }

    pub fn uint_bits(&self) -> u32 {
        self.uint_bits
    }

    pub fn log_bits(&self) -> u32 {
        self.log_bits
    }

    pub fn log_accuracy(&self) -> u32 {
        self.log_accuracy
    }

    /// `2^N - 1`, the largest operand value.
    pub fn max_uint(&self) -> u64 {
        (1u64 << self.uint_bits) - 1
    }

    /// `2^l - 1`, the largest discretized logarithm.
    pub fn max_log(&self) -> u32 {
        (1u32 << self.log_bits) - 1
    }

    /// Number of ternary keys the generator emits:
    /// `(2^m - 1) + (N - m) * 2^(m-1)`.
    pub fn expected_key_count(&self) -> usize {
        let m = self.log_accuracy;
        let exact = (1usize << m) - 1;
        let per_run = 1usize << (m - 1);
        exact + (self.uint_bits - m) as usize * per_run
    }

    /// Returns an error if `value` needs more than `N` bits.
    pub fn check_size(&self, value: u64) -> Result<()> {
        if value > self.max_uint() {
            return Err(P4TablesError::Size {
                value,
                bits: self.uint_bits,
            });
        }
        Ok(())
    }
}

impl Default for DivisionConfig {
    fn default() -> Self {
        DivisionConfig {
            uint_bits: DEFAULT_UINT_BITS,
            log_bits: DEFAULT_LOG_BITS,
            log_accuracy: DEFAULT_LOG_ACCURACY,
        }
    }
}

impl std::fmt::Display for DivisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "N={} l={} m={}",
            self.uint_bits, self.log_bits, self.log_accuracy
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(1, 4, 1; "operand width too small")]
    #[test_case(33, 10, 6; "operand width too large")]
    #[test_case(16, 0, 6; "zero log width")]
    #[test_case(16, 21, 6; "log width too large")]
    #[test_case(16, 9, 0; "zero accuracy")]
    #[test_case(8, 4, 9; "accuracy wider than operand")]
    fn test_rejects_invalid(n: u32, l: u32, m: u32) {
        let err = DivisionConfig::new(n, l, m).unwrap_err();
        assert!(matches!(
            err,
            P4TablesError::InvalidConfig {
                what: "division",
                ..
            }
        ));
    }

    #[test_case(8, 4, 2, 15)]
    #[test_case(16, 9, 6, 383)]
    #[test_case(32, 10, 6, 895)]
    #[test_case(8, 8, 8, 255; "no wildcard runs")]
    #[test_case(10, 6, 1, 10; "single significant bit")]
    fn test_expected_key_count(n: u32, l: u32, m: u32, want: usize) {
        let config = DivisionConfig::new(n, l, m).unwrap();
        assert_eq!(config.expected_key_count(), want);
    }

    #[test]
    fn test_check_size_boundary() {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        assert!(config.check_size(0).is_ok());
        assert!(config.check_size(255).is_ok());
        assert_eq!(
            config.check_size(256),
            Err(P4TablesError::Size {
                value: 256,
                bits: 8
            })
        );
    }

    #[test]
    fn test_default_matches_generator_defaults() {
        let config = DivisionConfig::default();
        assert_eq!(config.to_string(), "N=31 l=10 m=6");
        assert_eq!(config.max_uint(), 0x7fff_ffff);
        assert_eq!(config.max_log(), 1023);
    }
}

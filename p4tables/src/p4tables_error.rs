// SPDX-License-Identifier: Apache-2.0

/// Failures surfaced by the table generators and the software lookup engine.
///
/// `Size` and `InvalidConfig` are caller errors. `CoverageViolation` and
/// `DomainViolation` mean a built table broke one of its construction
/// invariants; callers usually abort the build that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum P4TablesError {
    InvalidConfig { what: &'static str, detail: String },
    /// An operand does not fit in `bits` bits.
    Size { value: u64, bits: u32 },
    /// No ternary log-table entry matched a nonzero input.
    CoverageViolation { input: u64 },
    /// The exp table has no entry for `key` (including negative keys).
    DomainViolation { key: i64, table_len: usize },
}

impl P4TablesError {
    pub(crate) fn invalid_config(what: &'static str, detail: impl Into<String>) -> Self {
        P4TablesError::InvalidConfig {
            what,
            detail: detail.into(),
        }
    }
}

impl std::fmt::Display for P4TablesError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            P4TablesError::InvalidConfig { what, detail } => {
                write!(f, "invalid {} configuration: {}", what, detail)
            }
            P4TablesError::Size { value, bits } => {
                write!(f, "{} cannot be represented in {} bits", value, bits)
            }
            P4TablesError::CoverageViolation { input } => {
                write!(f, "could not find match in log_table for input {}", input)
            }
            P4TablesError::DomainViolation { key, table_len } => write!(
                f,
                "could not find match in exp_table for input {} (table has {} entries)",
                key, table_len
            ),
        }
    }
}

impl std::error::Error for P4TablesError {}

pub type Result<T> = std::result::Result<T, P4TablesError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_mentions_operands() {
        let e = P4TablesError::Size {
            value: 300,
            bits: 8,
        };
        assert_eq!(e.to_string(), "300 cannot be represented in 8 bits");

        let e = P4TablesError::DomainViolation {
            key: -1,
            table_len: 16,
        };
        assert!(e.to_string().contains("-1"));
    }
}

// SPDX-License-Identifier: Apache-2.0

//! Measures how far the table-based quotient strays from the real quotient.

use super::tables::DivisionTables;
use crate::p4tables_error::Result;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;

/// Operand widths up to this are evaluated over every `a >= b > 0` pair.
pub const EXHAUSTIVE_MAX_UINT_BITS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorstCase {
    pub a: u64,
    pub b: u64,
    pub approx: u64,
    pub exact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccuracyReport {
    pub samples: u64,
    pub exhaustive: bool,
    pub max_abs_error: f64,
    pub mean_abs_error: f64,
    pub max_rel_error: f64,
    pub worst_case: Option<WorstCase>,
}

#[derive(Default)]
struct Accumulator {
    samples: u64,
    sum_abs_error: f64,
    max_abs_error: f64,
    max_rel_error: f64,
    worst_case: Option<WorstCase>,
}

impl Accumulator {
    fn add(&mut self, tables: &DivisionTables, a: u64, b: u64) -> Result<()> {
        let approx = tables.divide(a, b)?;
        let exact = a as f64 / b as f64;
        let abs_error = (approx as f64 - exact).abs();
        self.samples += 1;
        self.sum_abs_error += abs_error;
        self.max_rel_error = self.max_rel_error.max(abs_error / exact);
        if self.worst_case.is_none() || abs_error > self.max_abs_error {
            self.max_abs_error = abs_error;
            self.worst_case = Some(WorstCase {
                a,
                b,
                approx,
                exact,
            });
        }
        Ok(())
    }

    fn finish(self, exhaustive: bool) -> AccuracyReport {
        let mean_abs_error = if self.samples == 0 {
            0.0
        } else {
            self.sum_abs_error / self.samples as f64
        };
        AccuracyReport {
            samples: self.samples,
            exhaustive,
            max_abs_error: self.max_abs_error,
            mean_abs_error,
            max_rel_error: self.max_rel_error,
            worst_case: self.worst_case,
        }
    }
}

/// Evaluates every pair `a >= b > 0` in `[1, 2^N - 1]`.
pub fn evaluate_exhaustive(tables: &DivisionTables) -> Result<AccuracyReport> {
    let max = tables.config().max_uint();
    let mut acc = Accumulator::default();
    for a in 1..=max {
        for b in 1..=a {
            acc.add(tables, a, b)?;
        }
    }
    Ok(acc.finish(true))
}

/// Evaluates `samples` pairs drawn deterministically from `seed`: `a` is
/// uniform over `[1, 2^N - 1]` and `b` uniform over `[1, a]`.
pub fn evaluate_sampled(
    tables: &DivisionTables,
    samples: u64,
    seed: u64,
) -> Result<AccuracyReport> {
    let max = tables.config().max_uint();
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut acc = Accumulator::default();
    for _ in 0..samples {
        let a = rng.gen_range(1..=max);
        let b = rng.gen_range(1..=a);
        acc.add(tables, a, b)?;
    }
    Ok(acc.finish(false))
}

/// Exhaustive for narrow operands, sampled otherwise.
pub fn evaluate(tables: &DivisionTables, samples: u64, seed: u64) -> Result<AccuracyReport> {
    if tables.config().uint_bits() <= EXHAUSTIVE_MAX_UINT_BITS {
        evaluate_exhaustive(tables)
    } else {
        evaluate_sampled(tables, samples, seed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::DivisionConfig;

    #[test]
    fn test_exhaustive_small() {
        let tables = DivisionTables::build(DivisionConfig::new(8, 4, 2).unwrap());
        let report = evaluate(&tables, 0, 0).unwrap();
        assert!(report.exhaustive);
        assert_eq!(report.samples, 255 * 256 / 2);
        let worst = report.worst_case.unwrap();
        assert_eq!(
            (worst.approx as f64 - worst.exact).abs(),
            report.max_abs_error
        );
        assert!(report.mean_abs_error <= report.max_abs_error);
    }

    #[test]
    fn test_sampled_is_deterministic() {
        let tables = DivisionTables::build(DivisionConfig::new(24, 10, 6).unwrap());
        let first = evaluate(&tables, 500, 7).unwrap();
        let second = evaluate(&tables, 500, 7).unwrap();
        assert!(!first.exhaustive);
        assert_eq!(first.samples, 500);
        assert_eq!(first, second);
    }

    #[test]
    fn test_finer_log_is_more_accurate() {
        let config = |l| DivisionConfig::new(8, l, 4).unwrap();
        let coarse = evaluate_exhaustive(&DivisionTables::build(config(3))).unwrap();
        let fine = evaluate_exhaustive(&DivisionTables::build(config(10))).unwrap();
        assert!(fine.mean_abs_error < coarse.mean_abs_error);
    }
}

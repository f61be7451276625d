// SPDX-License-Identifier: Apache-2.0

//! RED drop probability as an exact-match table over the (averaged) queue
//! size, quantized to `bits` bits.

use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

/// Drop probability of a queue above the maximum threshold.
pub const MAX_DROP_PROB: u64 = 256;

pub const MAX_QUEUE_BITS: u32 = 24;

fn full_scale(bits: u32) -> f64 {
    ((1u64 << bits) - 1) as f64
}

/// Quantizes a byte count to `[0, 2^bits - 1]`.
pub fn map_to_int(size: f64, max_size: f64, bits: u32) -> u64 {
    (size / max_size * full_scale(bits)).round().max(0.0) as u64
}

/// Inverse of [`map_to_int`], without rounding.
pub fn map_to_bytes(value: u64, max_size: f64, bits: u32) -> f64 {
    value as f64 / full_scale(bits) * max_size
}

/// Byte-valued RED configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RedParams {
    pub bits: u32,
    pub max_size: f64,
    pub low: f64,
    pub upper: f64,
}

/// RED thresholds on the quantized queue size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedThresholds {
    pub bits: u32,
    pub min_th: u64,
    pub max_th: u64,
}

impl RedParams {
    pub fn thresholds(&self) -> Result<RedThresholds> {
        if !(1..=MAX_QUEUE_BITS).contains(&self.bits) {
            return Err(P4TablesError::invalid_config(
                "red",
                format!("bits must be in [1, {}]; got {}", MAX_QUEUE_BITS, self.bits),
            ));
        }
        if !(self.max_size > 0.0) {
            return Err(P4TablesError::invalid_config(
                "red",
                format!("max_size must be positive; got {}", self.max_size),
            ));
        }
        let min_th = map_to_int(self.low, self.max_size, self.bits);
        let max_th = map_to_int(self.upper, self.max_size, self.bits);
        if max_th <= min_th {
            return Err(P4TablesError::invalid_config(
                "red",
                format!(
                    "upper threshold must quantize above the lower one; min_th={} max_th={}",
                    min_th, max_th
                ),
            ));
        }
        Ok(RedThresholds {
            bits: self.bits,
            min_th,
            max_th,
        })
    }
}

impl RedThresholds {
    /// Slope and offset of the linear ramp `p = slope * qsize + offset`
    /// between the thresholds, normalized to `[0, 1]`.
    pub fn ramp(&self) -> (f64, f64) {
        let diff = (self.max_th - self.min_th) as f64;
        (1.0 / diff, -(self.min_th as f64) / diff)
    }

    pub fn drop_probability(&self, qsize: u64) -> u64 {
        if qsize < self.min_th {
            0
        } else if qsize > self.max_th {
            MAX_DROP_PROB
        } else {
            let p = MAX_DROP_PROB * (qsize - self.min_th) / (self.max_th - self.min_th);
            p.min(MAX_DROP_PROB)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RedDropEntry {
    pub qsize: u64,
    pub drop_prob: u64,
}

/// One entry per quantized queue size `[0, 2^bits - 1]`.
pub fn drop_probability_entries(thresholds: &RedThresholds) -> Vec<RedDropEntry> {
    (0..(1u64 << thresholds.bits))
        .map(|qsize| RedDropEntry {
            qsize,
            drop_prob: thresholds.drop_probability(qsize),
        })
        .collect()
}

/// `(bytes, drop_prob)` points for plotting the table.
pub fn plot_points(entries: &[RedDropEntry], max_size: f64, bits: u32) -> Vec<(f64, u64)> {
    entries
        .iter()
        .map(|e| (map_to_bytes(e.qsize, max_size, bits), e.drop_prob))
        .collect()
}

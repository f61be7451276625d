// SPDX-License-Identifier: Apache-2.0

//! Parameters of the approximate-fair-dropping (AFD) prototype besides the
//! division tables: the drop probability indexed by the arrival/fair-share
//! ratio, and the initial value of the `fair_count` register.

use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

/// Number of entries in the `calc_drop_prob` table (ratios `0..=255`).
pub const DROP_PROB_RATIOS: u32 = 256;

pub const DEFAULT_MAX_RAND: u64 = 255;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DropProbEntry {
    pub ratio: u32,
    pub drop_prob: u64,
}

/// Drop probability `1 - 1/ratio`, scaled to `[0, max_rand]`. Ratio zero never
/// drops.
pub fn drop_probability_entries(max_rand: u64) -> Vec<DropProbEntry> {
    (0..DROP_PROB_RATIOS)
        .map(|ratio| {
            let drop_prob = if ratio == 0 {
                0
            } else {
                ((1.0 - 1.0 / f64::from(ratio)) * max_rand as f64).round() as u64
            };
            DropProbEntry { ratio, drop_prob }
        })
        .collect()
}

/// Workload description used to seed the `fair_count` register:
/// `fair_count = shadow_buf_pkts * (fair_share / ingress_rate)` packets,
/// expressed in the same `uint_bits`-wide fixed point as the queue size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairCountParams {
    /// Packets held in the shadow buffer (`b` in the AFD paper).
    pub shadow_buf_pkts: u64,
    pub fair_share: f64,
    /// Total ingress rate, in the same units as `fair_share`.
    pub ingress_rate: f64,
    /// Maximum queue size in bytes; maps to `2^uint_bits - 1`.
    pub max_buf_size: f64,
    pub pkt_size: f64,
    pub uint_bits: u32,
}

impl Default for FairCountParams {
    fn default() -> Self {
        FairCountParams {
            shadow_buf_pkts: 512,
            fair_share: 4.0,
            ingress_rate: 14.0,
            max_buf_size: 600000.0,
            pkt_size: 1000.0,
            uint_bits: crate::division::DEFAULT_UINT_BITS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FairCount {
    /// Register value.
    pub value: u64,
    /// The register value converted back to bytes.
    pub bytes: f64,
}

impl FairCountParams {
    fn validate(&self) -> Result<()> {
        if !(self.ingress_rate > 0.0) {
            return Err(P4TablesError::invalid_config(
                "afd",
                format!("ingress_rate must be positive; got {}", self.ingress_rate),
            ));
        }
        if !(self.max_buf_size > 0.0) {
            return Err(P4TablesError::invalid_config(
                "afd",
                format!("max_buf_size must be positive; got {}", self.max_buf_size),
            ));
        }
        if !(1..=crate::division::MAX_UINT_BITS).contains(&self.uint_bits) {
            return Err(P4TablesError::invalid_config(
                "afd",
                format!("uint_bits out of range; got {}", self.uint_bits),
            ));
        }
        Ok(())
    }

    pub fn fair_count(&self) -> Result<FairCount> {
        self.validate()?;
        let full_scale = ((1u64 << self.uint_bits) - 1) as f64;
        let fair_bytes =
            (self.shadow_buf_pkts as f64 * self.fair_share / self.ingress_rate) * self.pkt_size;
        let value = (fair_bytes / self.max_buf_size * full_scale).round().max(0.0) as u64;
        let bytes = value as f64 / full_scale * self.max_buf_size;
        log::debug!(
            "fair_count; {} bytes => register value {}",
            fair_bytes,
            value
        );
        Ok(FairCount { value, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_probabilities() {
        let entries = drop_probability_entries(255);
        assert_eq!(entries.len(), 256);
        let probe: Vec<u64> = [0usize, 1, 2, 3, 4, 255]
            .iter()
            .map(|&i| entries[i].drop_prob)
            .collect();
        assert_eq!(probe, vec![0, 0, 128, 170, 191, 254]);
        assert!(entries.windows(2).all(|w| w[0].drop_prob <= w[1].drop_prob));
    }

    #[test]
    fn test_fair_count_defaults() {
        let fc = FairCountParams::default().fair_count().unwrap();
        assert_eq!(fc.value, 523576965);
        assert!((fc.bytes - 146285.714).abs() < 1e-2);
    }

    #[test]
    fn test_fair_count_narrow_register() {
        let params = FairCountParams {
            uint_bits: 8,
            ..FairCountParams::default()
        };
        let fc = params.fair_count().unwrap();
        assert_eq!(fc.value, 62);
    }

    #[test]
    fn test_fair_count_rejects_zero_rate() {
        let params = FairCountParams {
            ingress_rate: 0.0,
            ..FairCountParams::default()
        };
        assert!(matches!(
            params.fair_count(),
            Err(P4TablesError::InvalidConfig { what: "afd", .. })
        ));
    }
}

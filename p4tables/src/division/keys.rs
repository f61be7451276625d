// SPDX-License-Identifier: Apache-2.0

//! Generation of the ternary match keys that cover `[1, 2^N - 1]`.
//!
//! The first `2^m - 1` keys match the small values exactly. Every larger value
//! is matched by a key that keeps its `m` most significant bits (the leading
//! one and the `m - 1` bits after it) and wildcards everything below them, so
//! the key count grows linearly in `N` instead of exponentially.

use super::config::DivisionConfig;
use serde::Serialize;

/// A ternary key with a contiguous wildcard run in its low bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TernaryKey {
    /// Key bits with every wildcard position set to zero.
    pub data: u64,
    /// Ones on the matched high bits, zeros on the wildcard run.
    pub mask: u64,
    /// Length of the wildcard run.
    pub wildcard_bits: u32,
    /// Total key width `N`.
    pub width: u32,
}

impl TernaryKey {
    fn new(width: u32, prefix: u64, wildcard_bits: u32) -> Self {
        let mask_len = width - wildcard_bits;
        let mask = ((1u64 << mask_len) - 1) << wildcard_bits;
        TernaryKey {
            data: (prefix << wildcard_bits) & mask,
            mask,
            wildcard_bits,
            width,
        }
    }

    /// Smallest value the key matches (wildcards as zeros).
    pub fn min_value(&self) -> u64 {
        self.data
    }

    /// Largest value the key matches (wildcards as ones).
    pub fn max_value(&self) -> u64 {
        self.data | ((1u64 << self.wildcard_bits) - 1)
    }

    pub fn matches(&self, x: u64) -> bool {
        self.data == (x & self.mask)
    }

    /// Arithmetic midpoint of the matched range; not rounded.
    pub fn midpoint(&self) -> f64 {
        (self.min_value() as f64 + self.max_value() as f64) / 2.0
    }
}

/// Renders the key MSb-first, e.g. `00011X`.
impl std::fmt::Display for TernaryKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for bit in (0..self.width).rev() {
            let c = if bit < self.wildcard_bits {
                'X'
            } else if (self.data >> bit) & 1 == 1 {
                '1'
            } else {
                '0'
            };
            write!(f, "{}", c)?;
        }
        Ok(())
    }
}

/// Returns the keys in priority order; index 0 has the highest priority.
pub fn gen_log_keys(config: &DivisionConfig) -> Vec<TernaryKey> {
    let n = config.uint_bits();
    let m = config.log_accuracy();
    let mut keys = Vec::with_capacity(config.expected_key_count());

    for k in 1..(1u64 << m) {
        keys.push(TernaryKey::new(n, k, 0));
    }

    // Prefixes with their leading one in the top position of the m-bit window.
    let prefixes = (1u64 << (m - 1))..(1u64 << m);
    for wildcard_bits in 1..=(n - m) {
        for k in prefixes.clone() {
            keys.push(TernaryKey::new(n, k, wildcard_bits));
        }
    }

    log::debug!("gen_log_keys; {} => {} keys", config, keys.len());
    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn patterns(n: u32, l: u32, m: u32) -> Vec<String> {
        let config = DivisionConfig::new(n, l, m).unwrap();
        gen_log_keys(&config)
            .iter()
            .map(|k| k.to_string())
            .collect()
    }

    #[test]
    fn test_patterns_small() {
        assert_eq!(
            patterns(5, 4, 2),
            vec![
                "00001", "00010", "00011", // exact
                "0010X", "0011X", // one wildcard
                "010XX", "011XX", // two wildcards
                "10XXX", "11XXX", // three wildcards
            ]
        );
    }

    #[test]
    fn test_mask_and_data() {
        let config = DivisionConfig::new(8, 4, 2).unwrap();
        let keys = gen_log_keys(&config);
        assert_eq!(keys.len(), 15);
        // First wildcard key: 000010X covers [4, 5].
        let k = keys[3];
        assert_eq!(k.to_string(), "0000010X");
        assert_eq!((k.data, k.mask), (4, 0b1111_1110));
        assert_eq!((k.min_value(), k.max_value()), (4, 5));
        assert_eq!(k.midpoint(), 4.5);
        // Last key: 11XXXXXX covers [192, 255].
        let k = keys[14];
        assert_eq!((k.data, k.mask), (192, 0b1100_0000));
        assert_eq!((k.min_value(), k.max_value()), (192, 255));
    }

    #[test]
    fn test_masks_are_contiguous_prefixes() {
        let config = DivisionConfig::new(16, 9, 6).unwrap();
        let full = config.max_uint();
        for key in gen_log_keys(&config) {
            let inverted = !key.mask & full;
            // Wildcard bits form a run of low ones: inverted + 1 is a power of two.
            assert!((inverted + 1).is_power_of_two(), "key {}", key);
            assert_eq!(key.data & !key.mask, 0);
        }
    }

    #[test]
    fn test_ranges_are_contiguous_and_increasing() {
        let config = DivisionConfig::new(12, 8, 3).unwrap();
        let keys = gen_log_keys(&config);
        let mut next = 1u64;
        for key in keys.iter() {
            assert_eq!(key.min_value(), next, "gap before key {}", key);
            next = key.max_value() + 1;
        }
        assert_eq!(next, config.max_uint() + 1);
    }
}

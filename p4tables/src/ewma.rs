// SPDX-License-Identifier: Apache-2.0

//! Decay factor for the RED average queue size after the queue has been idle.
//!
//! While idle for `t` seconds the average should decay as if `t / s` empty
//! packets had arrived, i.e. by `(1 - w_q)^(t / s)` with `s` the transmission
//! time of one packet. The switch can only shift, so the factor is rounded to
//! the nearest power of two and stored as a right-shift amount in a range
//! table keyed on the idle duration in nanoseconds.

use crate::p4tables_error::{P4TablesError, Result};
use serde::Serialize;

/// Largest shift the target's shift primitive accepts.
pub const MAX_DECAY_SHIFT: u32 = 7;

/// Durations are `s^t - LOGSPACE_OFFSET`, so the first point is 0.1 seconds.
const LOGSPACE_OFFSET: f64 = 0.9;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayParams {
    pub num_entries: usize,
    /// Longest idle duration covered, in seconds.
    pub max_dur: f64,
    /// Bytes.
    pub pkt_size: f64,
    /// Bits per second.
    pub link_rate: f64,
    /// EWMA weight given to new queue samples; must match the switch program.
    pub queue_weight: f64,
}

impl Default for DecayParams {
    fn default() -> Self {
        DecayParams {
            num_entries: 10,
            max_dur: 3.0,
            pkt_size: 1000.0,
            link_rate: 1500000.0,
            queue_weight: 1.0 / 256.0,
        }
    }
}

/// Range entry `[range_min_ns, range_max_ns] => shift` at `priority`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecayEntry {
    pub priority: usize,
    pub range_min_ns: u64,
    pub range_max_ns: u64,
    pub shift: u32,
    /// Idle duration the entry was evaluated at, in seconds.
    pub idle_dur: f64,
    /// Exact decay factor at `idle_dur`.
    pub decay_factor: f64,
}

impl DecayParams {
    /// Seconds needed to transmit one packet.
    pub fn packet_time(&self) -> f64 {
        self.pkt_size * 8.0 / self.link_rate
    }

    fn validate(&self) -> Result<()> {
        let fail = |detail: String| Err(P4TablesError::invalid_config("ewma", detail));
        if !(self.queue_weight > 0.0 && self.queue_weight < 1.0) {
            return fail(format!(
                "queue_weight must be in (0, 1); got {}",
                self.queue_weight
            ));
        }
        if self.num_entries == 0 {
            return fail("num_entries must be at least 1".to_string());
        }
        if !(self.max_dur > 1.0 - LOGSPACE_OFFSET) {
            return fail(format!(
                "max_dur must exceed {} seconds; got {}",
                1.0 - LOGSPACE_OFFSET,
                self.max_dur
            ));
        }
        let s = self.packet_time();
        if !(s > 0.0) || s == 1.0 || !s.is_finite() {
            return fail(format!(
                "packet time pkt_size*8/link_rate must be positive and not 1; got {}",
                s
            ));
        }
        Ok(())
    }

    /// `num_entries` idle durations spaced logarithmically in base `s`,
    /// from 0.1 seconds to `max_dur`.
    pub fn idle_durations(&self) -> Result<Vec<f64>> {
        self.validate()?;
        let s = self.packet_time();
        let stop = (self.max_dur + LOGSPACE_OFFSET).log10() / s.log10();
        let n = self.num_entries;
        let exponents: Vec<f64> = if n == 1 {
            vec![0.0]
        } else {
            (0..n).map(|i| stop * i as f64 / (n - 1) as f64).collect()
        };
        Ok(exponents
            .into_iter()
            .map(|t| s.powf(t) - LOGSPACE_OFFSET)
            .collect())
    }

    pub fn decay_entries(&self) -> Result<Vec<DecayEntry>> {
        let s = self.packet_time();
        let entries: Vec<DecayEntry> = self
            .idle_durations()?
            .into_iter()
            .enumerate()
            .map(|(priority, idle_dur)| {
                let decay_factor = (1.0 - self.queue_weight).powf(idle_dur / s);
                // Closest negative power of two.
                let shift = (-decay_factor.log2().round()).max(0.0) as u32;
                DecayEntry {
                    priority,
                    range_min_ns: 0,
                    range_max_ns: (idle_dur * 1e9).round() as u64,
                    shift: shift.min(MAX_DECAY_SHIFT),
                    idle_dur,
                    decay_factor,
                }
            })
            .collect();
        log::debug!(
            "decay_entries; s={} => {} entries, last shift {:?}",
            s,
            entries.len(),
            entries.last().map(|e| e.shift)
        );
        Ok(entries)
    }
}

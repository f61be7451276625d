// SPDX-License-Identifier: Apache-2.0

//! Optional TOML configuration. Every key mirrors a command line flag of the
//! same name; a flag given on the command line wins over the file, and the
//! file wins over the built-in default.
//!
//! ```toml
//! [division]
//! uint_bits = 16
//! log_bits = 9
//! log_accuracy = 6
//!
//! [red]
//! bits = 13
//! max_size = 500000
//! low = 5000
//! upper = 15000
//! ```

use clap::ArgMatches;
use p4tables::division::{
    DivisionConfig, DEFAULT_LOG_ACCURACY, DEFAULT_LOG_BITS, DEFAULT_UINT_BITS,
};
use p4tables::P4TablesError;
use serde::Deserialize;

pub const CONFIG_FILE_NAME: &str = "p4tables.toml";

#[derive(Deserialize, Default, Debug)]
#[serde(deny_unknown_fields)]
pub struct TablesConfig {
    pub division: Option<DivisionSection>,
    pub afd: Option<AfdSection>,
    pub red: Option<RedSection>,
    pub ewma: Option<EwmaSection>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct DivisionSection {
    pub uint_bits: Option<u32>,
    pub log_bits: Option<u32>,
    pub log_accuracy: Option<u32>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct AfdSection {
    pub max_rand: Option<u64>,
    pub shadow_buf_pkts: Option<u64>,
    pub fairshare: Option<f64>,
    pub ingress_rate: Option<f64>,
    pub max_buf_size: Option<f64>,
    pub pkt_size: Option<f64>,
    pub output: Option<String>,
}

/// Thresholds shared by `red-commands` and `red-ewma-commands`.
#[derive(Deserialize, Default, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct RedSection {
    pub bits: Option<u32>,
    pub max_size: Option<f64>,
    pub low: Option<f64>,
    pub upper: Option<f64>,
    pub output: Option<String>,
    pub data_output: Option<String>,
}

#[derive(Deserialize, Default, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct EwmaSection {
    pub max_dur: Option<f64>,
    pub num_decay_entries: Option<usize>,
    pub pkt_size: Option<f64>,
    pub link_rate: Option<f64>,
    pub queue_weight: Option<f64>,
}

impl TablesConfig {
    pub fn division(&self) -> DivisionSection {
        self.division.clone().unwrap_or_default()
    }

    pub fn afd(&self) -> AfdSection {
        self.afd.clone().unwrap_or_default()
    }

    pub fn red(&self) -> RedSection {
        self.red.clone().unwrap_or_default()
    }

    pub fn ewma(&self) -> EwmaSection {
        self.ewma.clone().unwrap_or_default()
    }
}

/// Picks the command line value for `id` if present, else `from_config`.
/// Subcommands that do not define `id` fall through to the config.
pub fn flag_or<T: Clone + Send + Sync + 'static>(
    matches: &ArgMatches,
    id: &str,
    from_config: Option<T>,
) -> Option<T> {
    match matches.try_get_one::<T>(id) {
        Ok(Some(v)) => Some(v.clone()),
        _ => from_config,
    }
}

/// Resolves the `(N, l, m)` division flags against the config.
pub fn get_division_config(
    matches: &ArgMatches,
    config: &Option<TablesConfig>,
) -> Result<DivisionConfig, P4TablesError> {
    let section = config
        .as_ref()
        .map(|c| c.division())
        .unwrap_or_default();
    let uint_bits =
        flag_or(matches, "uint_bits", section.uint_bits).unwrap_or(DEFAULT_UINT_BITS);
    let log_bits = flag_or(matches, "log_bits", section.log_bits).unwrap_or(DEFAULT_LOG_BITS);
    let log_accuracy =
        flag_or(matches, "log_accuracy", section.log_accuracy).unwrap_or(DEFAULT_LOG_ACCURACY);
    DivisionConfig::new(uint_bits, log_bits, log_accuracy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sections() {
        let text = r#"
[division]
uint_bits = 16
log_bits = 9

[ewma]
queue_weight = 0.125
"#;
        let config: TablesConfig = toml::from_str(text).unwrap();
        let division = config.division();
        assert_eq!(division.uint_bits, Some(16));
        assert_eq!(division.log_accuracy, None);
        assert_eq!(config.ewma().queue_weight, Some(0.125));
        assert!(config.red.is_none());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let text = "[division]\nbits = 16\n";
        assert!(toml::from_str::<TablesConfig>(text).is_err());
    }

    #[test]
    fn test_flag_overrides_config() {
        let mut cmd = clap::Command::new("t");
        for id in ["uint_bits", "log_bits", "log_accuracy"] {
            cmd = cmd.arg(
                clap::Arg::new(id)
                    .long(id)
                    .value_parser(clap::value_parser!(u32)),
            );
        }
        let config = Some(TablesConfig {
            division: Some(DivisionSection {
                uint_bits: Some(16),
                log_bits: Some(9),
                log_accuracy: None,
            }),
            ..TablesConfig::default()
        });

        let matches = cmd.clone().get_matches_from(["t", "--uint_bits", "20"]);
        let resolved = get_division_config(&matches, &config).unwrap();
        assert_eq!(resolved.uint_bits(), 20);
        assert_eq!(resolved.log_bits(), 9);
        assert_eq!(resolved.log_accuracy(), DEFAULT_LOG_ACCURACY);

        let matches = cmd.get_matches_from(["t"]);
        let resolved = get_division_config(&matches, &config).unwrap();
        assert_eq!(resolved.uint_bits(), 16);
    }
}

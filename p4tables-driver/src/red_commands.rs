// SPDX-License-Identifier: Apache-2.0

//! `red-commands` and `red-ewma-commands`: the RED drop probability table,
//! optionally preceded by the idle-time decay factor table.

use crate::afd_commands::DEFAULT_COMMANDS_FILE;
use crate::report_cli_error::or_exit;
use crate::tables_config::{flag_or, TablesConfig};
use anyhow::{anyhow, Context};
use clap::ArgMatches;
use p4tables::commands;
use p4tables::ewma::DecayParams;
use p4tables::red::{self, RedParams, RedThresholds};
use std::io::{BufWriter, Write};

pub const DEFAULT_DATA_FILE: &str = "drop_probability.plotme";

/// Threshold defaults used by `red-ewma-commands`; `red-commands` has none.
const EWMA_RED_DEFAULTS: RedParams = RedParams {
    bits: 13,
    max_size: 500000.0,
    low: 5000.0,
    upper: 15000.0,
};

fn get_red_params(
    matches: &ArgMatches,
    config: &Option<TablesConfig>,
    bits_flag: &str,
    defaults: Option<RedParams>,
) -> anyhow::Result<RedParams> {
    let section = config.as_ref().map(|c| c.red()).unwrap_or_default();
    let missing = |flag: &str| anyhow!("--{} is required (or set it in the [red] config)", flag);
    Ok(RedParams {
        bits: flag_or(matches, bits_flag, section.bits)
            .or(defaults.map(|d| d.bits))
            .ok_or_else(|| missing(bits_flag))?,
        max_size: flag_or(matches, "max_size", section.max_size)
            .or(defaults.map(|d| d.max_size))
            .ok_or_else(|| missing("max_size"))?,
        low: flag_or(matches, "low", section.low)
            .or(defaults.map(|d| d.low))
            .ok_or_else(|| missing("low"))?,
        upper: flag_or(matches, "upper", section.upper)
            .or(defaults.map(|d| d.upper))
            .ok_or_else(|| missing("upper"))?,
    })
}

fn report_thresholds(thresholds: &RedThresholds) {
    let (slope, offset) = thresholds.ramp();
    println!("minTh = {}", thresholds.min_th);
    println!("maxTh = {}", thresholds.max_th);
    println!("slope = {}", slope);
    println!("offset = {}", offset);
}

fn create_writer(path: &str) -> anyhow::Result<BufWriter<std::fs::File>> {
    let file = std::fs::File::create(path).with_context(|| format!("could not create {}", path))?;
    Ok(BufWriter::new(file))
}

/// Writes the drop probability commands to `w` and, with `--write`, the plot
/// data file.
fn write_drop_tables<W: Write>(
    w: &mut W,
    matches: &ArgMatches,
    config: &Option<TablesConfig>,
    params: &RedParams,
) -> anyhow::Result<()> {
    let thresholds = params.thresholds()?;
    report_thresholds(&thresholds);
    let entries = red::drop_probability_entries(&thresholds);
    commands::write_red_drop_commands(w, &entries)?;

    if matches.get_flag("write") {
        let section = config.as_ref().map(|c| c.red()).unwrap_or_default();
        let data_output = flag_or(matches, "data_output", section.data_output)
            .unwrap_or_else(|| DEFAULT_DATA_FILE.to_string());
        let mut data = create_writer(&data_output)?;
        let points = red::plot_points(&entries, params.max_size, params.bits);
        commands::write_plot_data(&mut data, &points)?;
        data.flush()?;
        log::info!("wrote {} plot points to {}", points.len(), data_output);
    }
    Ok(())
}

fn output_path(matches: &ArgMatches, config: &Option<TablesConfig>) -> String {
    let section = config.as_ref().map(|c| c.red()).unwrap_or_default();
    flag_or(matches, "output", section.output).unwrap_or_else(|| DEFAULT_COMMANDS_FILE.to_string())
}

fn red_commands(matches: &ArgMatches, config: &Option<TablesConfig>) -> anyhow::Result<()> {
    let params = get_red_params(matches, config, "bits", None)?;
    let output = output_path(matches, config);
    let mut w = create_writer(&output)?;
    write_drop_tables(&mut w, matches, config, &params)?;
    w.flush()?;
    Ok(())
}

fn red_ewma_commands(matches: &ArgMatches, config: &Option<TablesConfig>) -> anyhow::Result<()> {
    let params = get_red_params(matches, config, "size_bits", Some(EWMA_RED_DEFAULTS))?;
    let section = config.as_ref().map(|c| c.ewma()).unwrap_or_default();
    let defaults = DecayParams::default();
    let decay = DecayParams {
        num_entries: flag_or(matches, "num_decay_entries", section.num_decay_entries)
            .unwrap_or(defaults.num_entries),
        max_dur: flag_or(matches, "max_dur", section.max_dur).unwrap_or(defaults.max_dur),
        pkt_size: flag_or(matches, "pkt_size", section.pkt_size).unwrap_or(defaults.pkt_size),
        link_rate: flag_or(matches, "link_rate", section.link_rate).unwrap_or(defaults.link_rate),
        queue_weight: flag_or(matches, "queue_weight", section.queue_weight)
            .unwrap_or(defaults.queue_weight),
    };
    let decay_entries = decay.decay_entries()?;

    let output = output_path(matches, config);
    let mut w = create_writer(&output)?;
    commands::write_decay_commands(&mut w, &decay_entries)?;
    write_drop_tables(&mut w, matches, config, &params)?;
    w.flush()?;
    Ok(())
}

pub fn handle_red_commands(matches: &ArgMatches, config: &Option<TablesConfig>) {
    or_exit(red_commands(matches, config), "red-commands")
}

pub fn handle_red_ewma_commands(matches: &ArgMatches, config: &Option<TablesConfig>) {
    or_exit(red_ewma_commands(matches, config), "red-ewma-commands")
}

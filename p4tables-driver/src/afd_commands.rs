// SPDX-License-Identifier: Apache-2.0

use crate::report_cli_error::or_exit;
use crate::tables_config::{flag_or, get_division_config, TablesConfig};
use anyhow::Context;
use clap::ArgMatches;
use p4tables::afd::{self, FairCountParams, DEFAULT_MAX_RAND};
use p4tables::commands;
use p4tables::division::DivisionTables;
use std::io::{BufWriter, Write};

pub const DEFAULT_COMMANDS_FILE: &str = "commands.txt";

fn afd_commands(matches: &ArgMatches, config: &Option<TablesConfig>) -> anyhow::Result<()> {
    let section = config.as_ref().map(|c| c.afd()).unwrap_or_default();
    let division_config = get_division_config(matches, config)?;

    let defaults = FairCountParams::default();
    let params = FairCountParams {
        shadow_buf_pkts: flag_or(matches, "shadow_buf_pkts", section.shadow_buf_pkts)
            .unwrap_or(defaults.shadow_buf_pkts),
        fair_share: flag_or(matches, "fairshare", section.fairshare).unwrap_or(defaults.fair_share),
        ingress_rate: flag_or(matches, "ingress_rate", section.ingress_rate)
            .unwrap_or(defaults.ingress_rate),
        max_buf_size: flag_or(matches, "max_buf_size", section.max_buf_size)
            .unwrap_or(defaults.max_buf_size),
        pkt_size: flag_or(matches, "pkt_size", section.pkt_size).unwrap_or(defaults.pkt_size),
        uint_bits: division_config.uint_bits(),
    };
    let max_rand = flag_or(matches, "max_rand", section.max_rand).unwrap_or(DEFAULT_MAX_RAND);
    let output = flag_or(matches, "output", section.output)
        .unwrap_or_else(|| DEFAULT_COMMANDS_FILE.to_string());

    let fair_count = params.fair_count()?;
    println!("initial fair_count = {}", fair_count.bytes);

    let tables = DivisionTables::build(division_config);
    println!("len(log_table) = {}", tables.log_table().len());
    println!("len(exp_table) = {}", tables.exp_table().len());

    let file = std::fs::File::create(&output)
        .with_context(|| format!("could not create commands file {}", output))?;
    let mut w = BufWriter::new(file);
    if matches.get_flag("write_fair_count") {
        commands::write_fair_count_commands(&mut w, &fair_count)?;
    }
    commands::write_afd_drop_prob_commands(&mut w, &afd::drop_probability_entries(max_rand))?;
    commands::write_division_commands(&mut w, &tables)?;
    w.flush()
        .with_context(|| format!("could not write commands file {}", output))?;
    log::info!("wrote AFD commands to {}", output);
    Ok(())
}

pub fn handle_afd_commands(matches: &ArgMatches, config: &Option<TablesConfig>) {
    or_exit(afd_commands(matches, config), "afd-commands")
}

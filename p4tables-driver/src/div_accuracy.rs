// SPDX-License-Identifier: Apache-2.0

use crate::report_cli_error::or_exit;
use crate::tables_config::{get_division_config, TablesConfig};
use clap::ArgMatches;
use p4tables::division::{accuracy, DivisionTables};

pub const DEFAULT_SAMPLES: u64 = 100_000;

fn div_accuracy(matches: &ArgMatches, config: &Option<TablesConfig>) -> anyhow::Result<()> {
    let tables = DivisionTables::build(get_division_config(matches, config)?);
    let samples = matches
        .get_one::<u64>("samples")
        .copied()
        .unwrap_or(DEFAULT_SAMPLES);
    let seed = matches.get_one::<u64>("seed").copied().unwrap_or(0);
    let report = accuracy::evaluate(&tables, samples, seed)?;

    if matches.get_one::<String>("format").map(|s| s.as_str()) == Some("json") {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }
    println!("config: {}", tables.config());
    println!(
        "samples: {} ({})",
        report.samples,
        if report.exhaustive {
            "exhaustive"
        } else {
            "sampled"
        }
    );
    println!("max abs error: {:.4}", report.max_abs_error);
    println!("mean abs error: {:.4}", report.mean_abs_error);
    println!("max rel error: {:.4}", report.max_rel_error);
    if let Some(w) = report.worst_case {
        println!(
            "worst case: {} / {} ~= {} (exact {:.4})",
            w.a, w.b, w.approx, w.exact
        );
    }
    Ok(())
}

pub fn handle_div_accuracy(matches: &ArgMatches, config: &Option<TablesConfig>) {
    or_exit(div_accuracy(matches, config), "div-accuracy")
}

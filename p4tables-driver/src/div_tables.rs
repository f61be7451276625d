// SPDX-License-Identifier: Apache-2.0

use crate::report_cli_error::or_exit;
use crate::tables_config::{get_division_config, TablesConfig};
use clap::ArgMatches;
use p4tables::division::{DivisionTables, TableStats};
use serde::Serialize;

#[derive(Serialize)]
struct TablesReport<'a> {
    tables: &'a DivisionTables,
    stats: TableStats,
}

fn print_text(tables: &DivisionTables) {
    let width = tables.config().uint_bits() as usize;
    let keys = p4tables::division::gen_log_keys(tables.config());
    println!("log_table:");
    println!("----------");
    for (entry, key) in tables.log_table().entries().iter().zip(keys.iter()) {
        println!(
            "{:>5} {} ({:0width$b}, {:0width$b}) ==> {}",
            entry.priority,
            key,
            entry.data,
            entry.mask,
            entry.log_value,
            width = width
        );
    }
    println!("len(log_table) = {}", tables.log_table().len());
    println!("exp_table:");
    println!("----------");
    for entry in tables.exp_table().entries() {
        println!("{} ==> {}", entry.key, entry.value);
    }
    println!("len(exp_table) = {}", tables.exp_table().len());
    println!("total_mem = {} bytes", tables.stats().total_bytes());
}

fn div_tables(matches: &ArgMatches, config: &Option<TablesConfig>) -> anyhow::Result<()> {
    let tables = DivisionTables::build(get_division_config(matches, config)?);
    let format = matches
        .get_one::<String>("format")
        .map(|s| s.as_str())
        .unwrap_or("text");
    match format {
        "json" => {
            let report = TablesReport {
                tables: &tables,
                stats: tables.stats(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => print_text(&tables),
    }
    Ok(())
}

pub fn handle_div_tables(matches: &ArgMatches, config: &Option<TablesConfig>) {
    or_exit(div_tables(matches, config), "div-tables")
}

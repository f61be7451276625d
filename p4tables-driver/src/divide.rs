// SPDX-License-Identifier: Apache-2.0

use crate::report_cli_error::report_cli_error_and_exit;
use crate::tables_config::{get_division_config, TablesConfig};
use clap::ArgMatches;
use p4tables::division::DivisionTables;

pub fn handle_divide(matches: &ArgMatches, config: &Option<TablesConfig>) {
    let a = *matches.get_one::<u64>("a").expect("a is required");
    let b = *matches.get_one::<u64>("b").expect("b is required");
    let division_config = match get_division_config(matches, config) {
        Ok(c) => c,
        Err(e) => report_cli_error_and_exit(&e.to_string(), Some("divide"), vec![]),
    };
    let tables = DivisionTables::build(division_config);
    match tables.divide(a, b) {
        Ok(q) => println!("{}", q),
        Err(e) => {
            let a_str = a.to_string();
            let b_str = b.to_string();
            let config_str = division_config.to_string();
            report_cli_error_and_exit(
                &e.to_string(),
                Some("divide"),
                vec![("a", &a_str), ("b", &b_str), ("config", &config_str)],
            )
        }
    }
}

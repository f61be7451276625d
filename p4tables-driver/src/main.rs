// SPDX-License-Identifier: Apache-2.0

//! Command line driver that generates switch runtime commands for the
//! traffic-control tables built by the `p4tables` crate.
//!
//! Commands are given like:
//!
//! ```text
//! p4tables-driver <global-options> <command> <command-args-and-options>
//! ```
//!
//! Commands are:
//!
//! - afd-commands: AFD drop probability and approximate division tables.
//! - red-commands: RED drop probability table.
//! - red-ewma-commands: RED idle decay factor table plus drop probabilities.
//! - div-tables: Dumps the division tables as text or JSON.
//! - divide: Approximates one quotient through the division tables.
//! - div-accuracy: Compares the approximate quotient with the exact one.
//!
//! Sample usage:
//!
//! ```shell
//! $ cargo run -- afd-commands --uint_bits 16 --log_bits 9 --log_accuracy 6
//! $ cargo run -- red-commands --bits 13 --max_size 500000 \
//!     --low 5000 --upper 15000 --write
//! $ cargo run -- divide 200 100 --uint_bits 8 --log_bits 4 --log_accuracy 2
//! ```

mod afd_commands;
mod div_accuracy;
mod div_tables;
mod divide;
mod red_commands;
mod report_cli_error;
mod tables_config;

use crate::tables_config::{TablesConfig, CONFIG_FILE_NAME};
use clap::{Arg, ArgAction};
use report_cli_error::report_cli_error_and_exit;

trait AppExt {
    fn add_division_args(self) -> Self;
    fn add_output_arg(self) -> Self;
    fn add_plot_args(self) -> Self;
    fn add_red_threshold_args(self, bits_flag: &'static str) -> Self;
    fn add_format_arg(self) -> Self;
    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self;
}

impl AppExt for clap::Command {
    fn add_division_args(self) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new("uint_bits")
                    .long("uint_bits")
                    .short('N')
                    .value_name("N")
                    .help("Bits used to represent division operands (queue size)")
                    .value_parser(clap::value_parser!(u32))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("log_bits")
                    .long("log_bits")
                    .short('l')
                    .value_name("L")
                    .help("Bits used to represent logarithms")
                    .value_parser(clap::value_parser!(u32))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("log_accuracy")
                    .long("log_accuracy")
                    .short('m')
                    .value_name("M")
                    .help("Significant high-order bits kept exact in each log key")
                    .value_parser(clap::value_parser!(u32))
                    .action(ArgAction::Set),
            )
    }

    fn add_output_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("PATH")
                .help("Commands file to (over)write; defaults to commands.txt")
                .action(ArgAction::Set),
        )
    }

    fn add_plot_args(self) -> Self {
        (self as clap::Command)
            .add_bool_arg("write", "Write the drop probabilities to a plot data file")
            .arg(
                Arg::new("data_output")
                    .long("data_output")
                    .value_name("PATH")
                    .help("Plot data file; defaults to drop_probability.plotme")
                    .action(ArgAction::Set),
            )
    }

    fn add_red_threshold_args(self, bits_flag: &'static str) -> Self {
        (self as clap::Command)
            .arg(
                Arg::new(bits_flag)
                    .long(bits_flag)
                    .value_name("BITS")
                    .help("Bits used to represent the queue size")
                    .value_parser(clap::value_parser!(u32))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("max_size")
                    .long("max_size")
                    .value_name("BYTES")
                    .help("Largest possible queue size")
                    .value_parser(clap::value_parser!(f64))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("low")
                    .long("low")
                    .value_name("BYTES")
                    .help("RED minimum threshold")
                    .value_parser(clap::value_parser!(f64))
                    .action(ArgAction::Set),
            )
            .arg(
                Arg::new("upper")
                    .long("upper")
                    .value_name("BYTES")
                    .help("RED maximum threshold")
                    .value_parser(clap::value_parser!(f64))
                    .action(ArgAction::Set),
            )
    }

    fn add_format_arg(self) -> Self {
        (self as clap::Command).arg(
            Arg::new("format")
                .long("format")
                .value_name("FORMAT")
                .help("Output format")
                .value_parser(["text", "json"])
                .default_value("text")
                .action(ArgAction::Set),
        )
    }

    fn add_bool_arg(self, long: &'static str, help: &'static str) -> Self {
        (self as clap::Command).arg(
            Arg::new(long)
                .long(long)
                .help(help)
                .action(ArgAction::SetTrue),
        )
    }
}

fn float_arg(id: &'static str, value_name: &'static str, help: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_name(value_name)
        .help(help)
        .value_parser(clap::value_parser!(f64))
        .action(ArgAction::Set)
}

fn build_cli() -> clap::Command {
    clap::Command::new("p4tables-driver")
        .about("Generates lookup table commands for switch traffic control")
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("TOML_PATH")
                .help("Path to a p4tables.toml configuration file")
                .global(true)
                .action(ArgAction::Set),
        )
        .subcommand(clap::Command::new("version").about("Outputs the version of the driver"))
        .subcommand(
            clap::Command::new("afd-commands")
                .about("Writes AFD drop probability and division table commands")
                .add_division_args()
                .add_output_arg()
                .arg(
                    Arg::new("max_rand")
                        .long("max_rand")
                        .short('r')
                        .value_name("MAX_RAND")
                        .help("Largest value in the random number range")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("shadow_buf_pkts")
                        .long("shadow_buf_pkts")
                        .short('b')
                        .value_name("PACKETS")
                        .help("Packets stored in the shadow buffer")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(float_arg("fairshare", "RATE", "Initial fair share rate"))
                .arg(float_arg(
                    "ingress_rate",
                    "RATE",
                    "Total ingress rate, in the units of --fairshare",
                ))
                .arg(float_arg("max_buf_size", "BYTES", "Largest possible queue size"))
                .arg(float_arg("pkt_size", "BYTES", "Packet size"))
                .add_bool_arg(
                    "write_fair_count",
                    "Also write the fair_count register initialization",
                ),
        )
        .subcommand(
            clap::Command::new("red-commands")
                .about("Writes RED drop probability table commands")
                .add_red_threshold_args("bits")
                .add_output_arg()
                .add_plot_args(),
        )
        .subcommand(
            clap::Command::new("red-ewma-commands")
                .about("Writes RED idle decay factor and drop probability table commands")
                .add_red_threshold_args("size_bits")
                .add_output_arg()
                .add_plot_args()
                .arg(float_arg("max_dur", "SECONDS", "Longest idle duration to cover"))
                .arg(
                    Arg::new("num_decay_entries")
                        .long("num_decay_entries")
                        .short('n')
                        .value_name("COUNT")
                        .help("Entries in the decay factor table")
                        .value_parser(clap::value_parser!(usize))
                        .action(ArgAction::Set),
                )
                .arg(float_arg("pkt_size", "BYTES", "Packet size used to compute s"))
                .arg(float_arg("link_rate", "BITS_PER_SEC", "Link rate used to compute s"))
                .arg(float_arg(
                    "queue_weight",
                    "WEIGHT",
                    "Weight given to new queue size samples",
                )),
        )
        .subcommand(
            clap::Command::new("div-tables")
                .about("Prints the approximate division tables")
                .add_division_args()
                .add_format_arg(),
        )
        .subcommand(
            clap::Command::new("divide")
                .about("Approximates a / b through the division tables")
                .arg(
                    Arg::new("a")
                        .help("Dividend")
                        .required(true)
                        .value_parser(clap::value_parser!(u64))
                        .index(1),
                )
                .arg(
                    Arg::new("b")
                        .help("Divisor")
                        .required(true)
                        .value_parser(clap::value_parser!(u64))
                        .index(2),
                )
                .add_division_args(),
        )
        .subcommand(
            clap::Command::new("div-accuracy")
                .about("Measures the error of the approximate division")
                .add_division_args()
                .add_format_arg()
                .arg(
                    Arg::new("samples")
                        .long("samples")
                        .value_name("COUNT")
                        .help("Pairs to sample when the operands are too wide to enumerate")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for the operand sampler")
                        .value_parser(clap::value_parser!(u64))
                        .action(ArgAction::Set),
                ),
        )
}

/// Reads the config named by `--config`, or `p4tables.toml` in the working
/// directory when present.
fn load_config(matches: &clap::ArgMatches) -> Option<TablesConfig> {
    let mut toml_path: Option<String> = matches
        .get_one::<String>("config")
        .or_else(|| {
            matches
                .subcommand()
                .and_then(|(_, m)| m.get_one::<String>("config"))
        })
        .cloned();

    if toml_path.is_none() {
        let cwd_toml_path = std::path::Path::new(CONFIG_FILE_NAME);
        if cwd_toml_path.exists() {
            log::info!("Using {} in current directory", CONFIG_FILE_NAME);
            toml_path = Some(CONFIG_FILE_NAME.to_string());
        }
    }

    let path = toml_path?;
    if !std::path::Path::new(&path).exists() {
        report_cli_error_and_exit("config toml file does not exist", None, vec![("path", &path)]);
    }
    let toml_str = match std::fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => report_cli_error_and_exit(
            "could not read config toml file",
            None,
            vec![("path", &path), ("error", &e.to_string())],
        ),
    };
    match toml::from_str::<TablesConfig>(&toml_str) {
        Ok(config) => Some(config),
        Err(e) => report_cli_error_and_exit(
            "could not parse config toml file",
            None,
            vec![("path", &path), ("error", &e.to_string())],
        ),
    }
}

fn main() {
    let _ = env_logger::builder().try_init();
    let matches = build_cli().get_matches();
    let config = load_config(&matches);

    match matches.subcommand() {
        Some(("afd-commands", m)) => afd_commands::handle_afd_commands(m, &config),
        Some(("red-commands", m)) => red_commands::handle_red_commands(m, &config),
        Some(("red-ewma-commands", m)) => red_commands::handle_red_ewma_commands(m, &config),
        Some(("div-tables", m)) => div_tables::handle_div_tables(m, &config),
        Some(("divide", m)) => divide::handle_divide(m, &config),
        Some(("div-accuracy", m)) => div_accuracy::handle_div_accuracy(m, &config),
        Some(("version", _)) => println!("{}", env!("CARGO_PKG_VERSION")),
        _ => report_cli_error_and_exit("No valid subcommand provided.", None, vec![]),
    }
}

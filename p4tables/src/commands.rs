// SPDX-License-Identifier: Apache-2.0

//! Renders generated table entries as runtime CLI commands for the software
//! switch (`table_add ...`, `register_write ...`), one command per line.

use crate::afd::{DropProbEntry, FairCount};
use crate::division::{DivisionTables, ExpEntry, LogEntry};
use crate::ewma::DecayEntry;
use crate::red::RedDropEntry;
use std::io::{self, Write};

/// The two ternary tables that receive the same `log` entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTableTarget {
    Numerator,
    Denominator,
}

impl LogTableTarget {
    fn table_and_action(&self) -> (&'static str, &'static str) {
        match self {
            LogTableTarget::Numerator => ("log_numerator", "set_log_num"),
            LogTableTarget::Denominator => ("log_denominator", "set_log_denom"),
        }
    }
}

pub fn afd_drop_prob_command(entry: &DropProbEntry) -> String {
    format!(
        "table_add calc_drop_prob set_drop_prob {} => {}",
        entry.ratio, entry.drop_prob
    )
}

/// `data` and `mask` are written as `width`-digit binary literals joined by
/// the ternary `&&&` operator; the trailing number is the entry priority.
pub fn log_command(target: LogTableTarget, entry: &LogEntry, width: u32) -> String {
    let (table, action) = target.table_and_action();
    let width = width as usize;
    format!(
        "table_add {} {} 0b{:0width$b}&&&0b{:0width$b} => {} {}",
        table,
        action,
        entry.data,
        entry.mask,
        entry.log_value,
        entry.priority,
        width = width
    )
}

pub fn exp_command(entry: &ExpEntry) -> String {
    format!("table_add exp set_result {} => {}", entry.key, entry.value)
}

pub fn fair_count_commands(fair_count: &FairCount) -> [String; 2] {
    [
        format!("register_write fair_count_reg 0 {}", fair_count.value),
        "register_read fair_count_reg 0".to_string(),
    ]
}

pub fn red_drop_command(entry: &RedDropEntry) -> String {
    format!(
        "table_add calc_red_drop_probability set_drop_probability {} => {}",
        entry.qsize, entry.drop_prob
    )
}

pub fn decay_command(entry: &DecayEntry) -> String {
    format!(
        "table_add calc_decay_factor set_decay_factor {}->{} => {} {}",
        entry.range_min_ns, entry.range_max_ns, entry.shift, entry.priority
    )
}

fn write_lines<W: Write, I: IntoIterator<Item = String>>(w: &mut W, lines: I) -> io::Result<()> {
    for line in lines {
        writeln!(w, "{}", line)?;
    }
    Ok(())
}

/// Writes the numerator log table, the denominator log table, then the exp
/// table.
pub fn write_division_commands<W: Write>(w: &mut W, tables: &DivisionTables) -> io::Result<()> {
    let width = tables.config().uint_bits();
    for target in [LogTableTarget::Numerator, LogTableTarget::Denominator] {
        write_lines(
            w,
            tables
                .log_table()
                .entries()
                .iter()
                .map(|e| log_command(target, e, width)),
        )?;
    }
    write_lines(w, tables.exp_table().entries().iter().map(exp_command))
}

pub fn write_afd_drop_prob_commands<W: Write>(
    w: &mut W,
    entries: &[DropProbEntry],
) -> io::Result<()> {
    write_lines(w, entries.iter().map(afd_drop_prob_command))
}

pub fn write_fair_count_commands<W: Write>(w: &mut W, fair_count: &FairCount) -> io::Result<()> {
    write_lines(w, fair_count_commands(fair_count))
}

pub fn write_red_drop_commands<W: Write>(w: &mut W, entries: &[RedDropEntry]) -> io::Result<()> {
    write_lines(w, entries.iter().map(red_drop_command))
}

pub fn write_decay_commands<W: Write>(w: &mut W, entries: &[DecayEntry]) -> io::Result<()> {
    write_lines(w, entries.iter().map(decay_command))
}

/// Writes `"<x> <y>"` lines for plotting.
pub fn write_plot_data<W: Write>(w: &mut W, points: &[(f64, u64)]) -> io::Result<()> {
    write_lines(w, points.iter().map(|(x, y)| format!("{} {}", x, y)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::division::DivisionConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_log_command_format() {
        let entry = LogEntry {
            priority: 3,
            data: 4,
            mask: 0xfe,
            log_value: 4,
        };
        assert_eq!(
            log_command(LogTableTarget::Numerator, &entry, 8),
            "table_add log_numerator set_log_num 0b00000100&&&0b11111110 => 4 3"
        );
        assert_eq!(
            log_command(LogTableTarget::Denominator, &entry, 8),
            "table_add log_denominator set_log_denom 0b00000100&&&0b11111110 => 4 3"
        );
    }

    #[test]
    fn test_division_commands_layout() {
        let tables = DivisionTables::build(DivisionConfig::new(8, 4, 2).unwrap());
        let mut out = Vec::new();
        write_division_commands(&mut out, &tables).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 15 + 15 + 16);
        assert_eq!(
            lines[0],
            "table_add log_numerator set_log_num 0b00000001&&&0b11111111 => 0 0"
        );
        assert!(lines[15].starts_with("table_add log_denominator"));
        assert_eq!(lines[30], "table_add exp set_result 0 => 1");
        assert_eq!(lines[45], "table_add exp set_result 15 => 255");
    }

    #[test]
    fn test_other_formats() {
        let decay = DecayEntry {
            priority: 2,
            range_min_ns: 0,
            range_max_ns: 453155448,
            shift: 1,
            idle_dur: 0.453155448,
            decay_factor: 0.5,
        };
        assert_eq!(
            decay_command(&decay),
            "table_add calc_decay_factor set_decay_factor 0->453155448 => 1 2"
        );
        assert_eq!(
            red_drop_command(&RedDropEntry {
                qsize: 9,
                drop_prob: 256
            }),
            "table_add calc_red_drop_probability set_drop_probability 9 => 256"
        );
        assert_eq!(
            fair_count_commands(&FairCount {
                value: 62,
                bytes: 0.0
            }),
            [
                "register_write fair_count_reg 0 62".to_string(),
                "register_read fair_count_reg 0".to_string()
            ]
        );
    }
}

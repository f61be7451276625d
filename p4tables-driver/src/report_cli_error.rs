// SPDX-License-Identifier: Apache-2.0

use colored::Colorize;

/// Prints `message` (and any `key: value` details) to stderr and exits 1.
pub fn report_cli_error_and_exit(
    message: &str,
    subcommand: Option<&str>,
    details: Vec<(&str, &str)>,
) -> ! {
    let subcommand_str = if let Some(subcommand) = subcommand {
        format!("{}: ", subcommand)
    } else {
        String::new()
    };
    eprintln!("p4tables-driver: {}{}", subcommand_str, message.red().bold());
    for (key, value) in details {
        eprintln!("  {}: {}", key, value);
    }
    std::process::exit(1);
}

/// Unwraps `result`, reporting the error chain for `subcommand` on failure.
pub fn or_exit<T>(result: anyhow::Result<T>, subcommand: &str) -> T {
    match result {
        Ok(v) => v,
        Err(e) => {
            let chain: Vec<String> = e.chain().skip(1).map(|c| c.to_string()).collect();
            let caused_by = chain.join(": ");
            let mut details = Vec::new();
            if !caused_by.is_empty() {
                details.push(("caused by", caused_by.as_str()));
            }
            report_cli_error_and_exit(&e.to_string(), Some(subcommand), details)
        }
    }
}

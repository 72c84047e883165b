/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use clap::Parser;
use clap::ValueEnum;
use std::path::PathBuf;

pub const DEFAULT_CONFIGS_DIR: &str = "/etc/wireguard";
pub const DEFAULT_WG_QUICK: &str = "wg-quick";
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 30;

#[derive(ValueEnum, Default, Debug, Clone, Copy, PartialEq)]
pub enum LogOutput {
    Syslog,
    #[default]
    Stdout,
}

/// WireGuard configuration editor
#[derive(Parser, Debug, Clone)]
#[command(name = "wg-config-editor")]
#[command(about = "Edit WireGuard configurations and toggle interfaces with wg-quick")]
#[command(long_about = None)]
pub struct Args {
    /// Log severity
    #[arg(long, default_value_t = log::Level::Info)]
    pub log_level: log::Level,

    /// Log output
    #[arg(long, value_enum, default_value_t)]
    pub log_output: LogOutput,

    /// Directory scanned for `<name>.conf` files
    #[arg(long, default_value = DEFAULT_CONFIGS_DIR)]
    pub configs_dir: PathBuf,

    /// Edit a single configuration file instead of scanning a directory
    #[arg(long, conflicts_with = "configs_dir")]
    pub config_file: Option<PathBuf>,

    /// Interface name used with --config-file (defaults to the file stem)
    #[arg(long, requires = "config_file")]
    pub interface: Option<String>,

    /// Seconds to wait for wg-quick before killing it
    #[arg(long, default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS)]
    pub command_timeout: u64,

    /// Path of the wg-quick executable
    #[arg(long, default_value = DEFAULT_WG_QUICK)]
    pub wg_quick: PathBuf,

    /// Report up/down as successful even when wg-quick fails
    #[arg(long)]
    pub optimistic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["wg-config-editor"]).unwrap();
        assert_eq!(args.configs_dir, PathBuf::from(DEFAULT_CONFIGS_DIR));
        assert_eq!(args.log_output, LogOutput::Stdout);
        assert_eq!(args.log_level, log::Level::Info);
        assert_eq!(args.command_timeout, DEFAULT_COMMAND_TIMEOUT_SECS);
        assert!(args.config_file.is_none());
        assert!(!args.optimistic);
    }

    #[test]
    fn single_file_mode() {
        let args = Args::try_parse_from([
            "wg-config-editor",
            "--config-file",
            "/tmp/office.conf",
            "--interface",
            "wg-office",
        ])
        .unwrap();
        assert_eq!(args.config_file, Some(PathBuf::from("/tmp/office.conf")));
        assert_eq!(args.interface.as_deref(), Some("wg-office"));
    }

    #[test]
    fn interface_requires_config_file() {
        assert!(Args::try_parse_from(["wg-config-editor", "--interface", "wg0"]).is_err());
    }

    #[test]
    fn log_options() {
        let args = Args::try_parse_from([
            "wg-config-editor",
            "--log-level",
            "debug",
            "--log-output",
            "syslog",
        ])
        .unwrap();
        assert_eq!(args.log_level, log::Level::Debug);
        assert_eq!(args.log_output, LogOutput::Syslog);
    }
}

/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::cli::LogOutput;
use anyhow::Context;
use syslog::{BasicLogger, Facility, Formatter3164};

const PROCESS_NAME: &str = "wg-config-editor";

/// Install the global logger. `RUST_LOG` still refines the stdout filter.
pub fn init(level: log::Level, output: LogOutput) -> anyhow::Result<()> {
    match output {
        LogOutput::Stdout => env_logger::Builder::new()
            .filter_level(level.to_level_filter())
            .parse_default_env()
            .try_init()
            .context("Could not initialize stdout logger")?,
        LogOutput::Syslog => {
            let formatter = Formatter3164 {
                facility: Facility::LOG_USER,
                hostname: None,
                process: PROCESS_NAME.into(),
                pid: std::process::id(),
            };
            let logger = syslog::unix(formatter)
                .map_err(|e| anyhow::anyhow!("Could not connect to syslog: {e}"))?;
            log::set_boxed_logger(Box::new(BasicLogger::new(logger)))
                .context("Could not install syslog logger")?;
            log::set_max_level(level.to_level_filter());
        }
    }

    Ok(())
}

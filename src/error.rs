/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures of the file and process layers.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Could not read configuration directory {}: {source}", dir.display())]
    Discovery {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not read {}: {source}", file.display())]
    Read {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Could not write {}: {source}", file.display())]
    Write {
        file: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("wg-quick {verb} {name} could not be run: {source}")]
    Command {
        verb: String,
        name: String,
        #[source]
        source: io::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::error::{Error, Result};
use log::{debug, trace};
use std::fs;
use std::path::{Path, PathBuf};

/// Suffix `wg-quick` expects for interface configurations.
pub const CONFIG_EXTENSION: &str = "conf";

/// One configuration file found on disk. The file path is its identity.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConfigRecord {
    pub name: String,
    pub file: PathBuf,
}

impl ConfigRecord {
    /// Record for a `<name>.conf` path, `None` for any other path.
    pub fn from_path(file: &Path) -> Option<Self> {
        if !file.extension().is_some_and(|e| e == CONFIG_EXTENSION) {
            return None;
        }
        let name = file.file_stem()?.to_str()?.to_owned();

        Some(Self {
            name,
            file: file.to_path_buf(),
        })
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Collect the `*.conf` files directly inside `dir`, sorted by name.
pub fn scan(dir: &Path) -> Result<Vec<ConfigRecord>> {
    let discovery_err = |source| Error::Discovery {
        dir: dir.to_path_buf(),
        source,
    };

    let mut records = vec![];

    for entry in fs::read_dir(dir).map_err(discovery_err)? {
        let entry = entry.map_err(discovery_err)?;
        let path = entry.path();

        if !entry.file_type().map_err(discovery_err)?.is_file() {
            trace!("Skipping non-file entry {}", path.display());
            continue;
        }
        if path.parent() != Some(dir) {
            trace!("Skipping {} outside of {}", path.display(), dir.display());
            continue;
        }

        match ConfigRecord::from_path(&path) {
            Some(record) => records.push(record),
            None => trace!("Skipping {}", path.display()),
        }
    }

    records.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.file.cmp(&b.file)));
    debug!("Found {} configurations in {}", records.len(), dir.display());

    Ok(records)
}

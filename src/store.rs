/*
    Copyright 2025 TII (SSRC) and the contributors
    SPDX-License-Identifier: Apache-2.0
*/
use crate::discovery::ConfigRecord;
use crate::error::{Error, Result};
use log::debug;
use nix::sys::stat::Mode;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

/// Configurations hold private keys, keep them readable by the owner only.
pub fn config_file_mode() -> Mode {
    Mode::S_IRUSR | Mode::S_IWUSR
}

pub fn read(record: &ConfigRecord) -> Result<String> {
    fs::read_to_string(&record.file).map_err(|source| Error::Read {
        file: record.file.clone(),
        source,
    })
}

/// Strip surrounding whitespace and end the text with a single newline.
pub fn normalize(text: &str) -> String {
    let mut normalized = text.trim().to_owned();
    normalized.push('\n');
    normalized
}

/// Write `text` as is.
pub fn write(record: &ConfigRecord, text: &str) -> Result<()> {
    let write_err = |source| Error::Write {
        file: record.file.clone(),
        source,
    };
    let mode = config_file_mode().bits() as u32;

    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(mode)
        .open(&record.file)
        .map_err(write_err)?;

    // `mode` only applies on creation.
    file.set_permissions(fs::Permissions::from_mode(mode))
        .map_err(write_err)?;
    file.write_all(text.as_bytes()).map_err(write_err)?;
    file.sync_all().map_err(write_err)?;

    debug!("Wrote {} bytes to {}", text.len(), record.file.display());
    Ok(())
}

/// Normalize and write, returning what ended up on disk.
pub fn save(record: &ConfigRecord, text: &str) -> Result<String> {
    let normalized = normalize(text);
    write(record, &normalized)?;
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn record_in(dir: &Path, name: &str) -> ConfigRecord {
        ConfigRecord::from_path(&dir.join(format!("{name}.conf"))).unwrap()
    }

    #[test]
    fn normalize_trims_and_terminates() {
        assert_eq!(
            normalize("  [Interface]\nAddress=10.0.0.1\n\n\n"),
            "[Interface]\nAddress=10.0.0.1\n"
        );
        assert_eq!(normalize("[Peer]"), "[Peer]\n");
        assert_eq!(normalize("\n\n[Peer]\r\n\t"), "[Peer]\n");
        assert_eq!(normalize("   \n\t"), "\n");
        assert_eq!(normalize(""), "\n");
    }

    #[test]
    fn normalize_is_idempotent() {
        for text in [
            "",
            "\n",
            "[Interface]",
            "  [Interface]\nPrivateKey = abc=\n\n",
            "\n\n[Interface]\n\n[Peer]\nEndpoint = 1.2.3.4:51820\n\n\n",
        ] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once);
            assert!(once.ends_with('\n'));
            assert!(!once.ends_with("\n\n") || once == "\n");
            assert!(!once.starts_with(char::is_whitespace) || once == "\n");
        }
    }

    #[test]
    fn keeps_inner_blank_lines() {
        let text = "[Interface]\nAddress = 10.0.0.1/24\n\n[Peer]\nPublicKey = xyz=";
        assert_eq!(normalize(text), format!("{text}\n"));
    }

    #[test]
    fn write_then_read_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(dir.path(), "wg0");
        let text = normalize(" [Interface]\nListenPort = 51820\n\n");

        write(&record, &text).unwrap();

        assert_eq!(read(&record).unwrap(), text);
    }

    #[test]
    fn write_is_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(dir.path(), "wg0");

        write(&record, "  raw\n\n").unwrap();

        assert_eq!(read(&record).unwrap(), "  raw\n\n");
    }

    #[test]
    fn save_normalizes() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(dir.path(), "office");

        let saved = save(&record, "\n[Interface]\nAddress=10.0.0.2\n\n").unwrap();

        assert_eq!(saved, "[Interface]\nAddress=10.0.0.2\n");
        assert_eq!(read(&record).unwrap(), saved);
    }

    #[test]
    fn files_are_owner_only() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(dir.path(), "wg0");
        fs::write(&record.file, "old").unwrap();
        fs::set_permissions(&record.file, fs::Permissions::from_mode(0o644)).unwrap();

        write(&record, "[Interface]\n").unwrap();

        let mode = fs::metadata(&record.file).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn write_into_missing_directory_fails() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(&dir.path().join("gone"), "wg0");

        let err = write(&record, "[Interface]\n").unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
    }

    #[test]
    fn read_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let record = record_in(dir.path(), "absent");

        assert!(matches!(read(&record).unwrap_err(), Error::Read { .. }));
    }
}

use std::collections::BTreeSet;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use pxb_domain::Configuration;
use tempfile::NamedTempFile;
use time::OffsetDateTime;
use tracing::debug;

use crate::core::error::{BackendError, Result};

/// An archive being written next to its final location.
///
/// Nothing appears under the final name until [`PendingArtifact::persist`];
/// dropping it early removes the temporary file.
pub(crate) struct PendingArtifact {
    temp: NamedTempFile,
    final_path: PathBuf,
}

impl PendingArtifact {
    pub(crate) fn create(out_dir: &Path, file_name: &str) -> Result<Self> {
        let temp = tempfile::Builder::new()
            .prefix(".pxb-")
            .suffix(".partial")
            .tempfile_in(out_dir)?;
        Ok(Self {
            temp,
            final_path: out_dir.join(file_name),
        })
    }

    /// A second handle on the temporary file for the container writer.
    pub(crate) fn handle(&self) -> Result<File> {
        Ok(self.temp.as_file().try_clone()?)
    }

    pub(crate) fn temp_path(&self) -> &Path {
        self.temp.path()
    }

    pub(crate) fn persist(self) -> Result<PathBuf> {
        let final_path = self.final_path;
        self.temp
            .persist(&final_path)
            .map_err(|err| BackendError::Io(err.error))?;
        debug!(path = %final_path.display(), "persisted artifact");
        Ok(final_path)
    }
}

/// Canonical output directory, created when missing.
pub(crate) fn prepare_out_dir(out_dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(out_dir)?;
    Ok(fs::canonicalize(out_dir)?)
}

/// Tracks member names so no two entries share an archive path.
#[derive(Default)]
pub(crate) struct MemberSet {
    seen: BTreeSet<String>,
}

impl MemberSet {
    pub(crate) fn claim(&mut self, path: &str) -> Result<()> {
        if self.seen.insert(path.to_string()) {
            Ok(())
        } else {
            Err(BackendError::DuplicatePath {
                path: path.to_string(),
            })
        }
    }
}

/// Tar mtime for every member: `SOURCE_DATE_EPOCH` or the epoch itself.
pub(crate) fn tar_mtime(config: &Configuration) -> u64 {
    config.source_date_epoch.unwrap_or(0)
}

/// Zip timestamp for every member. Zip cannot represent dates before 1980,
/// so earlier epochs fall back to the format's minimum.
pub(crate) fn zip_timestamp(config: &Configuration) -> zip::DateTime {
    config
        .source_date_epoch
        .and_then(|epoch| i64::try_from(epoch).ok())
        .and_then(|epoch| OffsetDateTime::from_unix_timestamp(epoch).ok())
        .and_then(|ts| {
            let year = u16::try_from(ts.year()).ok()?;
            zip::DateTime::from_date_and_time(
                year,
                u8::from(ts.month()),
                ts.day(),
                ts.hour(),
                ts.minute(),
                ts.second(),
            )
            .ok()
        })
        .unwrap_or_default()
}

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use flate2::{write::GzEncoder, Compression};
use pxb_domain::Configuration;
use tar::{Builder, EntryType, Header, HeaderMode};
use tracing::{debug, info};

use super::archive::{prepare_out_dir, tar_mtime, MemberSet, PendingArtifact};
use crate::core::error::Result;
use crate::core::metadata::{metadata_lines, render_lines};
use crate::core::walk::{archive_path, walk_filtered, EntryKind};

const PKG_INFO: &str = "PKG-INFO";

/// Write `{name}-{version}.tar.gz` into `out_dir` and return its file name.
pub fn write_sdist(config: &Configuration, out_dir: &Path) -> Result<String> {
    let out_dir = prepare_out_dir(out_dir)?;
    let project_root = fs::canonicalize(&config.project_root)?;
    let base = config.label.to_string();
    let filename = format!("{base}.tar.gz");

    let pending = PendingArtifact::create(&out_dir, &filename)?;
    let skip = [out_dir.clone(), pending.temp_path().to_path_buf()];
    let encoder = GzEncoder::new(pending.handle()?, Compression::default());
    let mut tar = Builder::new(encoder);
    let mtime = tar_mtime(config);
    let mut members = MemberSet::default();
    let mut files = 0usize;

    walk_filtered(config, &project_root, &project_root, &skip, |entry| {
        if entry.relative.as_os_str() == PKG_INFO {
            debug!("replacing PKG-INFO found in the source tree");
            return Ok(());
        }
        let name = if entry.relative.as_os_str().is_empty() {
            base.clone()
        } else {
            format!("{base}/{}", archive_path(&entry.relative))
        };
        members.claim(&name)?;
        let metadata = fs::metadata(&entry.path)?;
        let mut header = deterministic_header(mtime);
        header.set_metadata_in_mode(&metadata, HeaderMode::Deterministic);
        header.set_mtime(mtime);
        match entry.kind {
            EntryKind::Dir => tar.append_data(&mut header, &name, io::empty())?,
            EntryKind::File => {
                let file = File::open(&entry.path)?;
                tar.append_data(&mut header, &name, file)?;
                files += 1;
            }
        }
        debug!(member = %name, "added to sdist");
        Ok(())
    })?;

    let pkg_info = render_lines(&metadata_lines(config));
    let pkg_info_name = format!("{base}/{PKG_INFO}");
    members.claim(&pkg_info_name)?;
    let mut header = deterministic_header(mtime);
    header.set_entry_type(EntryType::Regular);
    header.set_size(pkg_info.len() as u64);
    header.set_mode(0o644);
    tar.append_data(&mut header, &pkg_info_name, pkg_info.as_slice())?;

    let encoder = tar.into_inner()?;
    let mut file = encoder.finish()?;
    file.flush()?;
    drop(file);
    let path = pending.persist()?;
    info!(artifact = %path.display(), files, "built sdist");
    Ok(filename)
}

fn deterministic_header(mtime: u64) -> Header {
    let mut header = Header::new_gnu();
    header.set_mtime(mtime);
    header.set_uid(0);
    header.set_gid(0);
    header
}

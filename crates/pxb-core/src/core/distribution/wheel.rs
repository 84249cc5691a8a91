use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use pxb_domain::{ConfigError, Configuration};
use tracing::{debug, info};
use zip::{write::FileOptions, CompressionMethod, ZipWriter};

use super::archive::{prepare_out_dir, zip_timestamp, MemberSet, PendingArtifact};
use crate::core::error::Result;
use crate::core::hash::copy_hashed;
use crate::core::metadata::{
    entry_points_lines, metadata_lines, render_lines, wheel_descriptor_lines,
};
use crate::core::record::Record;
use crate::core::walk::{archive_path, walk_filtered, EntryKind};

const METADATA: &str = "METADATA";
const WHEEL: &str = "WHEEL";
const ENTRY_POINTS: &str = "entry_points.txt";
const RECORD: &str = "RECORD";
const LICENSE_STEM: &str = "LICENSE";

/// Write `{name}-{version}-{tags}.whl` into `out_dir` and return its file
/// name. When `metadata_dir` is given, the metadata prepared there must
/// still match the project.
pub fn write_wheel(
    config: &Configuration,
    out_dir: &Path,
    metadata_dir: Option<&Path>,
) -> Result<String> {
    let metadata = render_lines(&metadata_lines(config));
    if let Some(dir) = metadata_dir {
        verify_prepared_metadata(config, dir, &metadata)?;
    }

    let project_root = fs::canonicalize(&config.project_root)?;
    let source_root = project_root.join(&config.tool.source_root);
    if !source_root.is_dir() {
        return Err(ConfigError::MissingSourceRoot {
            path: config.source_root_path(),
        }
        .into());
    }
    let out_dir = prepare_out_dir(out_dir)?;
    let filename = format!(
        "{}-{}.whl",
        config.label,
        config.tags().filename_component()
    );

    let pending = PendingArtifact::create(&out_dir, &filename)?;
    let skip = [out_dir.clone(), pending.temp_path().to_path_buf()];
    let mut zip = ZipWriter::new(pending.handle()?);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip_timestamp(config))
        .unix_permissions(0o644);
    let mut members = MemberSet::default();
    let mut record = Record::default();

    walk_filtered(config, &project_root, &source_root, &skip, |entry| {
        if entry.kind == EntryKind::Dir {
            return Ok(());
        }
        let mut file = File::open(&entry.path)?;
        let mut member = WheelSink {
            zip: &mut zip,
            options,
            members: &mut members,
            record: &mut record,
        };
        member.append(archive_path(&entry.within), &mut file)
    })?;

    let dist_info = config.label.dist_info_dir();
    let mut member = WheelSink {
        zip: &mut zip,
        options,
        members: &mut members,
        record: &mut record,
    };
    member.append(format!("{dist_info}/{METADATA}"), &mut metadata.as_slice())?;
    let descriptor = render_lines(&wheel_descriptor_lines(config));
    member.append(format!("{dist_info}/{WHEEL}"), &mut descriptor.as_slice())?;
    for license in license_files(&project_root)? {
        let Some(file_name) = license.file_name().map(|n| n.to_string_lossy().into_owned())
        else {
            continue;
        };
        let mut file = File::open(&license)?;
        member.append(format!("{dist_info}/{file_name}"), &mut file)?;
    }
    if let Some(lines) = entry_points_lines(config) {
        let entry_points = render_lines(&lines);
        member.append(format!("{dist_info}/{ENTRY_POINTS}"), &mut entry_points.as_slice())?;
    }

    let record_name = format!("{dist_info}/{RECORD}");
    members.claim(&record_name)?;
    record.push_self_reference(record_name.as_str());
    zip.start_file(record_name.as_str(), options)?;
    zip.write_all(&record.render())?;

    let mut file = zip.finish()?;
    file.flush()?;
    drop(file);
    let path = pending.persist()?;
    info!(
        artifact = %path.display(),
        entries = record.entries().len(),
        "built wheel"
    );
    Ok(filename)
}

/// One archive member being streamed into the wheel and its RECORD.
struct WheelSink<'a> {
    zip: &'a mut ZipWriter<File>,
    options: FileOptions,
    members: &'a mut MemberSet,
    record: &'a mut Record,
}

impl WheelSink<'_> {
    fn append<R: Read>(&mut self, name: String, reader: &mut R) -> Result<()> {
        self.members.claim(&name)?;
        self.zip.start_file(name.as_str(), self.options)?;
        let digest = copy_hashed(reader, &mut *self.zip)?;
        debug!(member = %name, size = digest.len, "added to wheel");
        self.record.push(name, digest);
        Ok(())
    }
}

/// Write `{name}-{version}.dist-info/` under `metadata_dir` and return the
/// directory name.
pub fn write_prepared_metadata(config: &Configuration, metadata_dir: &Path) -> Result<String> {
    let dist_info = config.label.dist_info_dir();
    let target = metadata_dir.join(&dist_info);
    fs::create_dir_all(&target)?;
    fs::write(target.join(METADATA), render_lines(&metadata_lines(config)))?;
    fs::write(
        target.join(WHEEL),
        render_lines(&wheel_descriptor_lines(config)),
    )?;
    if let Some(lines) = entry_points_lines(config) {
        fs::write(target.join(ENTRY_POINTS), render_lines(&lines))?;
    }
    info!(path = %target.display(), "prepared wheel metadata");
    Ok(dist_info)
}

/// Accepts either the `.dist-info` directory itself or its parent.
fn verify_prepared_metadata(config: &Configuration, dir: &Path, expected: &[u8]) -> Result<()> {
    let direct = dir.join(METADATA);
    let path = if direct.is_file() {
        direct
    } else {
        dir.join(config.label.dist_info_dir()).join(METADATA)
    };
    match fs::read(&path) {
        Ok(found) if found == expected => {
            debug!(path = %path.display(), "prepared metadata is current");
            Ok(())
        }
        Ok(_) => Err(ConfigError::StaleMetadata { path }.into()),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            Err(ConfigError::StaleMetadata { path }.into())
        }
        Err(err) => Err(err.into()),
    }
}

/// Top-level regular files whose stem is `LICENSE`, in name order.
fn license_files(project_root: &Path) -> Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    for entry in fs::read_dir(project_root)? {
        let entry = entry?;
        if !entry.file_type()?.is_file() {
            continue;
        }
        let path = entry.path();
        let is_license = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .is_some_and(|stem| stem.eq_ignore_ascii_case(LICENSE_STEM));
        if is_license {
            found.push(path);
        }
    }
    found.sort();
    Ok(found)
}

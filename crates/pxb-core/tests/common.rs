#![allow(dead_code)]

use std::{
    fs::{self, File},
    io::Read,
    path::{Path, PathBuf},
};

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use flate2::read::GzDecoder;
use pxb_core::{Backend, ConfigSettings, EnvSnapshot};
use sha2::{Digest, Sha256};
use tempfile::TempDir;

pub const DEMO_PYPROJECT: &str = r#"[project]
name = "demo"
version = "1.0"
"#;

pub fn write_tree(root: &Path, files: &[(&str, &str)]) {
    for (relative, contents) in files {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().expect("parent")).expect("create dirs");
        fs::write(&path, contents).expect("write file");
    }
}

/// `demo` 1.0 with one source file and a LICENSE.
pub fn demo_project() -> TempDir {
    project_with(DEMO_PYPROJECT, &[
        ("src/demo/core.py", "def answer():\n    return 42\n"),
        ("LICENSE", "MIT License\n"),
    ])
}

pub fn project_with(pyproject: &str, files: &[(&str, &str)]) -> TempDir {
    let temp = tempfile::Builder::new()
        .prefix("pxb-project")
        .tempdir()
        .expect("tempdir");
    write_tree(temp.path(), &[("pyproject.toml", pyproject)]);
    write_tree(temp.path(), files);
    temp
}

/// A backend that ignores the process environment.
pub fn backend(root: &Path) -> Backend {
    Backend::new(root).with_env(EnvSnapshot::default())
}

pub fn settings(pairs: &[(&str, &str)]) -> ConfigSettings {
    pairs
        .iter()
        .map(|(key, value)| ((*key).to_string(), (*value).to_string()))
        .collect()
}

pub fn no_settings() -> ConfigSettings {
    ConfigSettings::new()
}

/// Zip members in archive order, with their decompressed bytes.
pub fn zip_members(path: &Path) -> Vec<(String, Vec<u8>)> {
    let file = File::open(path).expect("open wheel");
    let mut archive = zip::ZipArchive::new(file).expect("valid zip");
    let mut members = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).expect("zip entry");
        let mut data = Vec::new();
        entry.read_to_end(&mut data).expect("read zip entry");
        members.push((entry.name().to_string(), data));
    }
    members
}

pub fn zip_names(path: &Path) -> Vec<String> {
    zip_members(path).into_iter().map(|(name, _)| name).collect()
}

pub fn zip_member(path: &Path, name: &str) -> Vec<u8> {
    zip_members(path)
        .into_iter()
        .find(|(member, _)| member == name)
        .map(|(_, data)| data)
        .unwrap_or_else(|| panic!("{name} missing from {}", path.display()))
}

pub struct TarMember {
    pub path: String,
    pub is_dir: bool,
    pub mtime: u64,
    pub uid: u64,
    pub data: Vec<u8>,
}

pub fn tar_members(path: &Path) -> Vec<TarMember> {
    let file = File::open(path).expect("open sdist");
    let mut archive = tar::Archive::new(GzDecoder::new(file));
    let mut members = Vec::new();
    for entry in archive.entries().expect("tar entries") {
        let mut entry = entry.expect("tar entry");
        let header = entry.header();
        let is_dir = header.entry_type().is_dir();
        let mtime = header.mtime().expect("mtime");
        let uid = header.uid().expect("uid");
        let path = entry
            .path()
            .expect("entry path")
            .to_string_lossy()
            .trim_end_matches('/')
            .to_string();
        let mut data = Vec::new();
        entry.read_to_end(&mut data).expect("read tar entry");
        members.push(TarMember {
            path,
            is_dir,
            mtime,
            uid,
            data,
        });
    }
    members
}

pub fn tar_file_names(path: &Path) -> Vec<String> {
    tar_members(path)
        .into_iter()
        .filter(|member| !member.is_dir)
        .map(|member| member.path)
        .collect()
}

pub fn unpack_sdist(path: &Path, dest: &Path) {
    let file = File::open(path).expect("open sdist");
    tar::Archive::new(GzDecoder::new(file))
        .unpack(dest)
        .expect("unpack sdist");
}

pub struct RecordLine {
    pub path: String,
    pub hash: String,
    pub size: String,
}

pub fn parse_record(text: &str) -> Vec<RecordLine> {
    text.lines()
        .map(|line| {
            let mut fields = line.rsplitn(3, ',');
            let size = fields.next().expect("size").to_string();
            let hash = fields.next().expect("hash").to_string();
            let path = fields.next().expect("path").to_string();
            RecordLine { path, hash, size }
        })
        .collect()
}

pub fn record_hash(data: &[u8]) -> String {
    format!("sha256={}", URL_SAFE_NO_PAD.encode(Sha256::digest(data)))
}

pub fn out_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("pxb-out")
        .tempdir()
        .expect("out dir")
}

pub fn artifact(out: &Path, name: &str) -> PathBuf {
    let path = out.join(name);
    assert!(path.is_file(), "{} was not written", path.display());
    path
}

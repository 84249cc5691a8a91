//! Text files synthesized into archives: `PKG-INFO`/`METADATA`, `WHEEL`
//! and `entry_points.txt`.

use pxb_domain::Configuration;

pub const PXB_VERSION: &str = env!("CARGO_PKG_VERSION");

// pyproject.toml-based sdists must declare core metadata 2.2 or later.
const METADATA_VERSION: &str = "2.2";
const WHEEL_VERSION: &str = "1.0";

pub fn metadata_lines(config: &Configuration) -> Vec<String> {
    let metadata = &config.metadata;
    let mut lines = vec![
        format!("Metadata-Version: {METADATA_VERSION}"),
        format!("Name: {}", metadata.name),
        format!("Version: {}", metadata.version),
    ];
    if let Some(summary) = &metadata.summary {
        lines.push(format!("Summary: {summary}"));
    }
    if let Some(requires_python) = &metadata.requires_python {
        lines.push(format!("Requires-Python: {requires_python}"));
    }
    for req in &metadata.requires_dist {
        lines.push(format!("Requires-Dist: {req}"));
    }
    for extra in metadata.optional_requires.keys() {
        lines.push(format!("Provides-Extra: {extra}"));
    }
    for (extra, reqs) in &metadata.optional_requires {
        for req in reqs {
            lines.push(extra_requirement(req, extra));
        }
    }
    lines
}

fn extra_requirement(req: &str, extra: &str) -> String {
    match req.split_once(';') {
        Some((spec, marker)) => format!(
            r#"Requires-Dist: {} ; ({}) and extra == "{extra}""#,
            spec.trim(),
            marker.trim()
        ),
        None => format!(r#"Requires-Dist: {req} ; extra == "{extra}""#),
    }
}

pub fn wheel_descriptor_lines(config: &Configuration) -> Vec<String> {
    let mut lines = vec![
        format!("Wheel-Version: {WHEEL_VERSION}"),
        format!("Generator: pxb {PXB_VERSION}"),
        "Root-Is-Purelib: true".to_string(),
    ];
    lines.extend(
        config
            .tags()
            .expand()
            .into_iter()
            .map(|tag| format!("Tag: {tag}")),
    );
    lines
}

/// `None` when the project declares no scripts or entry points.
pub fn entry_points_lines(config: &Configuration) -> Option<Vec<String>> {
    let groups = &config.metadata.entry_points;
    if groups.is_empty() {
        return None;
    }
    let mut lines = Vec::new();
    for (group, entries) in groups {
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(format!("[{group}]"));
        for (name, target) in entries {
            lines.push(format!("{name} = {target}"));
        }
    }
    Some(lines)
}

/// Newline-joined UTF-8 with exactly one trailing newline.
pub fn render_lines<S: AsRef<str>>(lines: &[S]) -> Vec<u8> {
    let mut text = String::new();
    for line in lines {
        text.push_str(line.as_ref());
        text.push('\n');
    }
    if lines.is_empty() {
        text.push('\n');
    }
    text.into_bytes()
}

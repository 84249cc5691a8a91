use super::hash::FileDigest;
use super::metadata::render_lines;

/// One RECORD line; `digest` is `None` only for RECORD's own entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordEntry {
    pub path: String,
    pub digest: Option<FileDigest>,
}

impl RecordEntry {
    fn render(&self) -> String {
        let path = quote_csv(&self.path);
        match &self.digest {
            Some(digest) => format!("{path},{},{}", digest.record_hash(), digest.len),
            None => format!("{path},,"),
        }
    }
}

/// The wheel manifest, in insertion order.
#[derive(Clone, Debug, Default)]
pub struct Record {
    entries: Vec<RecordEntry>,
}

impl Record {
    pub fn push(&mut self, path: impl Into<String>, digest: FileDigest) {
        self.entries.push(RecordEntry {
            path: path.into(),
            digest: Some(digest),
        });
    }

    /// Add RECORD's own line. Must be the last entry before [`Record::render`].
    pub fn push_self_reference(&mut self, path: impl Into<String>) {
        self.entries.push(RecordEntry {
            path: path.into(),
            digest: None,
        });
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn render(&self) -> Vec<u8> {
        let lines: Vec<String> = self.entries.iter().map(RecordEntry::render).collect();
        render_lines(&lines)
    }
}

fn quote_csv(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::digest_bytes;

    #[test]
    fn renders_hashed_lines_then_self_reference() {
        let mut record = Record::default();
        record.push("demo/__init__.py", digest_bytes(b""));
        record.push("demo-1.0.dist-info/METADATA", digest_bytes(b"hello world"));
        record.push_self_reference("demo-1.0.dist-info/RECORD");

        let text = String::from_utf8(record.render()).unwrap();
        assert_eq!(
            text,
            "demo/__init__.py,sha256=47DEQpj8HBSa-_TImW-5JCeuQeRkm5NMpJWZG3hSuFU,0\n\
             demo-1.0.dist-info/METADATA,sha256=uU0nuZNNPgilLlLX2n2r-sSE7-N6U4DukIj3rOLvzek,11\n\
             demo-1.0.dist-info/RECORD,,\n"
        );
    }

    #[test]
    fn paths_with_commas_are_quoted() {
        let mut record = Record::default();
        record.push("data/a,b \"c\".txt", digest_bytes(b""));
        let text = String::from_utf8(record.render()).unwrap();
        assert!(text.starts_with("\"data/a,b \"\"c\"\".txt\",sha256="));
    }
}

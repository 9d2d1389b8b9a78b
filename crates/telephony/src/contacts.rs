//! File-backed contact directory.
//!
//! Looks up `<contacts_dir>/<phone>.json` documents. Missing or
//! unreadable files are a miss, not an error.

use std::path::PathBuf;

use callreach_core::{ContactDirectory, ContactInfo};

/// Contact directory reading one JSON document per phone number.
#[derive(Debug, Clone)]
pub struct FileContactDirectory {
    dir: PathBuf,
}

impl FileContactDirectory {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl ContactDirectory for FileContactDirectory {
    fn lookup(&self, phone: &str) -> Option<ContactInfo> {
        // Phone numbers come from webhook payloads; keep only characters
        // that can legitimately appear in E.164 so the value cannot
        // traverse paths.
        let sanitized: String =
            phone.chars().filter(|c| c.is_ascii_digit() || *c == '+').collect();
        if sanitized.is_empty() {
            return None;
        }
        let path = self.dir.join(format!("{sanitized}.json"));
        let content = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&content) {
            Ok(info) => Some(info),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable contact file");
                None
            }
        }
    }
}

use std::fs;
use std::path::{Path, PathBuf};

use snafu::prelude::*;

use crate::report::{ReportResult, WritingOutputSnafu};

pub fn simplify_file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

pub fn chart_file_name(question: u32) -> String {
    format!("figure-{}.png", question)
}

pub fn page_file_name(question: u32) -> String {
    format!("question-{}.pdf", question)
}

/// Paths found in a configuration file are relative to this file.
pub fn resolve_path(base_dir: &Path, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
        p.to_path_buf()
    } else {
        base_dir.join(p)
    }
}

pub fn ensure_dir(dir: &Path) -> ReportResult<()> {
    fs::create_dir_all(dir).context(WritingOutputSnafu {
        path: dir.display().to_string(),
    })
}

// src/export.rs
//! Review downloads: CSV/JSON assembly and optional server-side file saves.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::store::StoredReview;

pub const CSV_HEADER: &str =
    "app_id,country,review_id,author,title,text,rating,version,date,source,language";

/// Quote a CSV field only when it needs it; embedded quotes are doubled.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

pub fn to_csv(rows: &[StoredReview]) -> String {
    let mut out = String::from(CSV_HEADER);
    out.push_str("\r\n");
    for r in rows {
        let date = r.date.map(|d| d.to_rfc3339()).unwrap_or_default();
        let line = [
            csv_field(&r.app_id),
            csv_field(&r.country),
            csv_field(&r.review_id),
            csv_field(&r.author),
            csv_field(&r.title),
            csv_field(&r.text),
            r.rating.to_string(),
            csv_field(&r.version),
            csv_field(&date),
            csv_field(&r.source),
            csv_field(&r.language),
        ]
        .join(",");
        out.push_str(&line);
        out.push_str("\r\n");
    }
    out
}

pub fn to_json(rows: &[StoredReview]) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(rows)?)
}

/// Atomic local save: write a temp file next to the target, then rename.
pub fn save_local(path: &Path, bytes: &[u8]) -> Result<()> {
    let tmp: PathBuf = path.with_extension("tmp");
    let mut f = std::fs::File::create(&tmp)?;
    f.write_all(bytes)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

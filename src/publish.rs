use std::fs;

use camino::Utf8Path;
use serde::Serialize;

use crate::error::SeedsError;

#[derive(Debug, Clone, Serialize)]
pub struct PublishResult {
    pub out_dir: String,
    pub items: Vec<PublishItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PublishItem {
    pub file: String,
    pub action: String,
}

/// Copies the root-level static files (sitemap, robots policy, ads manifest)
/// verbatim into `out_dir`. Files missing from `source_dir` are skipped.
pub fn copy_static_files(
    source_dir: &Utf8Path,
    out_dir: &Utf8Path,
    files: &[String],
) -> Result<PublishResult, SeedsError> {
    fs::create_dir_all(out_dir.as_std_path())
        .map_err(|err| SeedsError::Filesystem(format!("create {out_dir}: {err}")))?;

    let mut items = Vec::with_capacity(files.len());
    for file in files {
        let source = source_dir.join(file);
        if !source.as_std_path().is_file() {
            tracing::debug!(%source, "static file not present; skipping");
            items.push(PublishItem {
                file: file.clone(),
                action: "skipped".to_string(),
            });
            continue;
        }
        let dest = out_dir.join(file);
        copy_file_atomic(&source, &dest)?;
        tracing::info!(%source, %dest, "copied static file");
        items.push(PublishItem {
            file: file.clone(),
            action: "copied".to_string(),
        });
    }

    Ok(PublishResult {
        out_dir: out_dir.to_string(),
        items,
    })
}

fn copy_file_atomic(source: &Utf8Path, dest: &Utf8Path) -> Result<(), SeedsError> {
    let parent = dest
        .parent()
        .ok_or_else(|| SeedsError::Filesystem("invalid destination path".to_string()))?;
    fs::create_dir_all(parent.as_std_path())
        .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
    let temp = tempfile::Builder::new()
        .prefix("vulkanseeds-file")
        .tempfile_in(parent.as_std_path())
        .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
    fs::copy(source.as_std_path(), temp.path())
        .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
    if dest.as_std_path().exists() {
        fs::remove_file(dest.as_std_path())
            .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
    }
    temp.persist(dest.as_std_path())
        .map_err(|err| SeedsError::Filesystem(err.to_string()))?;
    Ok(())
}

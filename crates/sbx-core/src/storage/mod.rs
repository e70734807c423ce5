//! Local artifacts: directories, JSON files, the persisted index.
//!
//! Single writer per file, no locking. Every write goes through a `.part`
//! temp file and a rename, so an interrupted run leaves either the previous
//! file or the new one, never half of it. A failed write removes its `.part`
//! file; only a killed process can leave one behind.

mod writer;

pub use writer::StorageWriter;

use serde::Serialize;
use std::fs;
use std::io::ErrorKind as IoErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FetchError;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

/// Path for the temp file: appends `.part` to the final path (e.g. `abc.json` → `abc.json.part`).
pub fn temp_path(final_path: &Path) -> PathBuf {
    let mut o = final_path.as_os_str().to_owned();
    o.push(TEMP_SUFFIX);
    PathBuf::from(o)
}

/// `mkdir -p`. Fails with `NotADirectory` if `path` exists as something else.
pub fn create_dir(path: &Path) -> Result<(), FetchError> {
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Ok(()),
        Ok(_) => {
            return Err(FetchError::NotADirectory {
                path: path.to_path_buf(),
            })
        }
        Err(e) if e.kind() == IoErrorKind::NotFound => {}
        Err(e) => return Err(FetchError::storage(path, e)),
    }
    fs::create_dir_all(path).map_err(|e| FetchError::storage(path, e))
}

fn ensure_dir(dir: &Path) -> Result<(), FetchError> {
    let meta = fs::metadata(dir).map_err(|e| FetchError::storage(dir, e))?;
    if !meta.is_dir() {
        return Err(FetchError::NotADirectory {
            path: dir.to_path_buf(),
        });
    }
    Ok(())
}

/// Re-indent a JSON payload with a one-space indent, keeping key order.
/// Returns None if `data` is not JSON.
fn pretty_json(data: &[u8]) -> Option<Vec<u8>> {
    let value: serde_json::Value = serde_json::from_slice(data).ok()?;
    let mut out = Vec::with_capacity(data.len() + data.len() / 4);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser).ok()?;
    Some(out)
}

/// Write `data` to `dir/file_name`, pretty-printing JSON. `dir` must already exist.
/// Overwrites an existing file.
pub fn write_bytes(data: &[u8], file_name: &str, dir: &Path) -> Result<PathBuf, FetchError> {
    ensure_dir(dir)?;
    let final_path = dir.join(file_name);
    let pretty = pretty_json(data);
    if pretty.is_none() {
        tracing::warn!(path = %final_path.display(), "payload is not JSON, writing verbatim");
    }
    let mut writer = StorageWriter::create(&final_path)?;
    if let Err(e) = writer.write_all(pretty.as_deref().unwrap_or(data)) {
        writer.discard();
        return Err(e);
    }
    writer.finalize()
}

/// Read `dir/file_name` back.
pub fn read_bytes(file_name: &str, dir: &Path) -> Result<Vec<u8>, FetchError> {
    let path = dir.join(file_name);
    fs::read(&path).map_err(|e| FetchError::storage(path, e))
}

/// File name of a project's persisted index.
pub fn index_file_name(project: &str) -> String {
    format!("{}.json", project)
}

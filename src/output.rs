use std::ffi::OsString;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use tracing::info;

use crate::error::{EnrichError, Result};
use crate::neighborhood::Neighborhood;

/// Renders the records as a JSON array indented by four spaces. Non-ASCII
/// text is written as-is.
pub fn to_json(neighborhoods: &[Neighborhood]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    neighborhoods.serialize(&mut ser)?;
    Ok(buf)
}

/// Writes the records to `path` through a sibling temp file, so a failed
/// run never leaves a truncated output behind.
pub fn write_neighborhoods(path: &Path, neighborhoods: &[Neighborhood]) -> Result<()> {
    let bytes = to_json(neighborhoods)?;

    replace_file(path, |file| file.write_all(&bytes))?;

    info!(
        path = %path.display(),
        neighborhoods = neighborhoods.len(),
        bytes = bytes.len(),
        "wrote neighborhood data"
    );
    Ok(())
}

/// Runs `write` against a fresh sibling temp file and renames it over
/// `path`. The temp file is removed on every failure.
fn replace_file<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> io::Result<()>,
{
    let tmp_path = temp_path_for(path);
    let written = File::create(&tmp_path).and_then(|mut file| {
        write(&mut file)?;
        file.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(EnrichError::io(&tmp_path, e));
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(EnrichError::io(path, e));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = OsString::from(".");
    name.push(path.file_name().unwrap_or_else(|| "output".as_ref()));
    name.push(".tmp");
    path.with_file_name(name)
}

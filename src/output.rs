use std::{ffi::OsString, fs, path::Path};

/// Writes `contents` to a `.tmp` sibling of `path`, then renames it into
/// place, so readers never see a half-written file.
pub fn write_atomically(path: &Path, contents: &str) -> std::io::Result<()> {
    let mut tmp_name = path.file_name().map(OsString::from).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    log::info!("Written {} ({} bytes)", path.display(), contents.len());
    Ok(())
}

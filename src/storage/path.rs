use std::path::{Path, PathBuf};

/// Derives the default output path from the input path.
///
/// Every occurrence of `.xml` in the path is replaced by `<suffix>.xml`, so
/// `collation/John.xml` becomes `collation/John_opencbgm.xml`. If the path
/// contains no `.xml`, `<suffix>.xml` is appended to the file name instead.
#[must_use]
pub fn default_output_path(input: &Path, suffix: &str) -> PathBuf {
    let raw = input.to_string_lossy();
    if raw.contains(".xml") {
        PathBuf::from(raw.replace(".xml", &format!("{suffix}.xml")))
    } else {
        PathBuf::from(format!("{raw}{suffix}.xml"))
    }
}

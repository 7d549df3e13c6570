use std::fs;
use std::path::Path;

use super::Result;

/// Names of the entries in `directory` ending with `extension`, sorted.
/// A missing directory is not an error and yields no names.
pub fn list_files(directory: &Path, extension: &str) -> Result<Vec<String>> {
    if !directory.is_dir() {
        return Ok(Vec::new());
    }

    let mut names = Vec::new();
    for entry in fs::read_dir(directory)? {
        let name = entry?.file_name().to_string_lossy().into_owned();
        if name.ends_with(extension) {
            names.push(name);
        }
    }
    names.sort();

    Ok(names)
}

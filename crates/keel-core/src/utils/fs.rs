use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Recursively collect the files under `path` accepted by `predicate`.
///
/// A missing `path` yields an empty list. Results are sorted so that callers
/// see a stable order regardless of directory iteration order.
pub fn find_files<P, F>(path: P, predicate: &F) -> io::Result<Vec<PathBuf>>
where
    P: AsRef<Path>,
    F: Fn(&Path) -> bool + ?Sized,
{
    let mut result = Vec::new();
    collect(path.as_ref(), predicate, &mut result)?;
    result.sort();
    Ok(result)
}

fn collect<F>(path: &Path, predicate: &F, result: &mut Vec<PathBuf>) -> io::Result<()>
where
    F: Fn(&Path) -> bool + ?Sized,
{
    if !path.exists() {
        return Ok(());
    }

    if path.is_file() {
        if predicate(path) {
            result.push(path.to_path_buf());
        }
        return Ok(());
    }

    for entry in fs::read_dir(path)? {
        let entry_path = entry?.path();
        if entry_path.is_dir() {
            collect(&entry_path, predicate, result)?;
        } else if entry_path.is_file() && predicate(&entry_path) {
            result.push(entry_path);
        }
    }
    Ok(())
}

/// Find files with a specific extension (case-insensitive, without the dot)
pub fn find_files_with_extension<P: AsRef<Path>>(
    path: P,
    extension: &str,
) -> io::Result<Vec<PathBuf>> {
    let extension_lower = extension.to_lowercase();
    find_files(path, &move |p: &Path| match p.extension() {
        Some(ext) => ext.to_string_lossy().to_lowercase() == extension_lower,
        None => false,
    })
}

/// Path of `file` relative to `root`, without extension and with `/`
/// separators (`<root>/site/404.html` -> `site/404`).
pub fn relative_stem(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?.with_extension("");
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

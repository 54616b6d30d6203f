//! Custom assertions over downloaded directory trees

use std::path::Path;
use walkdir::WalkDir;

/// Every file under `root`, as sorted `/`-separated relative paths
pub fn files_under(root: &Path) -> Vec<String> {
    let mut files: Vec<String> = WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| {
            e.path().strip_prefix(root).ok().map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/")
            })
        })
        .collect();
    files.sort();
    files
}

/// Assert a downloaded file exists with the given content
pub fn assert_file(root: &Path, relative: &str, expected: &str) {
    let path = root.join(relative);
    let actual = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("expected {} to exist: {e}", path.display()));
    assert_eq!(actual, expected, "unexpected content in {relative}");
}

/// Assert no partial files were left behind
pub fn assert_no_partials(root: &Path) {
    let partials: Vec<_> = files_under(root)
        .into_iter()
        .filter(|f| f.ends_with(".partial"))
        .collect();
    assert!(partials.is_empty(), "partial files left behind: {partials:?}");
}

use ignore::Walk;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Lists the files under `folder`, skipping anything `.gitignore` excludes.
pub fn collect_folder(folder: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for result in Walk::new(folder) {
        match result {
            Ok(entry) => {
                if entry.path().is_file() {
                    files.push(entry.path().to_path_buf());
                }
            }
            Err(e) => warn!(error = %e, "error walking directory"),
        }
    }
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_nested_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("a.txt"), b"a").unwrap();
        std::fs::write(dir.path().join("sub").join("b.txt"), b"b").unwrap();

        let files = collect_folder(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("sub/b.txt")));
    }

    #[test]
    fn honors_gitignore() {
        let dir = tempfile::tempdir().unwrap();
        // `ignore` only reads .gitignore inside a git repository unless told otherwise,
        // so mark the folder as one.
        std::fs::create_dir(dir.path().join(".git")).unwrap();
        std::fs::write(dir.path().join(".gitignore"), "*.log\n").unwrap();
        std::fs::write(dir.path().join("keep.txt"), b"k").unwrap();
        std::fs::write(dir.path().join("drop.log"), b"d").unwrap();

        let files = collect_folder(dir.path());
        assert!(files.iter().any(|p| p.ends_with("keep.txt")));
        assert!(!files.iter().any(|p| p.ends_with("drop.log")));
    }
}

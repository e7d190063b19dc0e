use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum IoError {
    #[error("File not found: {0}")]
    NotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Not a directory: {0}")]
    InvalidDir(PathBuf),
}

/// Read a markdown file and return its content
pub fn read_file(path: &Path) -> Result<String, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read_to_string(path).map_err(IoError::Io)
}

/// Read a binary file (images for inlining)
pub fn read_bytes(path: &Path) -> Result<Vec<u8>, IoError> {
    if !path.exists() {
        return Err(IoError::NotFound(path.to_path_buf()));
    }
    fs::read(path).map_err(IoError::Io)
}

/// Write content to a file, creating parent directories as needed
pub fn write_file(path: &Path, content: &str) -> Result<(), IoError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(IoError::Io)?;
    }

    fs::write(path, content).map_err(IoError::Io)
}

/// Recursively collect files below `root` whose extension is in `extensions`
/// (case-insensitive), skipping directories named in `skip_dirs`. Sorted.
pub fn scan_files(
    root: &Path,
    extensions: &[&str],
    skip_dirs: &[&str],
) -> Result<Vec<PathBuf>, IoError> {
    if !root.is_dir() {
        return Err(IoError::InvalidDir(root.to_path_buf()));
    }

    let mut files = Vec::new();
    scan_directory_recursive(root, extensions, skip_dirs, &mut files)?;
    files.sort();
    Ok(files)
}

fn scan_directory_recursive(
    dir: &Path,
    extensions: &[&str],
    skip_dirs: &[&str],
    files: &mut Vec<PathBuf>,
) -> Result<(), IoError> {
    let entries = fs::read_dir(dir).map_err(IoError::Io)?;

    for entry in entries {
        let entry = entry.map_err(IoError::Io)?;
        let path = entry.path();

        if path.is_dir() {
            let skipped = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| skip_dirs.contains(&name));
            if !skipped {
                scan_directory_recursive(&path, extensions, skip_dirs, files)?;
            }
        } else if let Some(ext) = path.extension().and_then(|ext| ext.to_str())
            && extensions.iter().any(|e| e.eq_ignore_ascii_case(ext))
        {
            files.push(path);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{create_test_dir, create_test_file};

    const IMAGES: &[&str] = &["png", "jpg"];

    #[test]
    fn test_scan_filters_by_extension() {
        // Given a directory with mixed file types
        let dir = create_test_dir();
        create_test_file(&dir, "a.png", b"png");
        create_test_file(&dir, "B.JPG", b"jpg");
        create_test_file(&dir, "notes.md", b"# Notes");

        // When scanning for images
        let files = scan_files(dir.path(), IMAGES, &[]).unwrap();

        // Then only the images are found, sorted
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["B.JPG", "a.png"]);
    }

    #[test]
    fn test_scan_nested_and_skipped_directories() {
        let dir = create_test_dir();
        create_test_file(&dir, "img/deep/x.png", b"x");
        create_test_file(&dir, "node_modules/pkg/y.png", b"y");

        let files = scan_files(dir.path(), IMAGES, &["node_modules"]).unwrap();

        assert_eq!(files, vec![dir.path().join("img/deep/x.png")]);
    }

    #[test]
    fn test_scan_missing_directory() {
        let result = scan_files(Path::new("/this/path/does/not/exist"), IMAGES, &[]);
        assert!(matches!(result, Err(IoError::InvalidDir(_))));
    }

    #[test]
    fn test_read_file_not_found() {
        let dir = create_test_dir();
        let result = read_file(&dir.path().join("nonexistent.md"));
        assert!(matches!(result, Err(IoError::NotFound(_))));
    }

    #[test]
    fn test_write_file_creates_parent_directories() {
        let dir = create_test_dir();
        let path = dir.path().join("folder/subfolder/out.html");

        write_file(&path, "<p>hi</p>").unwrap();

        assert_eq!(read_file(&path).unwrap(), "<p>hi</p>");
        assert!(dir.path().join("folder/subfolder").is_dir());
    }

    #[test]
    fn test_read_bytes() {
        let dir = create_test_dir();
        let path = create_test_file(&dir, "pic.gif", &[0x47, 0x49, 0x46]);

        assert_eq!(read_bytes(&path).unwrap(), vec![0x47, 0x49, 0x46]);
    }
}

//! Path and directory management.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::fs::naming::output_file_name;
use crate::page::ShareReference;

/// Output path of one list entry: `<out_dir>/<prefix><id>.<container>`.
pub fn batch_output_path(
    out_dir: &Path,
    prefix: Option<&str>,
    id: &ShareReference,
    container: &str,
) -> Result<PathBuf> {
    Ok(out_dir.join(output_file_name(prefix, id, container)?))
}

/// Output path in single mode.
///
/// An explicit `--out` names the file; an existing directory receives
/// `<id>.<container>`. Without `--out` the file lands in the working directory.
pub fn single_output_path(
    out: Option<&Path>,
    id: &ShareReference,
    container: &str,
) -> Result<PathBuf> {
    match out {
        Some(dir) if dir.is_dir() => Ok(dir.join(output_file_name(None, id, container)?)),
        Some(file) if file.extension().is_none() => {
            Ok(file.with_extension(container.trim_start_matches('.')))
        }
        Some(file) => Ok(file.to_path_buf()),
        None => Ok(PathBuf::from(output_file_name(None, id, container)?)),
    }
}

/// Directory a process writing `path` should run in.
pub fn working_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Ensure the parent directory of `path` exists, creating it if necessary.
pub async fn ensure_parent_dir(path: &Path) -> Result<()> {
    let dir = working_dir(path);
    if !dir.exists() {
        tokio::fs::create_dir_all(&dir).await?;
    }
    Ok(())
}

/// Read a list file of share URLs.
///
/// One URL per line. Blank lines and lines starting with `#` are skipped,
/// and input order is preserved.
pub async fn read_url_list(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path).await?;
    Ok(parse_url_list(&content))
}

fn parse_url_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::extract_id;

    #[test]
    fn test_batch_output_path() {
        let id = extract_id("https://example.com/share/abc123").unwrap();
        let path = batch_output_path(Path::new("/downloads"), Some("ep_"), &id, "mp4").unwrap();
        assert_eq!(path, PathBuf::from("/downloads/ep_abc123.mp4"));
    }

    #[test]
    fn test_single_output_path() {
        let id = extract_id("https://example.com/share/abc123").unwrap();
        assert_eq!(
            single_output_path(None, &id, "mp4").unwrap(),
            PathBuf::from("abc123.mp4")
        );
        assert_eq!(
            single_output_path(Some(Path::new("/tmp/nonexistent-dir/clip.mkv")), &id, "mp4")
                .unwrap(),
            PathBuf::from("/tmp/nonexistent-dir/clip.mkv")
        );
        assert_eq!(
            single_output_path(Some(Path::new("/nonexistent/clip")), &id, "mp4").unwrap(),
            PathBuf::from("/nonexistent/clip.mp4")
        );

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            single_output_path(Some(dir.path()), &id, "mp4").unwrap(),
            dir.path().join("abc123.mp4")
        );
    }

    #[test]
    fn test_working_dir() {
        assert_eq!(working_dir(Path::new("clip.mp4")), PathBuf::from("."));
        assert_eq!(working_dir(Path::new("/a/b/clip.mp4")), PathBuf::from("/a/b"));
    }

    #[test]
    fn test_parse_url_list() {
        let urls = parse_url_list(
            "# weekend batch\nhttps://example.com/share/a\n\n  https://example.com/share/b  \n",
        );
        assert_eq!(
            urls,
            vec!["https://example.com/share/a", "https://example.com/share/b"]
        );
    }

    #[tokio::test]
    async fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a").join("b").join("clip.mp4");
        ensure_parent_dir(&file).await.unwrap();
        assert!(file.parent().unwrap().is_dir());
    }
}

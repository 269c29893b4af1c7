use std::fs;
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use crate::api::Snippet;
use crate::clipboard::{write_clipboard, ClipboardError};

#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    #[error("There is no content to copy or download.")]
    NothingLoaded,
    #[error("'{0}' is not a usable file name")]
    InvalidFileName(String),
    #[error("{} already exists", .0.display())]
    AlreadyExists(PathBuf),
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Clipboard(#[from] ClipboardError),
}

/// `<identifier>.<language>`, or `.txt` without a language
pub fn download_file_name(slug: &str, language: Option<&str>) -> String {
    let extension = language
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .unwrap_or("txt");
    format!("{}.{}", slug, extension)
}

/// Reject names that would escape the target directory
fn checked_file_name(name: &str) -> Result<&str, ActionError> {
    let mut components = Path::new(name).components();
    match (components.next(), components.next()) {
        (Some(Component::Normal(_)), None) => Ok(name),
        _ => Err(ActionError::InvalidFileName(name.to_string())),
    }
}

/// Write the snippet body into `dir`. The file appears complete or not at all,
/// and an existing file of the same name is left untouched.
pub fn download(snippet: &Snippet, dir: &Path) -> Result<PathBuf, ActionError> {
    if snippet.content.is_empty() {
        return Err(ActionError::NothingLoaded);
    }

    let name = download_file_name(&snippet.slug, snippet.language.as_deref());
    let target = dir.join(checked_file_name(&name)?);
    if target.exists() {
        return Err(ActionError::AlreadyExists(target));
    }
    let tmp_path = dir.join(format!(".{}.part", name));

    let written = (|| -> std::io::Result<()> {
        let mut tmp = fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&tmp_path)?;
        tmp.write_all(snippet.content.as_bytes())?;
        tmp.sync_all()?;
        fs::rename(&tmp_path, &target)
    })();

    if let Err(e) = written {
        // Never leave the partial file behind
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    tracing::info!(path = %target.display(), bytes = snippet.content.len(), "snippet downloaded");
    Ok(target)
}

/// Copy the snippet body to the system clipboard
pub fn copy(snippet: &Snippet) -> Result<(), ActionError> {
    if snippet.content.is_empty() {
        return Err(ActionError::NothingLoaded);
    }
    write_clipboard(&snippet.content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snippet(slug: &str, language: Option<&str>, content: &str) -> Snippet {
        Snippet {
            slug: slug.to_string(),
            content: content.to_string(),
            language: language.map(str::to_string),
            expires_at: None,
            one_time_view: false,
            created_at: None,
        }
    }

    #[test]
    fn test_download_file_name() {
        assert_eq!(download_file_name("abc", Some("rust")), "abc.rust");
        assert_eq!(download_file_name("abc", None), "abc.txt");
        assert_eq!(download_file_name("abc", Some(" ")), "abc.txt");
    }

    #[test]
    fn test_download_writes_displayed_content() {
        let dir = tempfile::tempdir().unwrap();
        let body = "fn main() {\n    println!(\"hi\");\n}\n";

        let path = download(&snippet("aB3", Some("rust"), body), dir.path()).unwrap();
        assert_eq!(path, dir.path().join("aB3.rust"));
        assert_eq!(fs::read_to_string(&path).unwrap(), body);

        // Only the final file remains
        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_download_without_language_uses_txt() {
        let dir = tempfile::tempdir().unwrap();
        let path = download(&snippet("q1", None, "plain"), dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "q1.txt");
    }

    #[test]
    fn test_download_rejects_escaping_names() {
        let dir = tempfile::tempdir().unwrap();
        let err = download(&snippet("x", Some("/../../etc/passwd"), "body"), dir.path()).unwrap_err();
        assert!(matches!(err, ActionError::InvalidFileName(_)));
    }

    #[test]
    fn test_empty_content_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            download(&snippet("x", None, ""), dir.path()),
            Err(ActionError::NothingLoaded)
        ));
        assert!(matches!(copy(&snippet("x", None, "")), Err(ActionError::NothingLoaded)));
    }

    #[test]
    fn test_download_keeps_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("aB3.rust");
        fs::write(&existing, "mine").unwrap();

        let err = download(&snippet("aB3", Some("rust"), "theirs"), dir.path()).unwrap_err();
        assert!(matches!(err, ActionError::AlreadyExists(ref path) if *path == existing));
        assert_eq!(fs::read_to_string(&existing).unwrap(), "mine");

        let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
    }
}

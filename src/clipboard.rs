use std::io::Write;
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no clipboard tool available (tried {0})")]
    Unavailable(String),
    #[error("clipboard tool failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Clipboard writers to try in order, per platform
#[cfg(target_os = "macos")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(target_os = "linux")]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard", "-i"]),
    ("xsel", &["--clipboard", "--input"]),
];

#[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
const CLIPBOARD_COMMANDS: &[(&str, &[&str])] = &[];

/// Put text on the system clipboard
pub fn write_clipboard(text: &str) -> Result<(), ClipboardError> {
    let commands = CLIPBOARD_COMMANDS;

    for (program, args) in commands {
        match pipe_to(program, args, text) {
            Ok(true) => {
                tracing::debug!(program, bytes = text.len(), "copied to clipboard");
                return Ok(());
            }
            Ok(false) => tracing::debug!(program, "clipboard tool exited with failure"),
            // Not installed, try the next one
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => continue,
            Err(e) => return Err(e.into()),
        }
    }

    let tried: Vec<&str> = commands.iter().map(|(program, _)| *program).collect();
    Err(ClipboardError::Unavailable(tried.join(", ")))
}

/// Run `program` with `text` on stdin. Ok(false) when it exits non-zero.
fn pipe_to(program: &str, args: &[&str], text: &str) -> std::io::Result<bool> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(text.as_bytes())?;
    }

    Ok(child.wait()?.success())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(any(target_os = "macos", target_os = "windows", target_os = "linux"))]
    fn test_platform_has_candidates() {
        assert!(!CLIPBOARD_COMMANDS.is_empty());
    }

    #[test]
    #[cfg(unix)]
    fn test_pipe_to_reports_exit_status() {
        assert!(pipe_to("cat", &[], "hello").unwrap());
        assert!(!pipe_to("false", &[], "").unwrap());
    }

    #[test]
    fn test_missing_program_is_not_found() {
        let err = pipe_to("definitely-not-a-clipboard-tool", &[], "x").unwrap_err();
        assert_eq!(err.kind(), std::io::ErrorKind::NotFound);
    }
}

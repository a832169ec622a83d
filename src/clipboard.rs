use std::fmt;
use std::io::ErrorKind;

use tokio::process::Command;

#[derive(Debug, Clone, PartialEq)]
pub enum ClipboardError {
    /// No clipboard tool for this session.
    Unavailable(String),
    /// The tool ran but reading failed (no permission, no owner, ...).
    Read(String),
}

impl ClipboardError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ClipboardError::Unavailable(_) => "当前环境不支持剪切板功能",
            ClipboardError::Read(_) => "读取剪切板失败，请检查剪切板权限",
        }
    }
}

impl fmt::Display for ClipboardError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ClipboardError::Unavailable(msg) => write!(f, "Clipboard unavailable: {msg}"),
            ClipboardError::Read(msg) => write!(f, "Clipboard read failed: {msg}"),
        }
    }
}

impl std::error::Error for ClipboardError {}

/// Read text from the system clipboard.
/// Uses pbpaste on macOS, wl-paste on Wayland, xclip on X11.
pub async fn read_from_clipboard() -> Result<String, ClipboardError> {
    #[cfg(target_os = "macos")]
    let (cmd, args): (&str, Vec<&str>) = ("pbpaste", vec![]);

    #[cfg(not(target_os = "macos"))]
    let (cmd, args): (&str, Vec<&str>) = {
        let session_type = std::env::var("XDG_SESSION_TYPE").unwrap_or_default();
        if session_type == "wayland" {
            ("wl-paste", vec!["--no-newline"])
        } else {
            ("xclip", vec!["-selection", "clipboard", "-o"])
        }
    };

    let output = Command::new(cmd)
        .args(&args)
        .output()
        .await
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => ClipboardError::Unavailable(format!("{cmd} not found")),
            _ => ClipboardError::Read(format!("Failed to spawn {cmd}: {e}")),
        })?;

    // wl-paste exits non-zero on an empty clipboard; report that as empty text.
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("No selection") || stderr.contains("Nothing is copied") {
            return Ok(String::new());
        }
        return Err(ClipboardError::Read(format!(
            "{cmd} exited with status {}",
            output.status
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

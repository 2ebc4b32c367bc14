use std::sync::Mutex;

use tracing::warn;

/// Somewhere copied text can go
pub trait Clipboard: Send + Sync {
    fn copy(&self, text: &str) -> Result<(), String>;
}

/// The desktop clipboard, via arboard.
///
/// The arboard handle is created on first use and kept for the life of the
/// process: on X11 and Wayland the owning handle must stay alive for other
/// programs to read what was copied.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), String> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| "Clipboard unavailable".to_string())?;

        if guard.is_none() {
            let clipboard = arboard::Clipboard::new().map_err(|e| {
                warn!(error = %e, "clipboard unavailable");
                format!("Clipboard unavailable: {}", e)
            })?;
            *guard = Some(clipboard);
        }

        let Some(clipboard) = guard.as_mut() else {
            return Err("Clipboard unavailable".to_string());
        };
        clipboard.set_text(text).map_err(|e| {
            warn!(error = %e, "clipboard copy failed");
            format!("Copy failed: {}", e)
        })
    }
}

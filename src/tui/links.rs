use anyhow::{Context, Result};
use std::sync::mpsc as std_mpsc;
use std::sync::OnceLock;
use std::time::Duration;

use super::state::UiState;
use crate::cards;

// Global clipboard manager channel - initialized once on first use
static CLIPBOARD_SENDER: OnceLock<std_mpsc::Sender<String>> = OnceLock::new();

/// Open an outbound link in the system browser without blocking the UI thread.
pub fn open_link(url: &str) -> Result<()> {
    open::that_detached(url).with_context(|| format!("open {url}"))
}

/// Open the selected launch's link with the given label ("Article" or "Video").
pub fn open_selected_link(state: &mut UiState, label: &str) {
    let url = state.selected_record().and_then(|r| {
        cards::link_items(r.links.as_ref())
            .into_iter()
            .find(|i| i.label == label)
            .map(|i| i.url.to_string())
    });
    match url {
        Some(url) => match open_link(&url) {
            Ok(()) => state.info = format!("Opened {}: {}", label, url),
            Err(e) => state.info = format!("Open failed: {e:#}"),
        },
        None => state.info = format!("No {} link for this launch", label.to_lowercase()),
    }
}

/// Copy the selected launch's first link to the clipboard.
pub fn copy_selected_link(state: &mut UiState) {
    let url = state.selected_record().and_then(|r| {
        cards::link_items(r.links.as_ref())
            .first()
            .map(|i| i.url.to_string())
    });
    let Some(url) = url else {
        state.info = "No link to copy for this launch".into();
        return;
    };
    match copy_to_clipboard(&url) {
        Ok(()) => {
            let display = if url.chars().count() > 60 {
                format!("{}...", url.chars().take(57).collect::<String>())
            } else {
                url
            };
            state.info = format!("✓ Copied to clipboard: {}", display);
        }
        Err(e) => state.info = format!("Clipboard copy failed: {e:#}"),
    }
}

/// Initialize the clipboard manager thread if not already initialized.
/// Each clipboard instance is kept alive for a while so clipboard managers on Linux
/// get a chance to read the contents.
fn init_clipboard_manager() -> Result<&'static std_mpsc::Sender<String>> {
    CLIPBOARD_SENDER.get_or_init(|| {
        let (tx, rx) = std_mpsc::channel::<String>();

        std::thread::spawn(move || {
            use arboard::Clipboard;

            for text in rx {
                if let Ok(mut clipboard) = Clipboard::new() {
                    if clipboard.set_text(&text).is_ok() {
                        std::thread::sleep(Duration::from_secs(2));
                    }
                }
            }
        });

        tx
    });

    CLIPBOARD_SENDER
        .get()
        .ok_or_else(|| anyhow::anyhow!("Failed to initialize clipboard manager"))
}

/// Queue text for the clipboard thread; returns without waiting for it.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let sender = init_clipboard_manager()?;
    sender
        .send(text.to_string())
        .map_err(|_| anyhow::anyhow!("Clipboard manager channel closed"))?;
    Ok(())
}

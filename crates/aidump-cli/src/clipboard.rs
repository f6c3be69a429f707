use anyhow::{Context, Result};
use arboard::Clipboard;
use tracing::debug;

pub fn copy_text(text: &str) -> Result<()> {
    debug!("Copying {} bytes to the clipboard", text.len());
    let mut clipboard = Clipboard::new().context("Failed to open the clipboard")?;
    clipboard
        .set_text(text.to_string())
        .context("Failed to write to the clipboard")?;
    Ok(())
}

pub fn read_text() -> Result<String> {
    let mut clipboard = Clipboard::new().context("Failed to open the clipboard")?;
    clipboard
        .get_text()
        .context("Failed to read text from the clipboard")
}

//! Uploaded files and photos
//!
//! Naming of saved attachments and the prompts that point Claude at them.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};

/// Keep only the last path component of a sender supplied name
pub fn sanitize_file_name(raw: Option<&str>) -> String {
    raw.and_then(|name| Path::new(name).file_name())
        .and_then(|n| n.to_str())
        .filter(|n| !n.trim().is_empty())
        .unwrap_or("file")
        .to_string()
}

/// `photo_<unix millis>.jpg`
pub fn photo_file_name(now: DateTime<Utc>) -> String {
    format!("photo_{}.jpg", now.timestamp_millis())
}

/// Where an attachment with `file_name` is stored
pub fn download_target(download_dir: &Path, file_name: &str) -> PathBuf {
    download_dir.join(file_name)
}

fn caption_of(caption: Option<&str>) -> Option<&str> {
    caption.map(str::trim).filter(|c| !c.is_empty())
}

/// Prompt for a saved document
pub fn document_prompt(caption: Option<&str>, path: &Path) -> String {
    match caption_of(caption) {
        Some(caption) => format!(
            "{}\n\nThe file is located at: {}\nRead the file and use it to answer.",
            caption,
            path.display()
        ),
        None => format!("Read and analyze the file at: {}", path.display()),
    }
}

/// Prompt for a saved photo
pub fn photo_prompt(caption: Option<&str>, path: &Path) -> String {
    match caption_of(caption) {
        Some(caption) => format!(
            "{}\n\nThe image is located at: {}\nRead the image file and use it to answer.",
            caption,
            path.display()
        ),
        None => format!("Read and describe the image at: {}", path.display()),
    }
}

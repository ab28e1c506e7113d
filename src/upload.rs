use std::fs;
use std::path::Path;

use tempfile::TempPath;

use crate::error::{PotholeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn from_path(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();

        match extension.as_str() {
            "jpg" | "jpeg" | "png" => Ok(MediaKind::Image),
            "mp4" => Ok(MediaKind::Video),
            _ => Err(PotholeError::UnsupportedInput(format!(
                "{} (expected jpg, jpeg, png or mp4)",
                path.display()
            ))),
        }
    }
}

/// A copy of the input placed in the uploads directory for the duration of
/// one request, under a unique name. The copy is deleted on drop.
#[derive(Debug)]
pub struct Upload {
    path: TempPath,
    kind: MediaKind,
}

impl Upload {
    pub fn stage(input: &Path, uploads_dir: &Path) -> Result<Self> {
        let kind = MediaKind::from_path(input)?;
        let stem = input
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("upload");
        let suffix = input
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| format!(".{e}"))
            .unwrap_or_default();

        fs::create_dir_all(uploads_dir)?;
        let staged = tempfile::Builder::new()
            .prefix(&format!("{stem}-"))
            .suffix(&suffix)
            .tempfile_in(uploads_dir)?
            .into_temp_path();
        fs::copy(input, &staged)?;
        log::debug!("Staged {} as {}", input.display(), staged.display());

        Ok(Self { path: staged, kind })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }
}

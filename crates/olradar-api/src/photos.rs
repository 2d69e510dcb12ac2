use std::path::PathBuf;

use anyhow::Result;
use axum::{
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use tokio::fs;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::state::AppState;

/// 10 MB cap per photo.
pub const MAX_PHOTO_SIZE: usize = 10 * 1024 * 1024;

/// Flat on-disk blob store for submitted photos.
///
/// Each photo is stored once as `{dir}/{uuid}.{ext}` and never rewritten.
pub struct PhotoStorage {
    dir: PathBuf,
}

impl PhotoStorage {
    pub async fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Photo storage directory: {}", dir.display());
        Ok(Self { dir })
    }

    /// Store a photo and return its file name.
    pub async fn save(&self, bytes: &[u8], content_type: Option<&str>) -> Result<String> {
        let file_name = format!("{}.{}", Uuid::new_v4(), extension_for(content_type));
        fs::write(self.dir.join(&file_name), bytes).await?;
        info!("Stored photo {} ({} bytes)", file_name, bytes.len());
        Ok(file_name)
    }

    /// Read a stored photo. `None` if the name is not one we could have
    /// written or the file is gone.
    pub async fn read(&self, file_name: &str) -> Result<Option<Vec<u8>>> {
        if !is_valid_name(file_name) {
            return Ok(None);
        }
        match fs::read(self.dir.join(file_name)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn delete(&self, file_name: &str) -> Result<()> {
        if !is_valid_name(file_name) {
            return Ok(());
        }
        match fs::remove_file(self.dir.join(file_name)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Photo {} already gone", file_name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

fn extension_for(content_type: Option<&str>) -> &'static str {
    match content_type.unwrap_or_default() {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/heic" => "heic",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

fn content_type_for(file_name: &str) -> &'static str {
    match file_name.rsplit('.').next().unwrap_or_default() {
        "png" => "image/png",
        "webp" => "image/webp",
        "heic" => "image/heic",
        "gif" => "image/gif",
        _ => "image/jpeg",
    }
}

/// Only `{uuid}.{ext}` names are served, which rules out path traversal.
fn is_valid_name(file_name: &str) -> bool {
    match file_name.split_once('.') {
        Some((stem, ext)) => {
            stem.parse::<Uuid>().is_ok() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

/// GET /photos/{file}
pub async fn get_photo(
    State(state): State<AppState>,
    Path(file_name): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = state
        .photos
        .read(&file_name)
        .await?
        .ok_or(ApiError::NotFound("photo"))?;

    Ok(([(header::CONTENT_TYPE, content_type_for(&file_name))], bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn save_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path().join("photos")).await.unwrap();

        let name = storage.save(b"\x89PNG fake", Some("image/png")).await.unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(storage.read(&name).await.unwrap().unwrap(), b"\x89PNG fake");

        storage.delete(&name).await.unwrap();
        assert!(storage.read(&name).await.unwrap().is_none());
        storage.delete(&name).await.unwrap();
    }

    #[tokio::test]
    async fn refuses_foreign_names() {
        let dir = tempfile::tempdir().unwrap();
        let storage = PhotoStorage::new(dir.path().to_path_buf()).await.unwrap();
        assert!(storage.read("../secrets.txt").await.unwrap().is_none());
        assert!(storage.read("not-a-uuid.jpg").await.unwrap().is_none());
    }

    #[test]
    fn content_types() {
        assert_eq!(extension_for(None), "jpg");
        assert_eq!(extension_for(Some("image/webp")), "webp");
        assert_eq!(content_type_for("x.png"), "image/png");
        assert_eq!(content_type_for("x.jpg"), "image/jpeg");
    }
}

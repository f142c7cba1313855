//! Stored recipe images.
//!
//! Recipes accept an inline base64 data URI on write (`<prefix>;base64,<data>`).
//! The payload is decoded, the format sniffed from magic bytes, and the bytes
//! written under the media root with a short generated name. Reads always see
//! a `/media/<file>` URL; the files themselves are served with `ServeDir`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use base64::Engine;
use image::ImageFormat;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImageError {
    #[error("Image must be a base64 data URI")]
    NotDataUri,

    #[error("Invalid base64 image payload: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("Unrecognized image format")]
    UnknownFormat,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory stored images live in. Overridable for deployments where media
/// sits on a mounted volume.
pub fn media_root() -> PathBuf {
    env::var("MEDIA_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("media"))
}

pub fn image_url(file_name: &str) -> String {
    format!("/media/{}", file_name)
}

/// Decode a `<prefix>;base64,<data>` payload and infer the file extension
/// from the image magic bytes. A detected JPEG maps to the `jpg` extension.
pub fn decode_data_uri(payload: &str) -> Result<(Vec<u8>, &'static str), ImageError> {
    let (_, encoded) = payload.split_once(";base64,").ok_or(ImageError::NotDataUri)?;
    let bytes = base64::engine::general_purpose::STANDARD.decode(encoded)?;

    let format = image::guess_format(&bytes).map_err(|_| ImageError::UnknownFormat)?;
    let extension = match format {
        ImageFormat::Jpeg => "jpg",
        other => other
            .extensions_str()
            .first()
            .copied()
            .ok_or(ImageError::UnknownFormat)?,
    };

    Ok((bytes, extension))
}

/// Decode the payload and persist it under `root` as
/// `<10-char-uuid-prefix>.<ext>`. Returns the stored file name.
pub fn store_image(root: &Path, payload: &str) -> Result<String, ImageError> {
    let (bytes, extension) = decode_data_uri(payload)?;

    let short_name = &Uuid::new_v4().to_string()[..10];
    let file_name = format!("{}.{}", short_name, extension);

    fs::create_dir_all(root)?;
    fs::write(root.join(&file_name), bytes)?;

    Ok(file_name)
}

/// Best-effort removal of a stored image, used when a recipe is deleted or
/// its image replaced. The database row is the source of truth; a file that
/// fails to delete is logged and left behind.
pub fn remove_image(root: &Path, file_name: &str) {
    if let Err(e) = fs::remove_file(root.join(file_name)) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!("Failed to remove stored image {}: {}", file_name, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::Engine;

    const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n rest of file";
    const JPEG_MAGIC: &[u8] = b"\xff\xd8\xff\xe0 rest of file";

    fn data_uri(prefix: &str, bytes: &[u8]) -> String {
        format!(
            "{};base64,{}",
            prefix,
            base64::engine::general_purpose::STANDARD.encode(bytes)
        )
    }

    #[test]
    fn decodes_png_payload() {
        let (bytes, ext) = decode_data_uri(&data_uri("data:image/png", PNG_MAGIC)).unwrap();
        assert_eq!(bytes, PNG_MAGIC);
        assert_eq!(ext, "png");
    }

    #[test]
    fn jpeg_maps_to_jpg_extension() {
        let (_, ext) = decode_data_uri(&data_uri("data:image/jpeg", JPEG_MAGIC)).unwrap();
        assert_eq!(ext, "jpg");
    }

    #[test]
    fn rejects_payload_without_data_uri_prefix() {
        let encoded = base64::engine::general_purpose::STANDARD.encode(PNG_MAGIC);
        assert!(matches!(
            decode_data_uri(&encoded),
            Err(ImageError::NotDataUri)
        ));
    }

    #[test]
    fn rejects_invalid_base64() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,not!!valid@@base64"),
            Err(ImageError::Base64(_))
        ));
    }

    #[test]
    fn rejects_unrecognized_format() {
        assert!(matches!(
            decode_data_uri(&data_uri("data:image/png", b"plain text, no magic")),
            Err(ImageError::UnknownFormat)
        ));
    }

    #[test]
    fn removes_stored_file() {
        let dir = tempfile::tempdir().unwrap();

        let file_name = store_image(dir.path(), &data_uri("data:image/png", PNG_MAGIC)).unwrap();
        assert!(dir.path().join(&file_name).exists());

        remove_image(dir.path(), &file_name);
        assert!(!dir.path().join(&file_name).exists());
    }

    #[test]
    fn removing_a_missing_file_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();

        remove_image(dir.path(), "0123456789.png");
    }

    #[test]
    fn stores_file_with_short_name_and_extension() {
        let dir = tempfile::tempdir().unwrap();

        let file_name = store_image(dir.path(), &data_uri("data:image/png", PNG_MAGIC)).unwrap();

        let (stem, ext) = file_name.split_once('.').unwrap();
        assert_eq!(stem.len(), 10);
        assert_eq!(ext, "png");
        assert_eq!(fs::read(dir.path().join(&file_name)).unwrap(), PNG_MAGIC);
    }
}

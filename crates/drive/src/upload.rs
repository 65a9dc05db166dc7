use crate::error::DriveError;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DRIVE_UPLOAD_URL: &str = "https://www.googleapis.com/upload/drive/v3/files";
pub const JPEG_MIME: &str = "image/jpeg";

const BOUNDARY_LEN: usize = 32;

/// Sends a local file to remote storage.
pub trait Uploader {
    /// Upload `path` under its own file name, optionally into `folder_id`.
    fn upload(&mut self, path: &Path, folder_id: Option<&str>) -> Result<RemoteFile, DriveError>;
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileMetadata {
    pub name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<String>,
    pub mime_type: String,
}

impl FileMetadata {
    pub fn jpeg(name: &str, folder_id: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            parents: folder_id.map(str::to_string).into_iter().collect(),
            mime_type: JPEG_MIME.to_string(),
        }
    }
}

/// File resource returned by the Drive API.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RemoteFile {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

pub fn new_boundary() -> String {
    let suffix: String = (0..BOUNDARY_LEN).map(|_| fastrand::alphanumeric()).collect();
    format!("drivecam_{}", suffix)
}

/// Build a `multipart/related` body: JSON metadata first, media second.
pub fn multipart_related(
    metadata: &FileMetadata,
    media: &[u8],
    media_type: &str,
    boundary: &str,
) -> Result<Vec<u8>, DriveError> {
    let json = serde_json::to_vec(metadata)?;

    let mut body = Vec::with_capacity(media.len() + json.len() + 4 * boundary.len() + 128);
    body.extend_from_slice(format!("--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(&json);
    body.extend_from_slice(format!("\r\n--{}\r\n", boundary).as_bytes());
    body.extend_from_slice(format!("Content-Type: {}\r\n\r\n", media_type).as_bytes());
    body.extend_from_slice(media);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Ok(body)
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Map a non-success response to [`DriveError::Api`], preferring the
/// message from Google's JSON error envelope.
pub fn api_error(status: u16, body: &str) -> DriveError {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string());

    DriveError::Api { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn metadata_without_folder_omits_parents() {
        let meta = FileMetadata::jpeg("image_20240101_120000.jpg", None);
        let json = serde_json::to_string(&meta).unwrap();
        assert_eq!(
            json,
            r#"{"name":"image_20240101_120000.jpg","mimeType":"image/jpeg"}"#
        );
    }

    #[test]
    fn metadata_with_folder_sets_single_parent() {
        let meta = FileMetadata::jpeg("a.jpg", Some("folder-1"));
        assert_eq!(meta.parents, vec!["folder-1".to_string()]);
    }

    #[test]
    fn multipart_layout() {
        let meta = FileMetadata::jpeg("a.jpg", Some("f"));
        let body = multipart_related(&meta, b"\xFF\xD8jpeg\xFF\xD9", JPEG_MIME, "XYZ").unwrap();

        let mut expected = Vec::new();
        expected.extend_from_slice(
            b"--XYZ\r\nContent-Type: application/json; charset=UTF-8\r\n\r\n",
        );
        expected.extend_from_slice(br#"{"name":"a.jpg","parents":["f"],"mimeType":"image/jpeg"}"#);
        expected.extend_from_slice(b"\r\n--XYZ\r\nContent-Type: image/jpeg\r\n\r\n");
        expected.extend_from_slice(b"\xFF\xD8jpeg\xFF\xD9");
        expected.extend_from_slice(b"\r\n--XYZ--\r\n");

        assert_eq!(body, expected);
    }

    #[test]
    fn boundaries_are_random() {
        let a = new_boundary();
        let b = new_boundary();
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'));
    }

    #[test]
    fn api_error_prefers_google_message() {
        let body = r#"{"error":{"code":404,"message":"File not found: abc.","errors":[]}}"#;
        match api_error(404, body) {
            DriveError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "File not found: abc.");
            }
            other => panic!("Expected Api variant, got {:?}", other),
        }
    }

    #[test]
    fn api_error_falls_back_to_raw_body() {
        match api_error(502, " Bad Gateway \n") {
            DriveError::Api { message, .. } => assert_eq!(message, "Bad Gateway"),
            other => panic!("Expected Api variant, got {:?}", other),
        }
    }
}

use crate::{
    auth::{DRIVE_FILE_SCOPE, TokenSource},
    credentials::ServiceAccountKey,
    error::DriveError,
    upload::{
        DRIVE_UPLOAD_URL, FileMetadata, JPEG_MIME, RemoteFile, Uploader, api_error,
        multipart_related, new_boundary,
    },
};
use reqwest::{blocking::Client, header::CONTENT_TYPE};
use std::{fs, path::Path, time::Duration};

#[derive(Debug, Clone)]
pub struct DriveSettings {
    pub scope: String,
    /// Whole-request timeout for token exchange and uploads.
    pub timeout: Duration,
    pub upload_url: String,
}

impl Default for DriveSettings {
    fn default() -> Self {
        Self {
            scope: DRIVE_FILE_SCOPE.to_string(),
            timeout: Duration::from_secs(60),
            upload_url: DRIVE_UPLOAD_URL.to_string(),
        }
    }
}

/// Authenticated Google Drive session backed by a service account.
pub struct DriveClient {
    http: Client,
    tokens: TokenSource,
    upload_url: String,
}

impl DriveClient {
    /// Load the service-account key and obtain a first access token.
    ///
    /// A missing key file fails with [`DriveError::MissingCredentials`]
    /// before any network traffic.
    pub fn authenticate(
        credentials_path: &Path,
        settings: DriveSettings,
    ) -> Result<Self, DriveError> {
        let key = ServiceAccountKey::from_file(credentials_path)?;

        let http = Client::builder()
            .timeout(settings.timeout)
            .user_agent(concat!("drivecam/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut tokens = TokenSource::new(key, settings.scope, http.clone());
        tokens.token()?;

        tracing::info!(
            service_account = %tokens.client_email(),
            scope = %tokens.scope(),
            "Authenticated with Google Drive"
        );

        Ok(Self {
            http,
            tokens,
            upload_url: settings.upload_url,
        })
    }

    pub fn service_account(&self) -> &str {
        self.tokens.client_email()
    }
}

impl Uploader for DriveClient {
    #[tracing::instrument(skip(self), fields(file = %path.display()))]
    fn upload(&mut self, path: &Path, folder_id: Option<&str>) -> Result<RemoteFile, DriveError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| DriveError::InvalidPath(path.to_path_buf()))?;

        let media = fs::read(path)?;
        let metadata = FileMetadata::jpeg(name, folder_id);
        let boundary = new_boundary();
        let body = multipart_related(&metadata, &media, JPEG_MIME, &boundary)?;

        let token = self.tokens.token()?.to_string();

        let response = self
            .http
            .post(&self.upload_url)
            .query(&[
                ("uploadType", "multipart"),
                ("fields", "id,name"),
                ("supportsAllDrives", "true"),
            ])
            .bearer_auth(token)
            .header(CONTENT_TYPE, format!("multipart/related; boundary={}", boundary))
            .body(body)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().unwrap_or_default();
            return Err(api_error(status.as_u16(), &text));
        }

        let file: RemoteFile = response.json()?;
        tracing::debug!(remote_id = %file.id, bytes = media.len(), "Upload accepted");
        Ok(file)
    }
}

pub mod auth;
pub mod client;
pub mod credentials;
pub mod error;
pub mod upload;

pub use auth::DRIVE_FILE_SCOPE;
pub use client::{DriveClient, DriveSettings};
pub use credentials::ServiceAccountKey;
pub use error::DriveError;
pub use upload::{FileMetadata, RemoteFile, Uploader};

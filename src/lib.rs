//! pcloud_drive - A client for the pCloud storage API.
//!
//! This library provides functionality to:
//! - Authorize an app through the pCloud OAuth2 code flow
//! - List folders and upload files
//! - Create, rename, move and delete folders
//!
//! Every response is checked for pCloud's `result` field; a non-zero value is
//! returned as [`PCloudError::Api`] with the provider's code and message.
//!
//! # Example
//!
//! ```no_run
//! use pcloud_drive::{ApiEndpoint, FolderResponse, ListFolderOptions, PCloudClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = PCloudClient::new("access-token", ApiEndpoint::Eu);
//!
//!     let listing = client.list_folders(0, &ListFolderOptions::default()).await?;
//!     let folder: FolderResponse = listing.parse()?;
//!     for item in folder.metadata.contents {
//!         println!("{}", item);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod endpoint;
pub mod error;
pub mod models;

// Re-exports for convenience
pub use auth::{build_authorization_url, exchange_code, exchange_code_for_token};
pub use client::{ListFolderOptions, PCloudClient, RenameFolderOptions, UploadOptions};
pub use endpoint::ApiEndpoint;
pub use error::{PCloudError, Result};
pub use models::{
    ApiError, ApiResponse, ApiResult, DeleteFolderResponse, FolderResponse, Metadata,
    TokenResponse, UploadResponse,
};

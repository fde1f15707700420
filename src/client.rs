//! pCloud API client for file and folder operations.

use std::io;
use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Response};
use tracing::{debug, warn};

use crate::endpoint::ApiEndpoint;
use crate::error::{PCloudError, Result};
use crate::models::{ApiResponse, ApiResult};

/// Options for [`PCloudClient::list_folders`].
#[derive(Debug, Clone, Default)]
pub struct ListFolderOptions {
    /// List the whole subtree, not only direct children.
    pub recursive: bool,
    pub show_deleted: bool,
    pub no_files: bool,
    pub no_shares: bool,
}

impl ListFolderOptions {
    fn query_pairs(&self, folder_id: i64) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("folderid", folder_id.to_string())];
        push_flag(&mut pairs, "recursive", self.recursive);
        push_flag(&mut pairs, "showdeleted", self.show_deleted);
        push_flag(&mut pairs, "nofiles", self.no_files);
        push_flag(&mut pairs, "noshares", self.no_shares);
        pairs
    }
}

/// Options for [`PCloudClient::upload_file`].
#[derive(Debug, Clone, Default)]
pub struct UploadOptions {
    /// Do not keep partially uploaded files.
    pub no_partial: bool,
    /// Hash the caller can poll for upload progress.
    pub progress_hash: Option<String>,
    /// Rename the upload instead of overwriting an existing file.
    pub rename_if_exists: bool,
    /// Modification time, unix seconds.
    pub mtime: Option<i64>,
    /// Creation time, unix seconds. Only honored together with `mtime`.
    pub ctime: Option<i64>,
}

impl UploadOptions {
    fn query_pairs(&self, folder_id: i64) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("folderid", folder_id.to_string())];
        push_flag(&mut pairs, "nopartial", self.no_partial);
        push_flag(&mut pairs, "renameifexists", self.rename_if_exists);
        if let Some(mtime) = self.mtime {
            pairs.push(("mtime", mtime.to_string()));
        }
        if let Some(ctime) = self.ctime {
            pairs.push(("ctime", ctime.to_string()));
        }
        push_text(&mut pairs, "progresshash", self.progress_hash.as_deref());
        pairs
    }
}

/// Options for [`PCloudClient::rename_folder`].
///
/// A `to_path` ending with `/` moves the folder into that existing folder
/// and keeps its name.
#[derive(Debug, Clone, Default)]
pub struct RenameFolderOptions {
    pub to_folder_id: Option<i64>,
    pub to_name: Option<String>,
    pub to_path: Option<String>,
}

impl RenameFolderOptions {
    fn query_pairs(&self, folder_id: i64) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("folderid", folder_id.to_string())];
        if let Some(id) = self.to_folder_id {
            pairs.push(("tofolderid", id.to_string()));
        }
        push_text(&mut pairs, "toname", self.to_name.as_deref());
        push_text(&mut pairs, "topath", self.to_path.as_deref());
        pairs
    }
}

fn push_flag(pairs: &mut Vec<(&'static str, String)>, name: &'static str, on: bool) {
    if on {
        pairs.push((name, "1".to_string()));
    }
}

/// Empty strings are treated as unset.
fn push_text(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.is_empty()) {
        pairs.push((name, value.to_string()));
    }
}

/// Turn an HTTP response into the success payload or an API error.
///
/// Non-2xx statuses and undecodable bodies are returned as transport errors.
pub(crate) async fn decode_response(response: Response) -> Result<ApiResult> {
    let response = response.error_for_status()?;
    let body: ApiResponse = response.json().await?;

    if let ApiResponse::Failure(err) = &body {
        warn!(code = err.result, message = %err.error, "pCloud API returned an error");
    }

    body.into_result()
}

/// Client for the pCloud API.
///
/// The base URL and access token are fixed for the lifetime of the client.
#[derive(Clone)]
pub struct PCloudClient {
    base_url: String,
    access_token: String,
    http: Client,
}

impl PCloudClient {
    /// Create a new PCloudClient.
    ///
    /// # Arguments
    /// * `access_token` - OAuth access token sent as a bearer token
    /// * `endpoint` - The data region of the account
    pub fn new(access_token: impl Into<String>, endpoint: ApiEndpoint) -> Self {
        Self::with_base_url(access_token, endpoint.base_url())
    }

    /// Create a client against a custom base URL, such as a mock server.
    pub fn with_base_url(access_token: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            access_token: access_token.into(),
            http: Client::new(),
        }
    }

    /// Get the API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&'static str, String)],
        form: Option<Form>,
    ) -> Result<ApiResult> {
        debug!(%method, path, "Sending pCloud API request");

        let mut request = self
            .http
            .request(method, format!("{}{}", self.base_url, path))
            .bearer_auth(&self.access_token)
            .query(query);

        if let Some(form) = form {
            request = request.multipart(form);
        }

        let response = request.send().await?;
        decode_response(response).await
    }

    /// List the contents of a folder.
    ///
    /// # Arguments
    /// * `folder_id` - The ID of the folder, `0` is the root
    /// * `options` - Optional listing flags
    pub async fn list_folders(
        &self,
        folder_id: i64,
        options: &ListFolderOptions,
    ) -> Result<ApiResult> {
        self.request(
            Method::GET,
            "/listfolder",
            &options.query_pairs(folder_id),
            None,
        )
        .await
    }

    /// Upload a file to a folder.
    ///
    /// # Arguments
    /// * `folder_id` - ID of the destination folder
    /// * `file_name` - Name the file gets in pCloud
    /// * `content` - Raw file content
    /// * `options` - Optional upload flags
    pub async fn upload_file(
        &self,
        folder_id: i64,
        file_name: &str,
        content: Vec<u8>,
        options: &UploadOptions,
    ) -> Result<ApiResult> {
        let mime_type = mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .to_string();

        let file_part = Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str(&mime_type)?;

        let form = Form::new().part("file", file_part);

        self.request(
            Method::POST,
            "/uploadfile",
            &options.query_pairs(folder_id),
            Some(form),
        )
        .await
    }

    /// Upload a local file to a folder, keeping its file name.
    pub async fn upload_local_file<P: AsRef<Path>>(
        &self,
        folder_id: i64,
        local_path: P,
        options: &UploadOptions,
    ) -> Result<ApiResult> {
        let local_path = local_path.as_ref();
        let file_name = local_path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                PCloudError::Io(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("Not a file path: {}", local_path.display()),
                ))
            })?;

        let content = tokio::fs::read(local_path).await?;
        self.upload_file(folder_id, file_name, content, options)
            .await
    }

    /// Create a folder inside `folder_id`.
    pub async fn create_folder(&self, folder_id: i64, name: &str) -> Result<ApiResult> {
        let query = [
            ("folderid", folder_id.to_string()),
            ("name", name.to_string()),
        ];
        self.request(Method::GET, "/createfolder", &query, None)
            .await
    }

    /// Delete a folder and everything inside it. This cannot be undone.
    pub async fn delete_folder_recursive(&self, folder_id: i64) -> Result<ApiResult> {
        let query = [("folderid", folder_id.to_string())];
        self.request(Method::GET, "/deletefolderrecursive", &query, None)
            .await
    }

    /// Rename and/or move a folder.
    pub async fn rename_folder(
        &self,
        folder_id: i64,
        options: &RenameFolderOptions,
    ) -> Result<ApiResult> {
        self.request(
            Method::GET,
            "/renamefolder",
            &options.query_pairs(folder_id),
            None,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&'static str, String)]) -> Vec<&'static str> {
        pairs.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_list_options_only_set_flags() {
        let options = ListFolderOptions {
            recursive: true,
            ..Default::default()
        };

        let pairs = options.query_pairs(5);
        assert_eq!(
            pairs,
            vec![("folderid", "5".to_string()), ("recursive", "1".to_string())]
        );
    }

    #[test]
    fn test_list_options_all_flags() {
        let options = ListFolderOptions {
            recursive: true,
            show_deleted: true,
            no_files: true,
            no_shares: true,
        };

        assert_eq!(
            keys(&options.query_pairs(0)),
            vec!["folderid", "recursive", "showdeleted", "nofiles", "noshares"]
        );
    }

    #[test]
    fn test_upload_options() {
        let options = UploadOptions {
            no_partial: true,
            progress_hash: Some("abc".to_string()),
            rename_if_exists: true,
            mtime: Some(1700000000),
            ctime: Some(1690000000),
        };

        let pairs = options.query_pairs(12);
        assert_eq!(
            keys(&pairs),
            vec!["folderid", "nopartial", "renameifexists", "mtime", "ctime", "progresshash"]
        );
        assert_eq!(pairs[3].1, "1700000000");
        assert_eq!(keys(&UploadOptions::default().query_pairs(12)), vec!["folderid"]);
    }

    #[test]
    fn test_rename_options() {
        let options = RenameFolderOptions {
            to_folder_id: None,
            to_name: Some("Archive".to_string()),
            to_path: Some("/backup/".to_string()),
        };

        let pairs = options.query_pairs(3);
        assert_eq!(keys(&pairs), vec!["folderid", "toname", "topath"]);
        assert_eq!(pairs[2].1, "/backup/");
    }

    #[test]
    fn test_empty_strings_are_omitted() {
        let rename = RenameFolderOptions {
            to_folder_id: None,
            to_name: Some(String::new()),
            to_path: Some(String::new()),
        };
        assert_eq!(rename.query_pairs(3), vec![("folderid", "3".to_string())]);

        let upload = UploadOptions {
            progress_hash: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(upload.query_pairs(3), vec![("folderid", "3".to_string())]);
    }

    #[test]
    fn test_client_is_clone_send_sync() {
        fn assert_send_sync<T: Clone + Send + Sync>() {}
        assert_send_sync::<PCloudClient>();
    }

    #[test]
    fn test_base_url_from_endpoint() {
        let client = PCloudClient::new("token", ApiEndpoint::Eu);
        assert_eq!(client.base_url(), "https://eapi.pcloud.com");

        let client = PCloudClient::with_base_url("token", "http://127.0.0.1:1234/");
        assert_eq!(client.base_url(), "http://127.0.0.1:1234");
    }
}

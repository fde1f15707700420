//! Data models for pCloud API responses.

use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::endpoint::ApiEndpoint;
use crate::error::PCloudError;

/// A decoded pCloud response body.
///
/// Every pCloud response is a JSON object with an integer `result` field.
/// `0` means success; anything else is a failure that carries an `error`
/// message.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success(ApiResult),
    Failure(ApiError),
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Failure(_))
    }

    /// Convert into the success payload, or the matching [`PCloudError::Api`].
    pub fn into_result(self) -> crate::error::Result<ApiResult> {
        match self {
            Self::Success(result) => Ok(result),
            Self::Failure(error) => Err(error.into()),
        }
    }
}

impl<'de> Deserialize<'de> for ApiResponse {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = Map::<String, Value>::deserialize(deserializer)?;

        let result = fields
            .get("result")
            .ok_or_else(|| de::Error::missing_field("result"))?
            .as_i64()
            .ok_or_else(|| de::Error::custom("`result` is not an integer"))?;

        if result == 0 {
            return Ok(Self::Success(ApiResult(fields)));
        }

        let error = match fields.get("error") {
            Some(Value::String(message)) => message.clone(),
            Some(_) => return Err(de::Error::custom("`error` is not a string")),
            None => return Err(de::Error::missing_field("error")),
        };

        Ok(Self::Failure(ApiError { result, error }))
    }
}

/// A successful response, kept as the raw JSON object the API returned.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiResult(Map<String, Value>);

impl ApiResult {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Decode the payload into a typed view such as [`FolderResponse`].
    pub fn parse<T: DeserializeOwned>(&self) -> crate::error::Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0.clone()))?)
    }

    /// Like [`ApiResult::parse`], consuming the payload instead of copying it.
    pub fn into_parsed<T: DeserializeOwned>(self) -> crate::error::Result<T> {
        Ok(serde_json::from_value(Value::Object(self.0))?)
    }
}

impl From<Map<String, Value>> for ApiResult {
    fn from(fields: Map<String, Value>) -> Self {
        Self(fields)
    }
}

/// A failed response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub result: i64,
    pub error: String,
}

impl From<ApiError> for PCloudError {
    fn from(err: ApiError) -> Self {
        PCloudError::Api {
            code: err.result,
            message: err.error,
        }
    }
}

/// Metadata for a file or folder in pCloud.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    #[serde(default, rename = "isfolder")]
    pub is_folder: bool,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "folderid")]
    pub folder_id: Option<u64>,
    #[serde(default, rename = "fileid")]
    pub file_id: Option<u64>,
    #[serde(default, rename = "parentfolderid")]
    pub parent_folder_id: Option<u64>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default, rename = "contenttype")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub modified: Option<String>,
    #[serde(default)]
    pub contents: Vec<Metadata>,
}

impl Metadata {
    /// The pCloud object id, e.g. `d42` for a folder or `f7` for a file.
    pub fn object_id(&self) -> String {
        if let Some(id) = &self.id {
            return id.clone();
        }
        match (self.folder_id, self.file_id) {
            (Some(id), _) if self.is_folder => format!("d{}", id),
            (_, Some(id)) => format!("f{}", id),
            _ => "-".to_string(),
        }
    }
}

impl std::fmt::Display for Metadata {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let size_str = if self.is_folder {
            "-".to_string()
        } else {
            self.size
                .map(format_size)
                .unwrap_or_else(|| "-".to_string())
        };
        let kind = if self.is_folder {
            "folder"
        } else {
            self.content_type.as_deref().unwrap_or("-")
        };
        write!(f, "{}\t{}\t{}\t{}", self.object_id(), size_str, kind, self.name)
    }
}

/// Format bytes into human-readable size.
pub fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Response of `listfolder`, `createfolder` and `renamefolder`.
#[derive(Debug, Clone, Deserialize)]
pub struct FolderResponse {
    pub metadata: Metadata,
}

/// Response of `uploadfile`.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    #[serde(default, rename = "fileids")]
    pub file_ids: Vec<u64>,
    #[serde(default)]
    pub metadata: Vec<Metadata>,
}

/// Response of `deletefolderrecursive`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct DeleteFolderResponse {
    #[serde(default, rename = "deletedfiles")]
    pub deleted_files: u64,
    #[serde(default, rename = "deletedfolders")]
    pub deleted_folders: u64,
}

/// OAuth2 token response from `oauth2_token`.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    #[serde(default)]
    pub uid: Option<u64>,
    #[serde(default, rename = "locationid")]
    pub location_id: Option<u8>,
}

impl TokenResponse {
    /// The region the account lives in, when the API reported one.
    pub fn endpoint(&self) -> Option<ApiEndpoint> {
        self.location_id.and_then(ApiEndpoint::from_location_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_success_is_not_error() {
        let response: ApiResponse =
            serde_json::from_value(json!({"result": 0, "metadata": {"name": "/"}})).unwrap();

        assert!(!response.is_error());
        let result = response.into_result().unwrap();
        assert_eq!(
            result.into_value(),
            json!({"result": 0, "metadata": {"name": "/"}})
        );
    }

    #[test]
    fn test_failure_maps_code_and_message() {
        let response: ApiResponse =
            serde_json::from_value(json!({"result": 2005, "error": "Directory does not exist."}))
                .unwrap();

        assert!(response.is_error());
        match response.into_result() {
            Err(PCloudError::Api { code, message }) => {
                assert_eq!(code, 2005);
                assert_eq!(message, "Directory does not exist.");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_result_is_decode_error() {
        let decoded = serde_json::from_value::<ApiResponse>(json!({"metadata": {}}));
        assert!(decoded.is_err());
    }

    #[test]
    fn test_failure_without_error_message_is_decode_error() {
        let decoded = serde_json::from_value::<ApiResponse>(json!({"result": 1000}));
        assert!(decoded.is_err());
    }

    #[test]
    fn test_into_parsed_matches_parse() {
        let response: ApiResponse = serde_json::from_value(json!({
            "result": 0,
            "deletedfiles": 4,
            "deletedfolders": 1
        }))
        .unwrap();
        let result = response.into_result().unwrap();

        let borrowed: DeleteFolderResponse = result.parse().unwrap();
        let owned: DeleteFolderResponse = result.into_parsed().unwrap();
        assert_eq!(borrowed.deleted_files, owned.deleted_files);
        assert_eq!(owned.deleted_files, 4);
        assert_eq!(owned.deleted_folders, 1);
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(500), "500 B");
        assert_eq!(format_size(1024), "1.00 KB");
        assert_eq!(format_size(1536), "1.50 KB");
        assert_eq!(format_size(1048576), "1.00 MB");
        assert_eq!(format_size(1073741824), "1.00 GB");
    }

    #[test]
    fn test_folder_metadata_deserialize() {
        let json = r#"{
            "name": "Photos",
            "isfolder": true,
            "folderid": 42,
            "parentfolderid": 0,
            "id": "d42",
            "contents": [
                {"name": "cat.jpg", "isfolder": false, "fileid": 7, "size": 2048, "contenttype": "image/jpeg"}
            ]
        }"#;

        let metadata: Metadata = serde_json::from_str(json).unwrap();
        assert!(metadata.is_folder);
        assert_eq!(metadata.folder_id, Some(42));
        assert_eq!(metadata.contents.len(), 1);
        assert_eq!(metadata.contents[0].object_id(), "f7");
        assert_eq!(metadata.contents[0].size, Some(2048));
    }

    #[test]
    fn test_metadata_display() {
        let metadata = Metadata {
            name: "test.txt".to_string(),
            is_folder: false,
            id: None,
            folder_id: None,
            file_id: Some(99),
            parent_folder_id: Some(0),
            path: None,
            size: Some(1024),
            content_type: Some("text/plain".to_string()),
            created: None,
            modified: None,
            contents: Vec::new(),
        };

        let display = format!("{}", metadata);
        assert!(display.contains("f99"));
        assert!(display.contains("test.txt"));
        assert!(display.contains("1.00 KB"));
        assert!(display.contains("text/plain"));
    }

    #[test]
    fn test_token_response_endpoint() {
        let token: TokenResponse = serde_json::from_value(json!({
            "access_token": "tok123",
            "token_type": "bearer",
            "uid": 12,
            "locationid": 2
        }))
        .unwrap();

        assert_eq!(token.access_token, "tok123");
        assert_eq!(token.endpoint(), Some(ApiEndpoint::Eu));
    }
}

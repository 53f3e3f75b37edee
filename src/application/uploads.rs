//! Media upload client and the in-memory file handed to it.

use std::path::Path;

use async_trait::async_trait;
use bytes::Bytes;
use contentdesk_api_types::UploadedFile;
use metrics::counter;
use tracing::{info, warn};

use crate::{
    application::repos::MediaUploader,
    domain::types::UploadContentType,
    infra::{
        error::InfraError,
        http::{ApiError, ApiRequest, FilePart, MultipartBody, RestClient},
        telemetry::METRIC_UPLOAD,
    },
};

const UPLOAD_PATH: &str = "uploadfile/media";
const UPLOAD_FAILED: &str = "파일 업로드 실패";
const INVALID_CONTENT_ID: &str = "contentId가 유효하지 않습니다.";
const INVALID_CONTENT_TYPE: &str = "contentType이 유효하지 않습니다.";

/// A file selected for upload, held in memory.
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub file_name: String,
    pub mime: String,
    pub bytes: Bytes,
    /// Local reference shown until the server URL is known (path or name).
    pub preview: String,
}

impl MediaFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let file_name = file_name.into();
        let mime = mime_guess::from_path(&file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Self {
            preview: format!("memory:{file_name}"),
            file_name,
            mime,
            bytes: bytes.into(),
        }
    }

    pub async fn from_path(path: &Path) -> Result<Self, InfraError> {
        let bytes = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                InfraError::configuration(format!("`{}` has no file name", path.display()))
            })?;
        let mut file = Self::from_bytes(file_name, bytes);
        file.preview = path.display().to_string();
        Ok(file)
    }

}

/// Where an upload gets attached. Both parts are checked before anything is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTarget {
    pub content_id: Option<i64>,
    pub content_type: String,
}

impl UploadTarget {
    pub fn new(content_id: i64, content_type: UploadContentType) -> Self {
        Self {
            content_id: Some(content_id),
            content_type: content_type.as_str().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(i64, &str), ApiError> {
        let id = self
            .content_id
            .ok_or_else(|| ApiError::precondition(INVALID_CONTENT_ID))?;
        let content_type = self.content_type.trim();
        if content_type.is_empty() {
            return Err(ApiError::precondition(INVALID_CONTENT_TYPE));
        }
        Ok((id, content_type))
    }
}

#[derive(Clone)]
pub struct UploadsClient {
    rest: RestClient,
}

impl UploadsClient {
    pub fn new(rest: RestClient) -> Self {
        Self { rest }
    }
}

#[async_trait]
impl MediaUploader for UploadsClient {
    async fn upload(
        &self,
        file: &MediaFile,
        target: &UploadTarget,
    ) -> Result<UploadedFile, ApiError> {
        let (content_id, content_type) = target.validate()?;

        let body = MultipartBody {
            fields: vec![
                ("contentType".to_string(), content_type.to_string()),
                ("contentId".to_string(), content_id.to_string()),
            ],
            file: FilePart {
                field: "file".to_string(),
                file_name: file.file_name.clone(),
                mime: file.mime.clone(),
                bytes: file.bytes.clone(),
            },
        };
        let request = ApiRequest::post(UPLOAD_PATH).multipart(body);
        let result = self.rest.data::<UploadedFile>(request, UPLOAD_FAILED).await;

        let content_type = content_type.to_string();
        match &result {
            Ok(uploaded) => {
                counter!(METRIC_UPLOAD, "content_type" => content_type.clone(), "result" => "success")
                    .increment(1);
                info!(
                    content_id,
                    content_type = %content_type,
                    file_id = uploaded.id,
                    bytes = file.bytes.len(),
                    "media uploaded"
                );
            }
            Err(err) => {
                counter!(METRIC_UPLOAD, "content_type" => content_type.clone(), "result" => "failure")
                    .increment(1);
                warn!(content_id, content_type = %content_type, error = %err, "media upload failed");
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_content_id_is_rejected_locally() {
        let target = UploadTarget {
            content_id: None,
            content_type: "HERO".into(),
        };
        let err = target.validate().expect_err("no id");
        assert!(matches!(err, ApiError::Precondition(_)));
        assert_eq!(err.to_string(), INVALID_CONTENT_ID);
    }

    #[test]
    fn blank_content_type_is_rejected_locally() {
        let target = UploadTarget {
            content_id: Some(3),
            content_type: "  ".into(),
        };
        assert_eq!(
            target.validate().expect_err("blank type").to_string(),
            INVALID_CONTENT_TYPE
        );
    }

    #[test]
    fn mime_is_guessed_from_name() {
        let file = MediaFile::from_bytes("cover.PNG", vec![1_u8, 2, 3]);
        assert_eq!(file.mime, "image/png");
        assert_eq!(file.preview, "memory:cover.PNG");
        let clip = MediaFile::from_bytes("intro.mp4", Vec::<u8>::new());
        assert_eq!(clip.mime, "video/mp4");
    }

    #[tokio::test]
    async fn from_path_reads_file_and_keeps_path_as_preview() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("banner.jpg");
        tokio::fs::write(&path, b"jpeg").await.expect("write");

        let file = MediaFile::from_path(&path).await.expect("read");
        assert_eq!(file.file_name, "banner.jpg");
        assert_eq!(file.mime, "image/jpeg");
        assert_eq!(file.bytes.as_ref(), b"jpeg");
        assert_eq!(file.preview, path.display().to_string());
    }
}

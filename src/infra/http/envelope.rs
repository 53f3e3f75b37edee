use contentdesk_api_types::{ApiEnvelope, ListPage};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::{
    gateway::{GatewayError, SessionGateway},
    request::{ApiRequest, RawResponse},
};

const DEFAULT_PAGE_SIZE: u64 = 10;

/// Failure of a single API operation.
///
/// `Display` is the text shown to the user: the server's message when it sent
/// one, otherwise the operation's fallback.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{fallback}")]
    Transport {
        fallback: String,
        #[source]
        source: GatewayError,
    },
    #[error("{message}")]
    Status { status: u16, message: String },
    #[error("{message}")]
    Rejected { code: String, message: String },
    #[error("{message}")]
    MissingData { key: &'static str, message: String },
    #[error("{message}")]
    Decode { message: String, detail: String },
    /// Refused locally; nothing was sent.
    #[error("{0}")]
    Precondition(String),
}

impl ApiError {
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }

    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Transport { source, .. } => source.is_auth_failure(),
            ApiError::Status { status, .. } => *status == 401,
            _ => false,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Envelope-aware client shared by every resource module.
#[derive(Clone)]
pub struct RestClient {
    gateway: SessionGateway,
}

impl RestClient {
    pub fn new(gateway: SessionGateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &SessionGateway {
        &self.gateway
    }

    /// Send and validate the envelope; `code` must be `SUCCESS`.
    pub async fn call(&self, request: ApiRequest, fallback: &str) -> Result<ApiEnvelope, ApiError> {
        let envelope = self.exchange(request, fallback).await?;
        if !envelope.is_success() {
            return Err(ApiError::Rejected {
                message: message_or(&envelope, fallback),
                code: envelope.code,
            });
        }
        Ok(envelope)
    }

    /// Send and return the envelope whatever its `code`, for callers that treat
    /// a non-success code as an answer rather than an error.
    pub async fn exchange(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<ApiEnvelope, ApiError> {
        let response = self
            .gateway
            .send(request)
            .await
            .map_err(|source| ApiError::Transport {
                fallback: fallback.to_string(),
                source,
            })?;
        decode_envelope(&response, fallback)
    }

    pub async fn unit(&self, request: ApiRequest, fallback: &str) -> Result<(), ApiError> {
        self.call(request, fallback).await.map(|_| ())
    }

    /// Entity stored under `data[key]`; absent or null is an error.
    pub async fn field<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        key: &'static str,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let envelope = self.call(request, fallback).await?;
        let message = message_or(&envelope, fallback);
        match take_field(envelope.data, key) {
            Some(value) => decode_value(value, fallback),
            None => Err(ApiError::MissingData { key, message }),
        }
    }

    /// The whole `data` payload.
    pub async fn data<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let envelope = self.call(request, fallback).await?;
        let message = message_or(&envelope, fallback);
        match envelope.data {
            Some(value) if !value.is_null() => decode_value(value, fallback),
            _ => Err(ApiError::MissingData {
                key: "data",
                message,
            }),
        }
    }

    /// Paged listing: items under `data[list_key]`, counters next to it.
    pub async fn list<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        list_key: &'static str,
        fallback: &str,
    ) -> Result<ListPage<T>, ApiError> {
        let envelope = self.call(request, fallback).await?;
        let data = envelope.data.unwrap_or(Value::Null);

        // An absent list is an empty page.
        let items: Vec<T> = match data.get(list_key) {
            Some(value) if !value.is_null() => decode_value(value.clone(), fallback)?,
            _ => Vec::new(),
        };

        let counter = |name: &str| data.get(name).and_then(Value::as_u64);
        Ok(ListPage {
            total_count: counter("totalCount").unwrap_or(items.len() as u64),
            total_pages: counter("totalPages").unwrap_or(1),
            page_size: counter("pageSize").unwrap_or(DEFAULT_PAGE_SIZE),
            items,
        })
    }
}

fn decode_envelope(response: &RawResponse, fallback: &str) -> Result<ApiEnvelope, ApiError> {
    let parsed = serde_json::from_slice::<ApiEnvelope>(&response.body);

    if !response.is_success() {
        let message = parsed
            .ok()
            .and_then(|envelope| envelope.message().map(str::to_string))
            .unwrap_or_else(|| fallback.to_string());
        return Err(ApiError::Status {
            status: response.status,
            message,
        });
    }

    parsed.map_err(|err| ApiError::Decode {
        message: fallback.to_string(),
        detail: err.to_string(),
    })
}

fn take_field(data: Option<Value>, key: &str) -> Option<Value> {
    match data {
        Some(Value::Object(mut map)) => map.remove(key).filter(|value| !value.is_null()),
        _ => None,
    }
}

fn decode_value<T: DeserializeOwned>(value: Value, fallback: &str) -> Result<T, ApiError> {
    serde_json::from_value(value).map_err(|err| ApiError::Decode {
        message: fallback.to_string(),
        detail: err.to_string(),
    })
}

fn message_or(envelope: &ApiEnvelope, fallback: &str) -> String {
    envelope
        .message()
        .map_or_else(|| fallback.to_string(), str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse::new(status, body.to_string())
    }

    #[test]
    fn http_error_prefers_server_message() {
        let err = decode_envelope(
            &response(400, r#"{"code":"BAD_REQUEST","message":"제목이 너무 깁니다"}"#),
            "배너 수정 실패",
        )
        .expect_err("400");
        assert_eq!(err.to_string(), "제목이 너무 깁니다");
        assert_eq!(err.status(), Some(400));
    }

    #[test]
    fn http_error_without_body_uses_fallback() {
        let err = decode_envelope(&response(502, "Bad Gateway"), "배너 수정 실패")
            .expect_err("502");
        assert_eq!(err.to_string(), "배너 수정 실패");
    }

    #[test]
    fn success_status_with_garbage_is_a_decode_error() {
        let err = decode_envelope(&response(200, "<html>"), "뉴스 목록 조회 실패")
            .expect_err("not json");
        assert!(matches!(err, ApiError::Decode { .. }));
        assert_eq!(err.to_string(), "뉴스 목록 조회 실패");
    }

    #[test]
    fn null_field_is_treated_as_missing() {
        let data = serde_json::json!({"draft": null, "banner": {"id": 1}});
        assert!(take_field(Some(data.clone()), "draft").is_none());
        assert!(take_field(Some(data), "banner").is_some());
        assert!(take_field(None, "banner").is_none());
    }

    #[test]
    fn transport_error_displays_fallback_and_keeps_source() {
        let err = ApiError::Transport {
            fallback: "임시저장 수정 실패".into(),
            source: GatewayError::SessionExpired,
        };
        assert_eq!(err.to_string(), "임시저장 수정 실패");
        assert!(err.is_auth_failure());
        assert!(std::error::Error::source(&err).is_some());
    }
}

//! Outbound HTTP to the admin API.
//!
//! [`Transport`] performs raw exchanges, [`SessionGateway`] layers the
//! refresh-on-401 protocol over it and [`RestClient`] decodes the response
//! envelope.

mod envelope;
mod gateway;
mod request;
mod transport;

pub use envelope::{ApiError, RestClient};
pub use gateway::{GatewayError, SessionExpiredHook, SessionGateway};
pub use request::{ApiRequest, FilePart, MultipartBody, RawResponse, RequestBody};
pub use transport::{HttpTransport, Transport};

/// Path of the credential refresh endpoint, relative to the API base.
pub const REFRESH_PATH: &str = "auth/refresh";

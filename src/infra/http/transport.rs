use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{
    Client, Url,
    cookie::{CookieStore, Jar},
    multipart::{Form, Part},
};
use tracing::trace;

use super::{
    gateway::GatewayError,
    request::{ApiRequest, RawResponse, RequestBody},
};
use crate::infra::error::InfraError;

/// One raw HTTP exchange. Implementations must not interpret status codes.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, GatewayError>;
}

/// reqwest-backed transport. Authentication rides on server-set cookies kept in `cookies`.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base: Url,
    cookies: Arc<Jar>,
}

impl HttpTransport {
    pub fn new(base: &Url, timeout: Duration) -> Result<Self, InfraError> {
        let base = normalize_base(base);
        let cookies = Arc::new(Jar::default());
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .cookie_provider(Arc::clone(&cookies))
            .timeout(timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;
        Ok(Self {
            client,
            base,
            cookies,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("contentdesk/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn url(&self, path: &str) -> Result<Url, GatewayError> {
        self.base
            .join(path)
            .map_err(|err| GatewayError::network(format!("invalid request path `{path}`: {err}")))
    }

    /// `name=value; ...` for the cookies the server has set on the API origin.
    pub fn cookie_header(&self) -> Option<String> {
        self.cookies
            .cookies(&self.base)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Re-install cookies previously captured with [`Self::cookie_header`].
    pub fn restore_cookies(&self, header: &str) {
        for pair in header.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let cookie = format!("{pair}; Path=/");
            self.cookies.add_cookie_str(&cookie, &self.base);
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &ApiRequest) -> Result<RawResponse, GatewayError> {
        let mut url = self.url(&request.path)?;
        if !request.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &request.query {
                pairs.append_pair(key, value);
            }
        }

        let mut builder = self.client.request(request.method.clone(), url);
        builder = match &request.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.json(value),
            RequestBody::Multipart(body) => {
                let part = Part::bytes(body.file.bytes.to_vec())
                    .file_name(body.file.file_name.clone())
                    .mime_str(&body.file.mime)
                    .map_err(|err| GatewayError::network(err.to_string()))?;
                let form = body
                    .fields
                    .iter()
                    .fold(Form::new(), |form, (key, value)| {
                        form.text(key.clone(), value.clone())
                    })
                    .part(body.file.field.clone(), part);
                builder.multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|err| GatewayError::network(err.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|err| GatewayError::network(err.to_string()))?;

        trace!(request = %request.describe(), status, bytes = body.len(), "api exchange");
        Ok(RawResponse { status, body })
    }
}

fn normalize_base(base: &Url) -> Url {
    let mut base = base.clone();
    base.set_query(None);
    base.set_fragment(None);
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_path_is_kept_when_joining() {
        let base = Url::parse("https://admin.example.com/api").expect("url");
        let transport = HttpTransport::new(&base, Duration::from_secs(5)).expect("transport");
        assert_eq!(
            transport.url("promotions/1").expect("join").as_str(),
            "https://admin.example.com/api/promotions/1"
        );
    }

    #[test]
    fn cookies_survive_capture_and_restore() {
        let base = Url::parse("https://admin.example.com/api/").expect("url");
        let first = HttpTransport::new(&base, Duration::from_secs(5)).expect("transport");
        first.restore_cookies("accessToken=abc; refreshToken=def");
        let header = first.cookie_header().expect("cookies set");
        assert!(header.contains("accessToken=abc"));

        let second = HttpTransport::new(&base, Duration::from_secs(5)).expect("transport");
        second.restore_cookies(&header);
        let restored = second.cookie_header().expect("cookies restored");
        assert!(restored.contains("accessToken=abc"));
        assert!(restored.contains("refreshToken=def"));
    }
}

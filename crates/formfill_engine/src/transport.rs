use std::time::Duration;

use futures_util::StreamExt;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::multipart::{Form, Part};
use reqwest::Url;

use formfill_logging::formfill_debug;

use crate::{FailureKind, HttpReply, ResumeUploadRequest, TransportError};

pub const SEARCH_PATH: &str = "/searchLocations";
pub const PARSE_RESUME_PATH: &str = "/parseResume";

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_response_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            max_response_bytes: 1024 * 1024,
        }
    }
}

/// Request/response collaborator for the two form endpoints.
///
/// Non-success statuses are returned as replies; only failures to get a
/// reply at all are errors.
#[async_trait::async_trait]
pub trait FormTransport: Send + Sync {
    async fn search_locations(
        &self,
        text: &str,
        captcha_response: &str,
    ) -> Result<HttpReply, TransportError>;

    async fn parse_resume(&self, upload: &ResumeUploadRequest) -> Result<HttpReply, TransportError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    settings: TransportSettings,
}

impl ReqwestTransport {
    pub fn new(settings: TransportSettings) -> Self {
        Self { settings }
    }

    fn build_client(&self) -> Result<reqwest::Client, TransportError> {
        reqwest::Client::builder()
            .connect_timeout(self.settings.connect_timeout)
            .timeout(self.settings.request_timeout)
            .build()
            .map_err(|err| TransportError::new(FailureKind::Network, err.to_string()))
    }

    fn endpoint(&self, path_and_query: &str) -> Result<Url, TransportError> {
        let base = self.settings.base_url.trim_end_matches('/');
        Url::parse(&format!("{base}{path_and_query}"))
            .map_err(|err| TransportError::new(FailureKind::InvalidUrl, err.to_string()))
    }

    async fn read_reply(&self, response: reqwest::Response) -> Result<HttpReply, TransportError> {
        let status = response.status().as_u16();
        let max_bytes = self.settings.max_response_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }

        Ok(HttpReply {
            status,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }
}

/// Search URL path and query, with both values encoded like
/// `encodeURIComponent`.
pub fn search_path(text: &str, captcha_response: &str) -> String {
    format!(
        "{SEARCH_PATH}?text={}&hcaptchaResponse={}",
        utf8_percent_encode(text, URI_COMPONENT),
        utf8_percent_encode(captcha_response, URI_COMPONENT)
    )
}

#[async_trait::async_trait]
impl FormTransport for ReqwestTransport {
    async fn search_locations(
        &self,
        text: &str,
        captcha_response: &str,
    ) -> Result<HttpReply, TransportError> {
        let url = self.endpoint(&search_path(text, captcha_response))?;
        let client = self.build_client()?;
        let response = client.get(url).send().await.map_err(map_reqwest_error)?;
        let reply = self.read_reply(response).await?;
        formfill_debug!("searchLocations status={} bytes={}", reply.status, reply.body.len());
        Ok(reply)
    }

    async fn parse_resume(&self, upload: &ResumeUploadRequest) -> Result<HttpReply, TransportError> {
        let url = self.endpoint(PARSE_RESUME_PATH)?;
        let contents = tokio::fs::read(&upload.path).await.map_err(|err| {
            TransportError::new(
                FailureKind::Io,
                format!("reading {}: {err}", upload.path.display()),
            )
        })?;
        let part = Part::bytes(contents).file_name(upload.file_name.clone());
        let form = Form::new()
            .part("resume", part)
            .text("accountId", upload.account_id.clone());

        let client = self.build_client()?;
        let response = client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let reply = self.read_reply(response).await?;
        formfill_debug!("parseResume status={} bytes={}", reply.status, reply.body.len());
        Ok(reply)
    }
}

fn too_large(max_bytes: u64, actual: u64) -> TransportError {
    TransportError::new(
        FailureKind::TooLarge {
            max_bytes,
            actual: Some(actual),
        },
        "response too large",
    )
}

fn map_reqwest_error(err: reqwest::Error) -> TransportError {
    if err.is_timeout() {
        return TransportError::new(FailureKind::Timeout, err.to_string());
    }
    TransportError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_path_encodes_like_uri_component() {
        assert_eq!(
            search_path("San Francisco, CA", "tok"),
            "/searchLocations?text=San%20Francisco%2C%20CA&hcaptchaResponse=tok"
        );
        assert_eq!(
            search_path("a&b=c/é", ""),
            "/searchLocations?text=a%26b%3Dc%2F%C3%A9&hcaptchaResponse="
        );
        assert_eq!(
            search_path("it's (ok)!*~", "x"),
            "/searchLocations?text=it's%20(ok)!*~&hcaptchaResponse=x"
        );
    }

    #[test]
    fn endpoint_tolerates_trailing_slash_in_base() {
        let transport = ReqwestTransport::new(TransportSettings {
            base_url: "http://example.test/".into(),
            ..TransportSettings::default()
        });
        let url = transport.endpoint(PARSE_RESUME_PATH).unwrap();
        assert_eq!(url.as_str(), "http://example.test/parseResume");
    }

    #[test]
    fn malformed_base_is_invalid_url() {
        let transport = ReqwestTransport::new(TransportSettings {
            base_url: "not a url".into(),
            ..TransportSettings::default()
        });
        let err = transport.endpoint(SEARCH_PATH).unwrap_err();
        assert_eq!(err.kind, FailureKind::InvalidUrl);
    }
}

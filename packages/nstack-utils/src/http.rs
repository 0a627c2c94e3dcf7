use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{Method, StatusCode, Uri};
#[cfg(not(feature = "rustls-platform-verifier"))]
use hyper_rustls::ConfigBuilderExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use once_cell::sync::Lazy;
use rustls::ClientConfig;
#[cfg(feature = "rustls-platform-verifier")]
use rustls_platform_verifier::BuilderVerifierExt;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Requests that have not produced a response by then are abandoned.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("invalid url '{0}'")]
    InvalidUri(String),

    #[error("tls configuration failed: {0}")]
    Tls(String),

    #[error("failed to build request: {0}")]
    Request(#[from] hyper::http::Error),

    #[error("connection failed: {0}")]
    Connect(#[from] hyper_util::client::legacy::Error),

    #[error("failed to read response body: {0}")]
    Body(#[from] hyper::Error),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug)]
pub struct ResponseData {
    pub status: u16,
    pub body: Bytes,
}

impl ResponseData {
    pub fn is_success(&self) -> bool {
        http_status_is_ok(self.status)
    }
}

impl fmt::Display for ResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Response status: {}, body: {}",
            self.status,
            String::from_utf8_lossy(&self.body)
        )
    }
}

pub fn parse_uri(url: &str) -> Result<Uri, HttpError> {
    url.parse::<Uri>()
        .map_err(|_| HttpError::InvalidUri(url.to_string()))
}

pub async fn get(
    url: Uri,
    header_map: &HashMap<String, String>,
) -> Result<ResponseData, HttpError> {
    send(Method::GET, url, header_map, Bytes::new()).await
}

/// POST `params` as an `application/x-www-form-urlencoded` body.
pub async fn post_form(
    url: Uri,
    params: &BTreeMap<String, String>,
    header_map: &HashMap<String, String>,
) -> Result<ResponseData, HttpError> {
    let mut headers = header_map.clone();
    headers
        .entry("Content-Type".to_string())
        .or_insert_with(|| FORM_CONTENT_TYPE.to_string());
    send(Method::POST, url, &headers, Bytes::from(encode_form(params))).await
}

pub fn encode_form(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(value)
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

async fn send(
    method: Method,
    url: Uri,
    header_map: &HashMap<String, String>,
    body: Bytes,
) -> Result<ResponseData, HttpError> {
    let mut req = hyper::Request::builder().method(method.clone()).uri(url.clone());
    for (key, value) in header_map {
        req = req.header(key, value);
    }
    let req = req.body(Full::new(body))?;

    tracing::debug!(%method, %url, "sending request");
    let res = if url.scheme_str() == Some("https") {
        let client = Client::builder(TokioExecutor::new()).build(https_config()?);
        tokio::time::timeout(REQUEST_TIMEOUT, client.request(req)).await
    } else {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        tokio::time::timeout(REQUEST_TIMEOUT, client.request(req)).await
    };
    let res = res.map_err(|_| HttpError::Timeout(REQUEST_TIMEOUT))??;

    let status = res.status();
    let body = res.into_body().collect().await?.to_bytes();
    Ok(ResponseData {
        status: status.as_u16(),
        body,
    })
}

static PROVIDER: Lazy<std::sync::Arc<rustls::crypto::CryptoProvider>> =
    Lazy::new(|| std::sync::Arc::new(rustls::crypto::ring::default_provider()));

fn https_config() -> Result<hyper_rustls::HttpsConnector<HttpConnector>, HttpError> {
    let provider = PROVIDER.clone();
    let tls: ClientConfig;
    #[cfg(feature = "rustls-platform-verifier")]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_platform_verifier()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_no_client_auth();
    }
    #[cfg(all(feature = "webpki-roots", not(feature = "rustls-platform-verifier")))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_webpki_roots()
            .with_no_client_auth();
    }
    #[cfg(all(
        feature = "native-tokio",
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        tls = ClientConfig::builder_with_provider(provider)
            .with_safe_default_protocol_versions()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_native_roots()
            .map_err(|e| HttpError::Tls(e.to_string()))?
            .with_no_client_auth();
    }
    #[cfg(all(
        not(feature = "native-tokio"),
        not(feature = "webpki-roots"),
        not(feature = "rustls-platform-verifier")
    ))]
    {
        compile_error!("No TLS backend enabled");
    }
    Ok(hyper_rustls::HttpsConnectorBuilder::new()
        .with_tls_config(tls)
        .https_or_http()
        .enable_http1()
        .enable_http2()
        .build())
}

pub fn http_status_is_ok(status: u16) -> bool {
    if let Ok(status) = StatusCode::from_u16(status) {
        !(status.is_client_error() || status.is_server_error())
    } else {
        false
    }
}

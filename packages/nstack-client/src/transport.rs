use async_trait::async_trait;
use bytes::Bytes;
use nstack_core::{Transport, TransportError};
use nstack_utils::http::{get, parse_uri, post_form, HttpError, ResponseData};
use std::collections::{BTreeMap, HashMap};

/// [`Transport`] over hyper, HTTPS through rustls.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        HttpTransport
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(
        &self,
        url: &str,
        params: &BTreeMap<String, String>,
        headers: &HashMap<String, String>,
    ) -> Result<Bytes, TransportError> {
        let uri = parse_uri(url).map_err(to_transport_error)?;
        let response = post_form(uri, params, headers)
            .await
            .map_err(to_transport_error)?;
        into_body(url, response)
    }

    async fn get(
        &self,
        url: &str,
        headers: &HashMap<String, String>,
    ) -> Result<Bytes, TransportError> {
        let uri = parse_uri(url).map_err(to_transport_error)?;
        let response = get(uri, headers).await.map_err(to_transport_error)?;
        into_body(url, response)
    }
}

fn to_transport_error(e: HttpError) -> TransportError {
    match e {
        HttpError::InvalidUri(url) => TransportError::InvalidUrl(url),
        other => TransportError::Network(other.to_string()),
    }
}

fn into_body(url: &str, response: ResponseData) -> Result<Bytes, TransportError> {
    if response.is_success() {
        return Ok(response.body);
    }
    tracing::debug!(%url, status = response.status, "request rejected");
    Err(TransportError::Status {
        status: response.status,
        body: String::from_utf8_lossy(&response.body).into_owned(),
    })
}

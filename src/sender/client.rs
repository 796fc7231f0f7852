use crate::app::ClientConfig;
use crate::domain::DataType;
use bytes::Bytes;
use reqwest::header::{AUTHORIZATION, CONTENT_ENCODING, CONTENT_TYPE, HeaderValue};
use reqwest::{Client, ClientBuilder, StatusCode};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Request(e) if e.is_timeout())
    }

    pub fn is_connect(&self) -> bool {
        matches!(self, TransportError::Request(e) if e.is_connect())
    }
}

/// Outcome of a request that reached the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// 200 or 202
    Accepted { status: u16 },
    /// Any other status. The batch is not retried.
    Rejected { status: u16 },
}

impl Delivery {
    pub fn from_status(status: StatusCode) -> Self {
        match status {
            StatusCode::OK | StatusCode::ACCEPTED => Delivery::Accepted {
                status: status.as_u16(),
            },
            other => Delivery::Rejected {
                status: other.as_u16(),
            },
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Delivery::Accepted { .. })
    }

    pub fn status(&self) -> u16 {
        match self {
            Delivery::Accepted { status } | Delivery::Rejected { status } => *status,
        }
    }
}

/// Sends one compressed report payload.
///
/// `Ok` means the endpoint answered, whatever the status; `Err` means no
/// answer was obtained at all.
pub trait Transport: Send + Sync + 'static {
    fn send(
        &self,
        payload: Bytes,
        data_type: DataType,
    ) -> impl Future<Output = Result<Delivery, TransportError>> + Send;
}

/// HTTPS transport posting to `<server>/report?f=<format>`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    report_urls: [Url; 3],
    authorization: HeaderValue,
}

impl HttpTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, TransportError> {
        let report_urls = [
            report_url(&config.server, DataType::Metric)?,
            report_url(&config.server, DataType::Histogram)?,
            report_url(&config.server, DataType::Span)?,
        ];

        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| TransportError::InvalidHeaderValue(format!("Invalid token: {e}")))?;
        authorization.set_sensitive(true);

        let client = ClientBuilder::new()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                TransportError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            report_urls,
            authorization,
        })
    }

    pub fn report_url(&self, data_type: DataType) -> &Url {
        &self.report_urls[data_type.index()]
    }
}

impl Transport for HttpTransport {
    async fn send(&self, payload: Bytes, data_type: DataType) -> Result<Delivery, TransportError> {
        let start = Instant::now();
        let bytes = payload.len();

        let response = self
            .client
            .post(self.report_url(data_type).clone())
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_ENCODING, "gzip")
            .header(AUTHORIZATION, self.authorization.clone())
            .body(payload)
            .send()
            .await?;

        let delivery = Delivery::from_status(response.status());
        if delivery.is_accepted() {
            debug!(
                "Report accepted ({}, {} bytes, HTTP {}) in {:?}",
                data_type.format(),
                bytes,
                delivery.status(),
                start.elapsed()
            );
        } else {
            warn!(
                "Report rejected ({}, {} bytes): HTTP {}",
                data_type.format(),
                bytes,
                delivery.status()
            );
        }

        Ok(delivery)
    }
}

fn report_url(server: &str, data_type: DataType) -> Result<Url, TransportError> {
    let mut url = Url::parse(server).map_err(|e| {
        TransportError::InvalidConfiguration(format!("Invalid server URL '{server}': {e}"))
    })?;

    let path = format!("{}/report", url.path().trim_end_matches('/'));
    url.set_path(&path);
    url.query_pairs_mut().append_pair("f", data_type.format());
    Ok(url)
}

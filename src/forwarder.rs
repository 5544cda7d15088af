use std::fmt;
use std::io::{self, Write};

use flate2::write::ZlibEncoder;
use flate2::Compression;
use hyper::client::HttpConnector;
use hyper::header::{CONTENT_ENCODING, CONTENT_TYPE};
use hyper::{Body, Client, Method, Request, Uri};
use hyper_proxy::{Intercept, Proxy, ProxyConnector};
use hyper_tls::HttpsConnector;
use log::{debug, info};
use serde::Serialize;

use crate::error::{Result, WebhookError};

pub const DEFAULT_SITE: &str = "datadoghq.com";

const SOURCE: &str = "github";
const HOSTNAME: &str = "i-012345678";
const SERVICE: &str = "lambda";

type HttpsClient = Client<ProxyConnector<HttpsConnector<HttpConnector>>, Body>;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ForwarderConfig {
    pub api_key: Option<String>,
    pub site: Option<String>,
    pub tags: Vec<String>,
    pub https_proxy: Option<String>,
}

/// Where and how the logs client talks to the intake.
#[derive(Clone, PartialEq)]
pub struct ClientConfiguration {
    api_key: String,
    site: String,
    base_url: Option<String>,
    proxy: Option<Uri>,
}

impl ClientConfiguration {
    pub fn new(api_key: &str) -> Self {
        ClientConfiguration {
            api_key: api_key.to_owned(),
            site: DEFAULT_SITE.to_owned(),
            base_url: None,
            proxy: None,
        }
    }

    pub fn set_site(&mut self, site: &str) {
        self.site = site.to_owned();
    }

    /// Replaces the `https://http-intake.logs.<site>` server entirely.
    pub fn set_base_url(&mut self, base_url: &str) {
        self.base_url = Some(base_url.trim_end_matches('/').to_owned());
    }

    pub fn set_proxy(&mut self, proxy: &str) -> Result<()> {
        let uri = proxy
            .parse::<Uri>()
            .map_err(|err| WebhookError::Configuration(format!("Invalid https_proxy {:?}: {}", proxy, err)))?;
        self.proxy = Some(uri);
        Ok(())
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn proxy(&self) -> Option<&Uri> {
        self.proxy.as_ref()
    }

    pub fn logs_endpoint(&self) -> String {
        match &self.base_url {
            Some(base_url) => format!("{}/api/v2/logs", base_url),
            None => format!("https://http-intake.logs.{}/api/v2/logs", self.site),
        }
    }
}

impl fmt::Debug for ClientConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfiguration")
            .field("api_key", &"***")
            .field("site", &self.site)
            .field("base_url", &self.base_url)
            .field("proxy", &self.proxy)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HttpLogItem {
    pub ddsource: String,
    pub ddtags: String,
    pub hostname: String,
    pub message: String,
    pub service: String,
}

/// Thin client for the v2 logs submission endpoint.
pub struct LogsApi {
    configuration: ClientConfiguration,
    client: HttpsClient,
}

impl LogsApi {
    pub fn new(configuration: ClientConfiguration) -> Result<Self> {
        let https = HttpsConnector::new();
        let connector = match configuration.proxy() {
            Some(uri) => ProxyConnector::from_proxy(https, Proxy::new(Intercept::All, uri.clone())),
            None => ProxyConnector::new(https),
        }
        .map_err(|err| WebhookError::Configuration(format!("Cannot build HTTPS connector: {}", err)))?;
        let client = Client::builder().build::<_, Body>(connector);
        Ok(LogsApi { configuration, client })
    }

    pub fn configuration(&self) -> &ClientConfiguration {
        &self.configuration
    }

    pub async fn submit_log(&self, items: &[HttpLogItem]) -> Result<()> {
        let json = serde_json::to_vec(items)
            .map_err(|err| WebhookError::Delivery(format!("Cannot serialize log items: {}", err)))?;
        let body = deflate(&json)
            .map_err(|err| WebhookError::Delivery(format!("Cannot compress log items: {}", err)))?;
        let request = Request::builder()
            .method(Method::POST)
            .uri(self.configuration.logs_endpoint())
            .header("DD-API-KEY", self.configuration.api_key())
            .header(CONTENT_TYPE, "application/json")
            .header(CONTENT_ENCODING, "deflate")
            .body(Body::from(body))
            .map_err(|err| WebhookError::Delivery(format!("Cannot build log request: {}", err)))?;

        let response = self
            .client
            .request(request)
            .await
            .map_err(|err| WebhookError::Delivery(format!("Failed to submit log: {}", err)))?;
        let status = response.status();
        if status.is_success() {
            debug!("Log accepted with status {}", status);
            return Ok(());
        }
        let body = hyper::body::to_bytes(response.into_body()).await.unwrap_or_default();
        Err(WebhookError::Delivery(format!(
            "Log submission failed with status {}: {}",
            status,
            String::from_utf8_lossy(&body)
        )))
    }
}

fn deflate(data: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}

impl fmt::Debug for LogsApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogsApi").field("configuration", &self.configuration).finish()
    }
}

#[derive(Debug)]
pub struct DatadogForwarder {
    api: LogsApi,
    tags: Vec<String>,
}

impl DatadogForwarder {
    pub fn new(api: LogsApi, tags: Vec<String>) -> Self {
        DatadogForwarder { api, tags }
    }

    pub fn log_item(&self, payload: &str) -> HttpLogItem {
        HttpLogItem {
            ddsource: SOURCE.to_owned(),
            ddtags: self.tags.join(","),
            hostname: HOSTNAME.to_owned(),
            message: payload.to_owned(),
            service: SERVICE.to_owned(),
        }
    }

    pub async fn send(&self, payload: &str) -> Result<()> {
        self.api.submit_log(&[self.log_item(payload)]).await
    }
}

#[derive(Debug)]
pub enum WebhookForwarder {
    Datadog(DatadogForwarder),
    Null,
}

impl WebhookForwarder {
    pub fn create(config: &ForwarderConfig) -> Result<Self> {
        let api_key = match &config.api_key {
            Some(api_key) => api_key,
            None => return Ok(WebhookForwarder::Null),
        };
        let mut configuration = ClientConfiguration::new(api_key);
        if let Some(site) = config.site.as_deref().filter(|site| !site.is_empty()) {
            configuration.set_site(site);
        }
        if let Some(proxy) = config.https_proxy.as_deref().filter(|proxy| !proxy.is_empty()) {
            info!("Using https_proxy: {}", proxy);
            configuration.set_proxy(proxy)?;
        }
        let api = LogsApi::new(configuration)?;
        Ok(WebhookForwarder::Datadog(DatadogForwarder::new(api, config.tags.clone())))
    }

    pub async fn send(&self, payload: &str) -> Result<()> {
        match self {
            WebhookForwarder::Datadog(forwarder) => forwarder.send(payload).await,
            WebhookForwarder::Null => Ok(()),
        }
    }

    pub fn configuration(&self) -> Option<&ClientConfiguration> {
        match self {
            WebhookForwarder::Datadog(forwarder) => Some(forwarder.api.configuration()),
            WebhookForwarder::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, WebhookForwarder::Null)
    }
}

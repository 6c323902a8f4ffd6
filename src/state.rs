use axum::http::{HeaderValue, Uri};
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::Config;

#[derive(Clone)]
pub struct ProxyTarget {
    pub uri: Uri,
    pub host_value: HeaderValue,
    pub x_forwarded_proto: HeaderValue,
}

impl ProxyTarget {
    pub fn parse(target: &str) -> anyhow::Result<Self> {
        let uri = target
            .parse::<Uri>()
            .map_err(|err| anyhow::anyhow!("invalid proxy target: {err}"))?;
        let host = uri
            .authority()
            .ok_or_else(|| anyhow::anyhow!("proxy target missing authority"))?
            .to_string();
        let scheme = uri.scheme_str().unwrap_or("http").to_string();

        let host_value = HeaderValue::from_str(&host)
            .map_err(|err| anyhow::anyhow!("invalid host header value: {err}"))?;
        let x_forwarded_proto = HeaderValue::from_str(&scheme)
            .map_err(|err| anyhow::anyhow!("invalid scheme header value: {err}"))?;

        Ok(Self {
            uri,
            host_value,
            x_forwarded_proto,
        })
    }
}

pub struct AppState {
    pub config: Config,
    pub proxy_client: Client<HttpConnector, axum::body::Body>,
    pub proxy_target: ProxyTarget,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let proxy_target = ProxyTarget::parse(&config.proxy.target)?;
        let proxy_client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Ok(Self {
            config,
            proxy_client,
            proxy_target,
        })
    }
}

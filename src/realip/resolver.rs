use std::net::IpAddr;

use axum::http::{HeaderMap, HeaderName, HeaderValue};

use crate::config::RealIpConfig;
use crate::protocol::http::HeaderMapExt;
use crate::realip::trust::TrustSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpSource {
    ForwardedFor,
    ConnectingIp,
}

impl IpSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            IpSource::ForwardedFor => "x_forwarded_for",
            IpSource::ConnectingIp => "cf_connecting_ip",
        }
    }
}

/// Outcome of one resolution. `ip` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub ip: String,
    pub source: IpSource,
}

#[derive(Debug, Clone)]
pub struct HeaderNames {
    pub forwarded_for: HeaderName,
    pub connecting_ip: HeaderName,
    pub real_ip: HeaderName,
}

impl Default for HeaderNames {
    fn default() -> Self {
        Self {
            forwarded_for: HeaderName::from_static("x-forwarded-for"),
            connecting_ip: HeaderName::from_static("cf-connecting-ip"),
            real_ip: HeaderName::from_static("x-real-ip"),
        }
    }
}

pub const DEFAULT_MAX_CHAIN_ENTRIES: usize = 64;

#[derive(Debug, Clone)]
pub struct Resolver {
    trust: TrustSet,
    headers: HeaderNames,
    max_chain_entries: usize,
}

impl Resolver {
    pub fn new(trust: TrustSet, headers: HeaderNames, max_chain_entries: usize) -> Self {
        Self {
            trust,
            headers,
            max_chain_entries: max_chain_entries.max(1),
        }
    }

    pub fn from_config(cfg: &RealIpConfig) -> anyhow::Result<Self> {
        let trust = TrustSet::from_cidrs(&cfg.excluded_nets)?;
        let headers = HeaderNames {
            forwarded_for: parse_header_name(&cfg.forwarded_for_header)?,
            connecting_ip: parse_header_name(&cfg.connecting_ip_header)?,
            real_ip: parse_header_name(&cfg.real_ip_header)?,
        };
        Ok(Self::new(trust, headers, cfg.max_chain_entries))
    }

    pub fn trust(&self) -> &TrustSet {
        &self.trust
    }

    pub fn header_names(&self) -> &HeaderNames {
        &self.headers
    }

    /// Unparseable tokens count as excluded.
    pub fn is_excluded(&self, token: &str) -> bool {
        match token.parse::<IpAddr>() {
            Ok(ip) => self.trust.contains(&ip),
            Err(_) => true,
        }
    }

    /// Picks the client address and rewrites `headers` in place.
    ///
    /// The chain header is scanned right to left and the first token not
    /// excluded wins. When none qualifies, the connecting-ip header is used
    /// verbatim and also replaces the chain header. The real-ip header is
    /// always overwritten with the result, even when it is empty.
    pub fn resolve(&self, headers: &mut HeaderMap) -> Resolution {
        let (accepted, examined) = self.scan_chain(headers);
        let (resolution, value) = match accepted {
            Some(ip) => {
                let value = HeaderValue::from_str(&ip)
                    .unwrap_or_else(|_| HeaderValue::from_static(""));
                let resolution = Resolution {
                    ip,
                    source: IpSource::ForwardedFor,
                };
                (resolution, value)
            }
            None => {
                let value = headers.get_value_or_empty(&self.headers.connecting_ip);
                headers.insert(self.headers.forwarded_for.clone(), value.clone());
                let resolution = Resolution {
                    ip: String::from_utf8_lossy(value.as_bytes()).into_owned(),
                    source: IpSource::ConnectingIp,
                };
                (resolution, value)
            }
        };

        headers.insert(self.headers.real_ip.clone(), value);
        tracing::debug!(
            ip = %resolution.ip,
            source = resolution.source.as_str(),
            examined,
            "client ip resolved"
        );
        resolution
    }

    /// Returns the accepted token and how many tokens were looked at.
    ///
    /// Tokens are split on raw bytes so one undecodable entry is skipped on
    /// its own instead of hiding the rest of the chain.
    fn scan_chain(&self, headers: &HeaderMap) -> (Option<String>, usize) {
        let chain = headers.get_bytes_or_empty(&self.headers.forwarded_for);
        let mut examined = 0usize;
        for raw in chain.rsplit(|b| *b == b',') {
            if examined == self.max_chain_entries {
                tracing::debug!(limit = self.max_chain_entries, "forwarded chain truncated");
                return (None, examined);
            }
            examined += 1;
            let Ok(token) = std::str::from_utf8(raw) else {
                continue;
            };
            let token = token.trim();
            if !self.is_excluded(token) {
                return (Some(token.to_string()), examined);
            }
        }
        (None, examined)
    }
}

fn parse_header_name(raw: &str) -> anyhow::Result<HeaderName> {
    HeaderName::from_bytes(raw.trim().as_bytes())
        .map_err(|err| anyhow::anyhow!("invalid header name {raw}: {err}"))
}

//! Trusted client IP resolution for requests that crossed reverse proxies.
//!
//! [`realip::Resolver`] walks `X-Forwarded-For` from the right, skipping
//! entries inside the configured excluded networks, and falls back to
//! `Cf-Connecting-Ip` when nothing qualifies. The result always lands in
//! `X-Real-Ip`. [`middleware::RealIpLayer`] runs it in front of any tower
//! service.

pub mod config;
pub mod middleware;
pub mod protocol;
pub mod proxy;
pub mod realip;
pub mod state;

pub use config::{Config, RealIpConfig};
pub use middleware::{ClientIp, RealIpLayer, RealIpService};
pub use realip::{IpSource, Resolution, Resolver, TrustSet};

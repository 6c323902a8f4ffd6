//! Tower layer that resolves the client address before the inner service
//! sees the request.
//!
//! The resolver rewrites the request headers in place and the resulting
//! [`crate::realip::Resolution`] is stored in the request extensions for handlers that
//! prefer a typed value (see [`super::client_ip::ClientIp`]).

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::http::Request;
use tower::{Layer, Service};

use crate::config::RealIpConfig;
use crate::realip::Resolver;

#[derive(Debug, Clone)]
pub struct RealIpLayer {
    resolver: Arc<Resolver>,
}

impl RealIpLayer {
    pub fn new(resolver: Resolver) -> Self {
        Self {
            resolver: Arc::new(resolver),
        }
    }

    /// Fails when an excluded net or header name is invalid.
    pub fn from_config(cfg: &RealIpConfig) -> anyhow::Result<Self> {
        let resolver = Resolver::from_config(cfg)?;
        tracing::info!(
            excluded_nets = resolver.trust().len(),
            forwarded_for = %resolver.header_names().forwarded_for,
            connecting_ip = %resolver.header_names().connecting_ip,
            real_ip = %resolver.header_names().real_ip,
            "real ip resolver ready"
        );
        Ok(Self::new(resolver))
    }
}

impl<S> Layer<S> for RealIpLayer {
    type Service = RealIpService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RealIpService {
            inner,
            resolver: self.resolver.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RealIpService<S> {
    inner: S,
    resolver: Arc<Resolver>,
}

impl<S, B> Service<Request<B>> for RealIpService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<B>) -> Self::Future {
        let resolution = self.resolver.resolve(req.headers_mut());
        req.extensions_mut().insert(resolution);
        self.inner.call(req)
    }
}

//! Handler-side access to the address picked by [`super::real_ip::RealIpLayer`].
//!
//! ```ignore
//! async fn handler(ClientIp(resolution): ClientIp) -> impl IntoResponse { ... }
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::StatusCode;

use crate::realip::Resolution;

pub struct ClientIp(pub Resolution);

impl<S: Send + Sync> FromRequestParts<S> for ClientIp {
    type Rejection = (StatusCode, &'static str);

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Resolution>()
            .cloned()
            .map(ClientIp)
            .ok_or((
                StatusCode::INTERNAL_SERVER_ERROR,
                "real ip layer not installed",
            ))
    }
}

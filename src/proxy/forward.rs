use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, Response, StatusCode, Uri};
use axum::response::IntoResponse;

use crate::middleware::ClientIp;
use crate::state::{AppState, ProxyTarget};

pub async fn proxy_handler(
    State(state): State<Arc<AppState>>,
    ClientIp(client): ClientIp,
    mut req: Request<Body>,
) -> impl IntoResponse {
    let target = &state.proxy_target;
    *req.uri_mut() = build_target_uri(&target.uri, req.uri());
    rewrite_headers(req.headers_mut(), target);

    tracing::debug!(
        client_ip = %client.ip,
        source = client.source.as_str(),
        uri = %req.uri(),
        "proxying request"
    );

    match state.proxy_client.request(req).await {
        Ok(resp) => {
            let status = resp.status();
            tracing::debug!(status = %status, "proxy response");
            let (parts, body) = resp.into_parts();
            Response::from_parts(parts, Body::new(body))
        }
        Err(err) => {
            tracing::debug!(error = %err, "proxy request failed");
            StatusCode::BAD_GATEWAY.into_response()
        }
    }
}

fn build_target_uri(target: &Uri, original: &Uri) -> Uri {
    let mut parts = original.clone().into_parts();
    parts.scheme = target.scheme().cloned();
    parts.authority = target.authority().cloned();
    if parts.path_and_query.is_none() {
        parts.path_and_query = Some(axum::http::uri::PathAndQuery::from_static("/"));
    }
    Uri::from_parts(parts).unwrap_or_else(|_| target.clone())
}

fn rewrite_headers(headers: &mut HeaderMap, target: &ProxyTarget) {
    headers.insert(header::HOST, target.host_value.clone());
    headers
        .entry(header::HeaderName::from_static("x-forwarded-host"))
        .or_insert_with(|| target.host_value.clone());
    headers
        .entry(header::HeaderName::from_static("x-forwarded-proto"))
        .or_insert_with(|| target.x_forwarded_proto.clone());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_uri_keeps_path_and_query() {
        let target: Uri = "http://127.0.0.1:1234".parse().unwrap();
        let original: Uri = "/a/b?c=d".parse().unwrap();
        let uri = build_target_uri(&target, &original);
        assert_eq!(uri.to_string(), "http://127.0.0.1:1234/a/b?c=d");
    }

    #[test]
    fn forwarding_headers_are_filled_only_when_absent() {
        let target = ProxyTarget::parse("http://backend:80").unwrap();
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, "public.example".parse().unwrap());
        headers.insert("x-forwarded-proto", "https".parse().unwrap());
        headers.insert("x-real-ip", "10.0.0.1".parse().unwrap());

        rewrite_headers(&mut headers, &target);
        assert_eq!(headers[header::HOST], "backend:80");
        assert_eq!(headers["x-forwarded-host"], "backend:80");
        assert_eq!(headers["x-forwarded-proto"], "https");
        assert_eq!(headers["x-real-ip"], "10.0.0.1");
    }
}

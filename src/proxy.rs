//! CORS-relaying forwarder: `GET /?url=<upstream>` fetches the upstream URL
//! and hands its body back with permissive cross-origin headers.

use std::future::Future;

use anyhow::{Context, Result};
use axum::Router;
use axum::body::Bytes;
use axum::extract::{RawQuery, Request};
use axum::http::{HeaderValue, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;

use crate::http_client;

pub const MISSING_URL_MESSAGE: &str = "Missing 'url' parameter";

pub fn router() -> Router {
    Router::new()
        .fallback(proxy_handler)
        .layer(middleware::from_fn(cors_middleware))
}

pub async fn serve(
    listener: TcpListener,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    axum::serve(listener, router())
        .with_graceful_shutdown(shutdown)
        .await
        .context("proxy server stopped unexpectedly")
}

/// Everything after a leading `url=` is the target, percent-decoded as a
/// whole so an unencoded upstream query string survives intact. `+` stays `+`.
pub fn target_url(query: Option<&str>) -> Option<String> {
    let encoded = query?.strip_prefix("url=")?;
    let target = percent_decode_str(encoded).decode_utf8_lossy();
    let target = target.trim();
    (!target.is_empty()).then(|| target.to_string())
}

async fn proxy_handler(method: Method, RawQuery(query): RawQuery) -> Response {
    if method != Method::GET {
        return text_response(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed".to_string());
    }
    let Some(target) = target_url(query.as_deref()) else {
        return text_response(StatusCode::BAD_REQUEST, MISSING_URL_MESSAGE.to_string());
    };

    eprintln!("[INFO] proxying request to: {target}");
    match fetch_upstream(&target).await {
        Ok(body) => {
            eprintln!("[INFO] proxied {} bytes", body.len());
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
        Err(err) => {
            eprintln!("[WARN] error proxying request: {err:#}");
            text_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Proxy error: {err:#}"),
            )
        }
    }
}

async fn fetch_upstream(url: &str) -> Result<Bytes> {
    let client = http_client::proxy_client()?;
    let res = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("request {url}"))?
        .error_for_status()
        .with_context(|| format!("status for {url}"))?;
    res.bytes()
        .await
        .with_context(|| format!("read body {url}"))
}

fn text_response(status: StatusCode, body: String) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain")], body).into_response()
}

async fn cors_middleware(req: Request, next: Next) -> Response {
    if req.method() == Method::OPTIONS {
        let mut resp = StatusCode::OK.into_response();
        apply_cors_headers(&mut resp);
        return resp;
    }
    let mut resp = next.run(req).await;
    apply_cors_headers(&mut resp);
    resp
}

pub fn apply_cors_headers(resp: &mut Response) {
    let headers = resp.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static("GET, POST, OPTIONS"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static("3600"),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn target_keeps_unencoded_upstream_query() {
        assert_eq!(
            target_url(Some("url=http://up/x?a=1&b=2")).as_deref(),
            Some("http://up/x?a=1&b=2")
        );
        assert_eq!(
            target_url(Some("url=http%3A%2F%2Fup%2Fx%3Fq%3Da+b%26c%3D1")).as_deref(),
            Some("http://up/x?q=a+b&c=1")
        );
    }

    #[test]
    fn target_requires_leading_url_parameter() {
        assert_eq!(target_url(None), None);
        assert_eq!(target_url(Some("")), None);
        assert_eq!(target_url(Some("url=")), None);
        assert_eq!(target_url(Some("foo=1&url=http://up/")), None);
    }

    #[test]
    fn cors_headers_are_permissive() {
        let mut resp = StatusCode::BAD_REQUEST.into_response();
        apply_cors_headers(&mut resp);
        let h = resp.headers();
        assert_eq!(h["access-control-allow-origin"], "*");
        assert_eq!(h["access-control-allow-methods"], "GET, POST, OPTIONS");
        assert_eq!(h["access-control-allow-headers"], "*");
        assert_eq!(h["access-control-max-age"], "3600");
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}

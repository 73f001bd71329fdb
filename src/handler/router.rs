//! Request routing dispatch module
//!
//! Entry point for HTTP request processing, responsible for method validation,
//! parameter extraction, and dispatching to the front controllers.

use crate::config::AppState;
use crate::error::{Error, Result};
use crate::frontcontroller::{self, v3, v4, ParamMap};
use crate::handler::params;
use crate::http;
use crate::logger::{self, AccessLogEntry};
use http_body_util::{BodyExt, Full, LengthLimitError, Limited};
use hyper::body::{Body, Bytes};
use hyper::header::{HeaderValue, CONTENT_LENGTH, CONTENT_TYPE, SERVER, USER_AGENT};
use hyper::{Method, Request, Response, StatusCode, Version};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> std::result::Result<Response<Full<Bytes>>, Infallible>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    let started = Instant::now();
    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        req.uri().path().to_string(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = version_label(req.version()).to_string();
    entry.user_agent = header_value(&req, USER_AGENT.as_str());

    let mut response = serve(req, &state).await;
    if let Ok(server) = HeaderValue::from_str(&state.config.http.server_name) {
        response.headers_mut().insert(SERVER, server);
    }

    if state.config.logging.access_log {
        entry.status = response.status().as_u16();
        entry.body_bytes = response.body().size_hint().exact().unwrap_or(0);
        entry.request_time_us =
            u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
        logger::log_access(&entry, &state.config.logging.access_log_format);
    }

    Ok(response)
}

async fn serve<B>(req: Request<B>, state: &AppState) -> Response<Full<Bytes>>
where
    B: Body<Data = Bytes>,
    B::Error: Into<BoxError>,
{
    // 1. Check HTTP method
    if let Some(resp) = check_http_method(req.method()) {
        return resp;
    }

    // 2. Check declared body size
    let max_body_size = state.config.http.max_body_size;
    if let Some(resp) = check_body_size(&req, max_body_size) {
        return resp;
    }

    // 3. HEAD must not reach a controller that writes
    let is_head = req.method() == Method::HEAD;
    let path = req.uri().path().to_string();
    if is_head && frontcontroller::changes_state(&path) {
        logger::log_warning(&format!("HEAD refused on state-changing route: {path}"));
        return http::build_405_response(http::STATE_CHANGING_METHODS);
    }

    // 4. Extract parameters from query and form body
    let query = req.uri().query().map(ToString::to_string);
    let content_type = header_value(&req, CONTENT_TYPE.as_str());

    let limit = usize::try_from(max_body_size).unwrap_or(usize::MAX);
    let body = match Limited::new(req.into_body(), limit).collect().await {
        Ok(collected) => collected.to_bytes(),
        Err(e) if e.is::<LengthLimitError>() => {
            logger::log_error(&format!(
                "Request body exceeds {max_body_size} bytes: {path}"
            ));
            return http::build_413_response();
        }
        Err(e) => {
            logger::log_warning(&format!("Failed to read request body for {path}: {e}"));
            return http::build_error_response(StatusCode::BAD_REQUEST, "unreadable request body");
        }
    };
    let params = params::extract(query.as_deref(), content_type.as_deref(), &body);

    // 5. Dispatch and render
    match route_request(&path, &params, state).await {
        Ok(html) => http::build_html_response(html, is_head),
        Err(err) => error_response(&err),
    }
}

/// Pick the front controller by URL prefix
async fn route_request(path: &str, params: &ParamMap, state: &AppState) -> Result<String> {
    let renderer = state.renderer.as_ref();
    if path.starts_with(v3::PREFIX) {
        state.front_v3.service(path, params, renderer).await
    } else if path.starts_with(v4::PREFIX) {
        state.front_v4.service(path, params, renderer).await
    } else {
        Err(Error::RouteNotFound {
            path: path.to_string(),
        })
    }
}

fn error_response(err: &Error) -> Response<Full<Bytes>> {
    let status = err.status();
    match err {
        Error::RouteNotFound { .. } => http::build_404_response(),
        _ if status.is_client_error() => {
            logger::log_warning(&format!("Rejected request: {err}"));
            http::build_error_response(status, &err.to_string())
        }
        _ => {
            if err.is_render_failure() {
                logger::log_error(&format!("Render failure: {err}"));
            } else {
                logger::log_error(&format!("Dispatch failure: {err}"));
            }
            http::build_error_response(status, "the page could not be rendered")
        }
    }
}

/// Check HTTP method and answer anything the front controllers do not serve
fn check_http_method(method: &Method) -> Option<Response<Full<Bytes>>> {
    match *method {
        Method::GET | Method::HEAD | Method::POST => None,
        Method::OPTIONS => Some(http::build_options_response()),
        _ => {
            logger::log_warning(&format!("Method not allowed: {method}"));
            Some(http::build_405_response(http::ALLOWED_METHODS))
        }
    }
}

/// Validate Content-Length header and return 413 if exceeded
fn check_body_size<B>(req: &Request<B>, max_body_size: u64) -> Option<Response<Full<Bytes>>> {
    let content_length = req.headers().get(CONTENT_LENGTH)?;
    content_length.to_str().map_or_else(
        |_| {
            logger::log_warning("Content-Length header contains non-ASCII characters");
            None
        },
        |size_str| match size_str.parse::<u64>() {
            Ok(size) if size > max_body_size => {
                logger::log_error(&format!(
                    "Request body too large: {size} bytes (max: {max_body_size})"
                ));
                Some(http::build_413_response())
            }
            Err(_) => {
                logger::log_warning(&format!(
                    "Invalid Content-Length value: '{size_str}', skipping size check"
                ));
                None
            }
            _ => None,
        },
    )
}

fn header_value<B>(req: &Request<B>, name: &str) -> Option<String> {
    req.headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}

const fn version_label(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "0.9",
        Version::HTTP_10 => "1.0",
        Version::HTTP_2 => "2",
        Version::HTTP_3 => "3",
        _ => "1.1",
    }
}

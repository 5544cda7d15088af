use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use bytes::Bytes;
use hyper::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use hyper::service::{make_service_fn, service_fn};
use hyper::{Body, HeaderMap, Method, Request, Response, Server, StatusCode};
use log::{error, info, warn};

use crate::codec;
use crate::emulator::Emulator;
use crate::event::{Headers, InboundEvent, OutboundResponse};

pub const NOT_FOUND_MESSAGE: &str = "Sorry, we cannot find that!";

pub async fn serve(addr: SocketAddr, emulator: Arc<Emulator>) -> Result<(), hyper::Error> {
    let service = make_service_fn(move |_| {
        let emulator = emulator.clone();
        async move { Ok::<_, Infallible>(service_fn(move |req| routes(req, emulator.clone()))) }
    });
    let server = Server::bind(&addr).serve(service);
    info!("Server is running on port {}", addr.port());
    server.await
}

pub async fn routes(req: Request<Body>, emulator: Arc<Emulator>) -> Result<Response<Body>, Infallible> {
    let response = if req.method() == Method::POST && req.uri().path() == "/" {
        invoke(req, &emulator).await
    } else {
        warn!("Unhandled url [{}]{}", req.method(), req.uri());
        not_found()
    };
    Ok(response)
}

async fn invoke(req: Request<Body>, emulator: &Emulator) -> Response<Body> {
    let headers = collect_headers(req.headers());
    let body: Bytes = match hyper::body::to_bytes(req.into_body()).await {
        Ok(body) => body,
        Err(err) => return error_response(&format!("Cannot read request body: {}", err)),
    };
    let content_type = headers.get(CONTENT_TYPE.as_str()).map(String::as_str);
    let encoded = codec::encode_body(&body, content_type);
    let event = InboundEvent::new(headers, encoded);

    match emulator.execute(event).await {
        Ok(result) => to_http_response(result),
        Err(err) => {
            error!("Invocation failed: {}", err);
            error_response(&err.to_string())
        }
    }
}

/// Lowercase names; repeated headers are joined with `", "`.
fn collect_headers(headers: &HeaderMap) -> Headers {
    let mut collected = Headers::new();
    for (name, value) in headers {
        let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
        collected
            .entry(name.as_str().to_owned())
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert_with(|| value.clone());
    }
    collected
}

fn to_http_response(result: OutboundResponse) -> Response<Body> {
    let status = match StatusCode::from_u16(result.status_code) {
        Ok(status) => status,
        Err(_) => return error_response(&format!("Invalid status code {}", result.status_code)),
    };
    let mut response = Response::new(Body::from(result.body));
    *response.status_mut() = status;
    for (name, value) in &result.headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(value)) {
            (Ok(name), Ok(value)) => {
                response.headers_mut().insert(name, value);
            }
            _ => warn!("Dropping invalid response header {:?}", name),
        }
    }
    response
}

fn error_response(message: &str) -> Response<Body> {
    to_http_response(OutboundResponse::error(message))
}

fn not_found() -> Response<Body> {
    let mut response = Response::new(Body::from(NOT_FOUND_MESSAGE));
    *response.status_mut() = StatusCode::NOT_FOUND;
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static("text/html; charset=utf-8"));
    response
}

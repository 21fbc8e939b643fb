use std::task::{Context, Poll};

use axum::{
    extract::Query,
    http::{HeaderName, Method, Request},
};
use serde::Deserialize;
use tower::{Layer, Service};

#[cfg(feature = "tracing")]
use tracing::debug;

pub static OVERRIDE_HEADER: HeaderName = HeaderName::from_static("x-http-method-override");

/// Lets HTML forms reach PUT/PATCH/DELETE handlers. A POST carrying
/// `?_method=<verb>` or an `X-HTTP-Method-Override` header is rewritten to
/// that verb before it is routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct MethodOverrideLayer;

impl<S> Layer<S> for MethodOverrideLayer {
    type Service = MethodOverride<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MethodOverride { inner }
    }
}

#[derive(Debug, Clone)]
pub struct MethodOverride<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for MethodOverride<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        if let Some(method) = requested_override(&request) {
            #[cfg(feature = "tracing")]
            debug!(uri = %request.uri(), method = %method, "Overriding POST method");
            *request.method_mut() = method;
        }
        self.inner.call(request)
    }
}

#[derive(Deserialize)]
struct OverrideQuery {
    #[serde(rename = "_method")]
    method: Option<String>,
}

/// The method a POST asks to be treated as, if it is one we honor.
pub fn requested_override<B>(request: &Request<B>) -> Option<Method> {
    if request.method() != Method::POST {
        return None;
    }
    let from_query = Query::<OverrideQuery>::try_from_uri(request.uri())
        .ok()
        .and_then(|Query(q)| q.method);
    let from_header = || {
        request
            .headers()
            .get(&OVERRIDE_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let requested = from_query.or_else(from_header)?;
    match requested.trim().to_ascii_uppercase().as_str() {
        "PUT" => Some(Method::PUT),
        "PATCH" => Some(Method::PATCH),
        "DELETE" => Some(Method::DELETE),
        _ => None,
    }
}

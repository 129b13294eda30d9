use rama::{
    error::OpaqueError,
    http::{
        Body, HeaderMap, HeaderValue, Method, Request, Uri,
        header::{PRAGMA, USER_AGENT},
    },
};

use crate::utils;

use super::HttpMethod;

/// The request replayed by every worker.
///
/// Built and validated once before the run starts,
/// after which it is only ever read.
#[derive(Debug, Clone)]
pub struct RequestSpec {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    reload: bool,
}

impl RequestSpec {
    /// Create a new [`RequestSpec`] for the given absolute http(s) `uri`.
    ///
    /// When `reload` is set a `Pragma: no-cache` header is added,
    /// asking caches along the way to forward the request to the origin.
    pub fn try_new(method: HttpMethod, uri: Uri, reload: bool) -> Result<Self, OpaqueError> {
        match uri.scheme_str() {
            Some("http" | "https") => (),
            Some(scheme) => {
                return Err(OpaqueError::from_display(format!(
                    "unsupported url scheme '{scheme}' in '{uri}': only http and https are supported"
                )));
            }
            None => {
                return Err(OpaqueError::from_display(format!(
                    "url '{uri}' is not absolute: scheme missing"
                )));
            }
        }

        if uri.host().is_none_or(str::is_empty) {
            return Err(OpaqueError::from_display(format!(
                "url '{uri}' is not absolute: host missing"
            )));
        }

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(utils::env::user_agent()));
        if reload {
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }

        Ok(Self {
            method: method.as_method(),
            uri,
            headers,
            reload,
        })
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn is_reload(&self) -> bool {
        self.reload
    }

    /// Materialise a fresh [`Request`] for a single attempt.
    pub fn to_request(&self) -> Request {
        let mut req = Request::new(Body::empty());
        *req.method_mut() = self.method.clone();
        *req.uri_mut() = self.uri.clone();
        *req.headers_mut() = self.headers.clone();
        req
    }
}

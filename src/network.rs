/*
 * SPDX-FileCopyrightText: Copyright (c) 2023 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::time::Duration;

use reqwest::{
    blocking::Client as HttpClient, blocking::ClientBuilder as HttpClientBuilder,
    header::HeaderMap, header::HeaderValue, header::ACCEPT, header::CONTENT_TYPE, Method,
    StatusCode,
};
use tracing::debug;

pub use crate::RedfishError;

/// Unversioned resource listing the Redfish protocol versions a service offers.
pub const REDFISH_DISCOVERY: &str = "redfish";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

/// Which credentials go on a request. Version discovery and the service root
/// are readable without logging in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Basic,
    Anonymous,
}

/// A fully built request, ready to go on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: HeaderMap,
    pub body: Option<String>,
    pub basic_auth: Option<(String, Option<String>)>,
}

#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Moves one request to the BMC and brings back the raw response. Must not
/// interpret the status; that is [`RedfishHttpClient`]'s job.
pub trait HttpTransport: Send {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RedfishError>;
}

#[derive(Debug)]
pub struct RedfishClientPoolBuilder {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl RedfishClientPoolBuilder {
    /// Prevents the Redfish Client from accepting self signed certificates
    /// and other invalid certificates.
    ///
    /// By default self signed certificates will be accepted, since BMCs usually
    /// use those.
    pub fn reject_invalid_certs(mut self) -> RedfishClientPoolBuilder {
        self.accept_invalid_certs = false;
        self
    }

    /// Overwrites the timeout that will be applied to every request
    pub fn timeout(mut self, timeout: Duration) -> RedfishClientPoolBuilder {
        self.timeout = timeout;
        self
    }

    /// Builds a Redfish Client Network Configuration
    pub fn build(&self) -> Result<RedfishClientPool, RedfishError> {
        let http_client = HttpClientBuilder::new()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .build()
            .map_err(RedfishError::ClientBuild)?;
        Ok(RedfishClientPool {
            http_client,
            accept_invalid_certs: self.accept_invalid_certs,
        })
    }
}

/// The BMC a client talks to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    /// Scheme and host, e.g. `https://10.0.0.5`. A trailing slash is ignored.
    pub base_url: String,
    /// BMC username
    pub user: Option<String>,
    /// BMC password
    pub password: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RedfishClientPool {
    http_client: HttpClient,
    accept_invalid_certs: bool,
}

impl RedfishClientPool {
    /// Returns Builder for configuring a Redfish HTTP connection pool
    pub fn builder() -> RedfishClientPoolBuilder {
        RedfishClientPoolBuilder {
            timeout: DEFAULT_TIMEOUT,
            // BMCs often have a self-signed cert, so usually this has to be true
            accept_invalid_certs: true,
        }
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.accept_invalid_certs
    }

    pub fn transport(&self) -> ReqwestTransport {
        ReqwestTransport {
            http_client: self.http_client.clone(),
        }
    }

    /// Creates a Redfish BMC client for a certain endpoint
    ///
    /// Creating the client will immediately run service discovery, which
    /// also determines the BMC vendor. The pool's certificate setting holds
    /// for every vendor; use [`crate::dell::client_pool`] for iDRACs with
    /// self-signed certificates.
    pub fn create_client(
        &self,
        endpoint: Endpoint,
    ) -> Result<Box<dyn crate::Redfish>, RedfishError> {
        let client = RedfishHttpClient::new(Box::new(self.transport()), endpoint);
        let s = crate::standard::RedfishStandard::new(client)?;
        match s.vendor().as_deref() {
            Some("Dell") => Ok(Box::new(crate::dell::Bmc::new(s)?)),
            _ => Ok(Box::new(s)),
        }
    }
}

/// Blocking reqwest, one shared connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http_client: HttpClient,
}

impl HttpTransport for ReqwestTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RedfishError> {
        let mut req_b = self
            .http_client
            .request(request.method, &request.url)
            .headers(request.headers);
        if !request.query.is_empty() {
            req_b = req_b.query(&request.query);
        }
        if let Some((user, password)) = &request.basic_auth {
            req_b = req_b.basic_auth(user, password.as_ref());
        }
        if let Some(b) = request.body {
            req_b = req_b.body(b);
        }
        let response = req_b.send().map_err(|e| RedfishError::NetworkError {
            url: request.url.clone(),
            source: e,
        })?;
        let status = response.status();
        // read the body even if not status 2XX, because BMCs give useful error messages as JSON
        let body = response.text().map_err(|e| RedfishError::NetworkError {
            url: request.url.clone(),
            source: e,
        })?;
        Ok(HttpResponse { status, body })
    }
}

/// A HTTP client which targets a single BMC
pub struct RedfishHttpClient {
    endpoint: Endpoint,
    base_url: String,
    service_root_url: String,
    transport: Box<dyn HttpTransport>,
}

impl RedfishHttpClient {
    pub fn new(transport: Box<dyn HttpTransport>, endpoint: Endpoint) -> Self {
        let base_url = endpoint.base_url.trim_end_matches('/').to_string();
        Self {
            service_root_url: base_url.clone(),
            base_url,
            endpoint,
            transport,
        }
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn service_root_url(&self) -> &str {
        &self.service_root_url
    }

    /// Relative paths resolve against this from now on.
    pub fn set_service_root(&mut self, versioned_root: &str) {
        self.service_root_url = format!("{}{}", self.base_url, versioned_root)
            .trim_end_matches('/')
            .to_string();
        debug!("Redfish service root: {}", self.service_root_url);
    }

    /// A path starting with `/` is absolute and resolved against the bare
    /// base URL. Anything else is relative to the service root.
    pub fn url(&self, path: Option<&str>) -> String {
        match path {
            None => self.service_root_url.clone(),
            Some(p) => {
                let p = p.trim_end_matches('/');
                if p.starts_with('/') {
                    format!("{}{}", self.base_url, p)
                } else if p.is_empty() {
                    self.service_root_url.clone()
                } else {
                    format!("{}/{}", self.service_root_url, p)
                }
            }
        }
    }

    pub fn get(&self, path: &str) -> Result<serde_json::Value, RedfishError> {
        self.request(Method::GET, Some(path), None, None, Auth::Basic)
    }

    pub fn get_unauth(&self, path: Option<&str>) -> Result<serde_json::Value, RedfishError> {
        self.request(Method::GET, path, None, None, Auth::Anonymous)
    }

    pub fn get_with_query(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<serde_json::Value, RedfishError> {
        self.request(Method::GET, Some(path), Some(query), None, Auth::Basic)
    }

    pub fn post(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, RedfishError> {
        self.request(Method::POST, Some(path), None, Some(body), Auth::Basic)
    }

    pub fn patch(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, RedfishError> {
        self.request(Method::PATCH, Some(path), None, Some(body), Auth::Basic)
    }

    // All the HTTP requests happen from here.
    pub fn request(
        &self,
        method: Method,
        path: Option<&str>,
        query: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
        auth: Auth,
    ) -> Result<serde_json::Value, RedfishError> {
        let url = self.url(path);
        let body_enc = match body {
            Some(b) => Some(serde_json::to_string(b).map_err(|e| {
                RedfishError::JsonSerializeError {
                    url: url.clone(),
                    object_debug: redacted(b),
                    source: e,
                }
            })?),
            None => None,
        };
        let query: Vec<(String, String)> = query
            .unwrap_or_default()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        match body {
            Some(b) => debug!("TX {method} {url} {}", redacted(b)),
            None if !query.is_empty() => debug!("TX {method} {url} {query:?}"),
            None => debug!("TX {method} {url}"),
        }

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        if matches!(method, Method::PATCH | Method::POST | Method::PUT) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        let basic_auth = match (auth, &self.endpoint.user) {
            (Auth::Basic, Some(user)) => Some((user.clone(), self.endpoint.password.clone())),
            _ => None,
        };

        let response = self.transport.execute(HttpRequest {
            method,
            url: url.clone(),
            query,
            headers,
            body: body_enc,
            basic_auth,
        })?;
        if response.body.is_empty() {
            debug!("RX {}", response.status);
        } else {
            debug!("RX {} {}", response.status, response.body);
        }
        check_response(&url, response)
    }
}

// iDRAC can answer 200 for a failed request, with the failure described in
// an "error" object in the body. Other 2XX codes are taken at face value.
fn check_response(url: &str, response: HttpResponse) -> Result<serde_json::Value, RedfishError> {
    let HttpResponse { status, body } = response;
    let parsed = if body.trim().is_empty() {
        None
    } else {
        Some(serde_json::from_str::<serde_json::Value>(&body))
    };

    if status.is_success() && status != StatusCode::OK {
        return json_or_empty(url, body, parsed);
    }
    if status == StatusCode::OK {
        match &parsed {
            Some(Ok(v)) if v.get("error").is_some() => {}
            _ => return json_or_empty(url, body, parsed),
        }
    }
    let error_body = parsed.and_then(Result::ok);
    Err(RedfishError::from_response(status, error_body.as_ref()))
}

fn json_or_empty(
    url: &str,
    body: String,
    parsed: Option<Result<serde_json::Value, serde_json::Error>>,
) -> Result<serde_json::Value, RedfishError> {
    match parsed {
        None => Ok(serde_json::Value::Object(Default::default())),
        Some(Ok(v)) => Ok(v),
        Some(Err(e)) => Err(RedfishError::JsonDeserializeError {
            url: url.to_string(),
            body,
            source: e,
        }),
    }
}

fn redacted(body: &serde_json::Value) -> String {
    let mut body = body.clone();
    if let Some(password) = body.get_mut("Password") {
        *password = serde_json::Value::String("***".to_string());
    }
    body.to_string()
}

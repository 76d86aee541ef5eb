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
use std::fmt;

use reqwest::StatusCode;

use crate::model::error::ErrorResponse;

const UNSPECIFIED_ERROR: &str = "An unspecified BMC request error occurred.";

/// A request the BMC refused, or one we refused to send.
///
/// `status` is set when the error was derived from an HTTP response and is
/// `None` when it was raised locally (validation, cardinality checks, etc).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestError {
    pub status: Option<StatusCode>,
    pub message: String,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "Status {}: {}", status.as_u16(), self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for RequestError {}

#[derive(thiserror::Error, Debug)]
pub enum RedfishError {
    #[error(transparent)]
    Request(#[from] RequestError),

    #[error("Network error talking to BMC at {url}. {source}")]
    NetworkError { url: String, source: reqwest::Error },

    #[error("Could not build HTTP client. {0}")]
    ClientBuild(reqwest::Error),

    #[error("Could not deserialize response from {url}. Body: {body}. {source}")]
    JsonDeserializeError {
        url: String,
        body: String,
        source: serde_json::Error,
    },

    #[error("Could not serialize request body for {url}. Obj: {object_debug}. {source}")]
    JsonSerializeError {
        url: String,
        object_debug: String,
        source: serde_json::Error,
    },

    #[error("Missing key {key} in JSON at {url}")]
    MissingKey { key: String, url: String },

    #[error("Key {key} should be {expected_type} at {url}")]
    InvalidKeyType {
        key: String,
        expected_type: String,
        url: String,
    },
}

impl RedfishError {
    /// A request error with no HTTP round-trip behind it.
    pub fn request(message: impl Into<String>) -> Self {
        RedfishError::Request(RequestError {
            status: None,
            message: message.into(),
        })
    }

    /// A request error built from a BMC response. Vendor extended-error text
    /// is preferred over the plain `message` when the body carries it.
    pub fn from_response(status: StatusCode, body: Option<&serde_json::Value>) -> Self {
        let message = body
            .and_then(|b| serde_json::from_value::<ErrorResponse>(b.clone()).ok())
            .and_then(|e| e.message())
            .unwrap_or_else(|| UNSPECIFIED_ERROR.to_string());
        RedfishError::Request(RequestError {
            status: Some(status),
            message,
        })
    }

    /// HTTP status of a request error, if it came from a response.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RedfishError::Request(e) => e.status,
            _ => None,
        }
    }

    pub fn is_request_error(&self) -> bool {
        matches!(self, RedfishError::Request(_))
    }
}

/// Fatal configuration and usage errors. Unlike [`RedfishError`] these are
/// not expected to be recovered from; the caller should report and exit.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Both BMC login username and password are required if either is provided.")]
    PartialCredentials,

    #[error("Machine {0} not recorded in machine info db.")]
    MachineNotFound(String),

    #[error("Machine info db not as expected for {machine} (bmc data missing/wrong: {detail}).")]
    BmcRecordMissing { machine: String, detail: String },

    #[error("Could not read machine info db {path}. {source}")]
    InventoryRead {
        path: String,
        source: std::io::Error,
    },

    #[error("Could not parse machine info db {path}. {source}")]
    InventoryParse {
        path: String,
        source: serde_json::Error,
    },

    #[error("Could not connect to BMC of {machine}. {source}")]
    Connection {
        machine: String,
        source: RedfishError,
    },
}

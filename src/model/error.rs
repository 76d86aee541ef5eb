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
use serde::Deserialize;

/// Redfish error payload: `{"error": {...}}`.
///
/// iDRAC also sends this with HTTP 200 for some failures.
#[derive(Debug, Deserialize, Clone)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ErrorDetail {
    // Registry id string on iDRAC, but some firmware sends the HTTP status
    pub code: Option<serde_json::Value>,
    pub message: Option<String>,
    // Usually a list, but left loose since firmware is not consistent about it
    #[serde(rename = "@Message.ExtendedInfo")]
    pub extended_info: Option<serde_json::Value>,
}

impl ErrorResponse {
    /// First extended-info message if there is one, else the plain message.
    pub fn message(&self) -> Option<String> {
        let extended = self
            .error
            .extended_info
            .as_ref()
            .and_then(|v| v.as_array())
            .and_then(|list| list.first())
            .and_then(|first| first.get("Message"))
            .and_then(|m| m.as_str());
        extended
            .map(|s| s.to_string())
            .or_else(|| self.error.message.clone())
    }
}

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

// jsonmap.rs
// Helpers for pulling typed values out of Redfish resource documents. The
// resource cache holds raw JSON, so every reader goes through here.

use std::any::type_name;

use serde::de::DeserializeOwned;

use crate::RedfishError;

fn missing_key_error(key: &str, url: &str) -> RedfishError {
    RedfishError::MissingKey {
        key: key.to_string(),
        url: url.to_string(),
    }
}

fn invalid_type_error(key: &str, expected_type: &str, url: &str) -> RedfishError {
    RedfishError::InvalidKeyType {
        key: key.to_string(),
        expected_type: expected_type.to_string(),
        url: url.to_string(),
    }
}

// get_value retrieves a JSON value from a document, returning MissingKey
// error if the key is not found.
pub fn get_value<'a>(
    doc: &'a serde_json::Value,
    key: &str,
    url: &str,
) -> Result<&'a serde_json::Value, RedfishError> {
    doc.get(key).ok_or_else(|| missing_key_error(key, url))
}

// get_str extracts a string value, returning appropriate errors if the key
// is missing or the value is not a string.
pub fn get_str<'a>(doc: &'a serde_json::Value, key: &str, url: &str) -> Result<&'a str, RedfishError> {
    get_value(doc, key, url)?
        .as_str()
        .ok_or_else(|| invalid_type_error(key, "string", url))
}

// decode converts a whole resource document into a model type. The document
// is cloned; cached documents stay untouched.
pub fn decode<T>(doc: &serde_json::Value, url: &str) -> Result<T, RedfishError>
where
    T: DeserializeOwned,
{
    serde_json::from_value::<T>(doc.clone()).map_err(|e| RedfishError::JsonDeserializeError {
        url: url.to_string(),
        body: format!("{} expected. {doc}", type_name::<T>()),
        source: e,
    })
}

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
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::model::ODataId;
use crate::RedfishError;

/// The unversioned `/redfish` document, mapping protocol versions to the
/// root of that version, e.g. `{"v1": "/redfish/v1/"}`.
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
pub struct RedfishVersions {
    #[serde(flatten)]
    pub versions: HashMap<String, String>,
}

impl RedfishVersions {
    pub fn v1(&self, url: &str) -> Result<&str, RedfishError> {
        self.versions
            .get("v1")
            .map(|s| s.as_str())
            .ok_or_else(|| RedfishError::MissingKey {
                key: "v1".to_string(),
                url: url.to_string(),
            })
    }
}

/// https://redfish.dmtf.org/schemas/v1/ServiceRoot.v1_16_0.json
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ServiceRoot {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub product: Option<String>,
    pub redfish_version: Option<String>,
    pub vendor: Option<String>,
    #[serde(rename = "UUID")]
    pub uuid: Option<String>,
    pub oem: Option<HashMap<String, serde_json::Value>>,
    pub account_service: Option<ODataId>,
    pub managers: Option<ODataId>,
    pub systems: Option<ODataId>,
}

impl ServiceRoot {
    /// Vendor provided by Redfish ServiceRoot
    pub fn vendor_string(&self) -> Option<String> {
        // iDRAC before 4.x has no "Vendor" key, only an "Oem" entry keyed by vendor name.
        self.vendor.as_ref().cloned().or_else(|| match &self.oem {
            Some(oem) => oem.keys().next().cloned(),
            None => None,
        })
    }

    /// Probably /redfish/v1/Systems
    pub fn systems_path(&self) -> Result<&str, RedfishError> {
        link(&self.systems, "Systems")
    }

    /// Probably /redfish/v1/Managers
    pub fn managers_path(&self) -> Result<&str, RedfishError> {
        link(&self.managers, "Managers")
    }

    /// Probably /redfish/v1/AccountService
    pub fn account_service_path(&self) -> Result<&str, RedfishError> {
        link(&self.account_service, "AccountService")
    }
}

fn link<'a>(id: &'a Option<ODataId>, key: &str) -> Result<&'a str, RedfishError> {
    id.as_ref()
        .map(|l| l.odata_id.as_str())
        .ok_or_else(|| RedfishError::MissingKey {
            key: key.to_string(),
            url: "service root".to_string(),
        })
}

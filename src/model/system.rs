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
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::RedfishError;

const RESET_ACTION: &str = "#ComputerSystem.Reset";

/// ResetType tokens of the ComputerSystem.Reset action. A BMC advertises
/// which ones it accepts in `ResetType@Redfish.AllowableValues`.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub enum ResetType {
    On,
    ForceOff,
    GracefulShutdown,
    GracefulRestart,
    ForceRestart,
    // Dell also has: PushPowerButton, PowerCycle, and Nmi
    PushPowerButton,
    PowerCycle,
    Nmi,
}

impl fmt::Display for ResetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What a power on/off request did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PowerOutcome {
    /// A ComputerSystem.Reset of this type was posted.
    ResetRequested(ResetType),
    /// Nothing to do. Carries the power state as read.
    AlreadyInState(String),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct ComputerSystem {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub id: Option<String>,
    // Kept as the BMC spells it, "On"/"Off"/"PoweringOn"/...
    pub power_state: Option<String>,
    #[serde(default)]
    pub actions: HashMap<String, serde_json::Value>,
}

/// Where and how to invoke ComputerSystem.Reset on this system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAction {
    pub target: String,
    #[serde(rename = "ResetType@Redfish.AllowableValues", default)]
    pub allowable_values: Vec<String>,
}

impl ResetAction {
    pub fn from_system(system: &ComputerSystem) -> Result<ResetAction, RedfishError> {
        let action = system.actions.get(RESET_ACTION).ok_or_else(|| {
            RedfishError::request("Computer System doesn't provide a Reset action")
        })?;
        serde_json::from_value(action.clone()).map_err(|_| RedfishError::InvalidKeyType {
            key: RESET_ACTION.to_string(),
            expected_type: "ResetAction".to_string(),
            url: system.odata_id.clone().unwrap_or_default(),
        })
    }

    pub fn supports(&self, reset_type: ResetType) -> bool {
        let token = reset_type.to_string();
        self.allowable_values.iter().any(|v| *v == token)
    }
}

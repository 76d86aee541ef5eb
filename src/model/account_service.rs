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
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::model::ODataId;
use crate::RedfishError;

#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(rename_all = "PascalCase")]
pub struct AccountService {
    #[serde(rename = "@odata.id")]
    pub odata_id: Option<String>,
    pub accounts: Option<ODataId>,
}

impl AccountService {
    /// Probably /redfish/v1/AccountService/Accounts
    pub fn accounts_path(&self) -> Result<&str, RedfishError> {
        self.accounts
            .as_ref()
            .map(|a| a.odata_id.as_str())
            .ok_or_else(|| RedfishError::MissingKey {
                key: "Accounts".to_string(),
                url: self.odata_id.clone().unwrap_or_default(),
            })
    }
}

/// One slot of the Accounts collection. An empty `username` means the slot
/// is free.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, Eq, PartialEq, Default)]
#[serde(rename_all = "PascalCase")]
pub struct ManagerAccount {
    #[serde(rename = "@odata.id")]
    pub odata_id: String,

    pub id: String,

    #[serde(rename = "UserName", default)]
    pub username: String,

    // A RoleId converted to string
    pub role_id: Option<String>,

    pub name: Option<String>,
    pub description: Option<String>,
    pub enabled: Option<bool>,
    pub locked: Option<bool>,
}

impl ManagerAccount {
    pub fn is_empty_slot(&self) -> bool {
        self.username.is_empty()
    }

    /// Numeric slot id. iDRAC uses "1".."16".
    pub fn slot_id(&self) -> Result<u32, RedfishError> {
        self.id.parse().map_err(|_| RedfishError::InvalidKeyType {
            key: "Id".to_string(),
            expected_type: "integer string".to_string(),
            url: self.odata_id.clone(),
        })
    }
}

/// PATCH body for an account slot. Only the fields that are set go on the
/// wire.
#[serde_with::skip_serializing_none]
#[derive(Serialize, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct AccountUpdate {
    #[serde(rename = "UserName")]
    pub username: Option<String>,
    pub password: Option<String>,
    pub enabled: Option<bool>,
    pub role_id: Option<AccountRole>,
}

impl fmt::Debug for AccountUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountUpdate")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("enabled", &self.enabled)
            .field("role_id", &self.role_id)
            .finish()
    }
}

/// Account roles. Parsed from the lower-case tokens used on the command line
/// and sent as the Redfish RoleId.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountRole {
    Administrator,
    Operator,
    ReadOnly,
    #[default]
    None,
}

impl FromStr for AccountRole {
    type Err = RedfishError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "administrator" => Ok(AccountRole::Administrator),
            "operator" => Ok(AccountRole::Operator),
            "readonly" => Ok(AccountRole::ReadOnly),
            "none" => Ok(AccountRole::None),
            _ => Err(RedfishError::request(format!(
                "Account role \"{s}\" not recognized."
            ))),
        }
    }
}

impl fmt::Display for AccountRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

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

use crate::{
    model::service_root::ServiceRoot,
    network::{Endpoint, HttpTransport, RedfishClientPool, RedfishHttpClient},
    standard::RedfishStandard,
    ManagerAccount, PowerOutcome, Redfish, RedfishError, ResetType,
};

/// Dell iDRAC. Everything we use is plain Redfish; what is Dell about it is
/// that the service is HTTPS only and fronted by a self-signed certificate.
pub struct Bmc {
    s: RedfishStandard,
}

impl Bmc {
    pub fn new(s: RedfishStandard) -> Result<Bmc, RedfishError> {
        Ok(Bmc { s })
    }

    /// Connect to the iDRAC at `hostname` and run service discovery.
    pub fn connect(
        transport: Box<dyn HttpTransport>,
        hostname: &str,
        username: &str,
        password: &str,
    ) -> Result<Bmc, RedfishError> {
        let endpoint = Endpoint {
            base_url: base_url(hostname),
            user: Some(username.to_string()),
            password: Some(password.to_string()),
        };
        Bmc::new(RedfishStandard::new(RedfishHttpClient::new(
            transport, endpoint,
        ))?)
    }

    pub fn standard(&self) -> &RedfishStandard {
        &self.s
    }

    pub fn standard_mut(&mut self) -> &mut RedfishStandard {
        &mut self.s
    }

    pub fn into_standard(self) -> RedfishStandard {
        self.s
    }
}

/// Connection pool for iDRACs. Always accepts invalid certificates since
/// lab iDRACs present self-signed ones.
pub fn client_pool() -> Result<RedfishClientPool, RedfishError> {
    RedfishClientPool::builder().build()
}

/// iDRAC's Redfish service only answers on https.
pub fn base_url(hostname: &str) -> String {
    format!("https://{hostname}")
}

impl Redfish for Bmc {
    fn get_service_root(&self) -> &ServiceRoot {
        self.s.get_service_root()
    }

    fn get_system(&mut self) -> Result<serde_json::Value, RedfishError> {
        self.s.get_system()
    }

    fn get_power_state(&mut self) -> Result<String, RedfishError> {
        self.s.get_power_state()
    }

    fn system_power_on(&mut self) -> Result<PowerOutcome, RedfishError> {
        self.s.system_power_on()
    }

    fn system_power_off(&mut self) -> Result<PowerOutcome, RedfishError> {
        self.s.system_power_off()
    }

    fn system_reset(&mut self, reset_type: ResetType) -> Result<(), RedfishError> {
        self.s.system_reset(reset_type)
    }

    fn get_all_accounts(&mut self) -> Result<HashMap<String, ManagerAccount>, RedfishError> {
        self.s.get_all_accounts()
    }

    fn get_account(&mut self, user_name: &str) -> Result<Option<ManagerAccount>, RedfishError> {
        self.s.get_account(user_name)
    }

    fn create_account(
        &mut self,
        user_name: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError> {
        self.s.create_account(user_name, password, role)
    }

    fn delete_account(&mut self, user_name: &str) -> Result<(), RedfishError> {
        self.s.delete_account(user_name)
    }

    fn set_account_role(
        &mut self,
        user_name: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError> {
        self.s.set_account_role(user_name, role)
    }

    fn set_account_password(
        &mut self,
        user_name: &str,
        password: &str,
    ) -> Result<(), RedfishError> {
        self.s.set_account_password(user_name, password)
    }
}

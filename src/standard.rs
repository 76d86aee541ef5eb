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

use serde_json::json;
use tracing::{debug, info, trace};

use crate::account::{self, AccountScan, FullScan, ScanQuery, SlotPolicy};
use crate::cache::ResourceCache;
use crate::jsonmap;
use crate::model::account_service::{AccountService, AccountUpdate};
use crate::model::service_root::{RedfishVersions, ServiceRoot};
use crate::model::system::{ComputerSystem, PowerOutcome};
use crate::model::{AccountRole, Collection, ManagerAccount, ResetAction, ResetType};
use crate::network::{RedfishHttpClient, REDFISH_DISCOVERY};
use crate::{Redfish, RedfishError};

/// The only account automation may never delete.
const PROTECTED_ACCOUNT: &str = "root";

/// The calls that use the Redfish standard without any OEM extensions.
pub struct RedfishStandard {
    pub client: RedfishHttpClient,
    service_root: ServiceRoot,
    resources: ResourceCache,
    system_id: Option<String>,
    slot_policy: Box<dyn SlotPolicy>,
}

impl Redfish for RedfishStandard {
    fn get_service_root(&self) -> &ServiceRoot {
        &self.service_root
    }

    fn get_system(&mut self) -> Result<serde_json::Value, RedfishError> {
        let path = self.this_system_id()?;
        self.get_resource(&path)
    }

    fn get_power_state(&mut self) -> Result<String, RedfishError> {
        let path = self.this_system_id()?;
        let system = self.get_resource(&path)?;
        Ok(jsonmap::get_str(&system, "PowerState", &path)?.to_string())
    }

    fn system_power_on(&mut self) -> Result<PowerOutcome, RedfishError> {
        debug!("Processing system power-on request.");
        let power_state = self.get_power_state()?;
        debug!("Current power state: {power_state}");
        if power_state.eq_ignore_ascii_case("on") {
            info!("System was already powered ON.");
            return Ok(PowerOutcome::AlreadyInState(power_state));
        }
        self.system_reset(ResetType::On)?;
        Ok(PowerOutcome::ResetRequested(ResetType::On))
    }

    fn system_power_off(&mut self) -> Result<PowerOutcome, RedfishError> {
        debug!("Processing system power-off request.");
        let power_state = self.get_power_state()?;
        debug!("Current power state: {power_state}");
        if power_state.eq_ignore_ascii_case("off") {
            info!("System was already powered OFF.");
            return Ok(PowerOutcome::AlreadyInState(power_state));
        }
        self.system_reset(ResetType::ForceOff)?;
        Ok(PowerOutcome::ResetRequested(ResetType::ForceOff))
    }

    fn system_reset(&mut self, reset_type: ResetType) -> Result<(), RedfishError> {
        let path = self.this_system_id()?;
        let system: ComputerSystem = jsonmap::decode(&self.get_resource(&path)?, &path)?;
        let action = ResetAction::from_system(&system)?;
        if !action.supports(reset_type) {
            return Err(RedfishError::request(format!(
                "Computer System doesn't support Reset action type {reset_type}"
            )));
        }

        info!("Resetting system (type: {reset_type})");
        debug!("System Reset - Action Path: {}", action.target);
        let result = self
            .client
            .post(&action.target, &json!({ "ResetType": reset_type }));
        // Power state is part of the system resource
        self.resources.invalidate(&path);
        result.map(|_| ())
    }

    fn get_all_accounts(&mut self) -> Result<HashMap<String, ManagerAccount>, RedfishError> {
        debug!("Getting all defined BMC accounts.");
        Ok(self.scan_accounts(ScanQuery::default())?.accounts)
    }

    fn get_account(&mut self, user_name: &str) -> Result<Option<ManagerAccount>, RedfishError> {
        debug!("Getting BMC account for user \"{user_name}\"");
        let found = self
            .scan_accounts(ScanQuery {
                want_user_name: Some(user_name),
                find_empty_slot: false,
            })?
            .wanted;
        match &found {
            Some(acct) => trace!("{acct:#?}"),
            None => debug!("BMC account for user \"{user_name}\" not found."),
        }
        Ok(found)
    }

    fn create_account(
        &mut self,
        user_name: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError> {
        let role = map_role(role)?;
        info!("Creating BMC account for user \"{user_name}\" as role {role}.");

        // One pass both checks the user is new and finds a free slot for it.
        let AccountScan {
            wanted, empty_slot, ..
        } = self.scan_accounts(ScanQuery {
            want_user_name: Some(user_name),
            find_empty_slot: true,
        })?;
        if wanted.is_some() {
            return Err(RedfishError::request(format!(
                "Account \"{user_name}\" already exists."
            )));
        }
        let Some(slot) = empty_slot else {
            return Err(RedfishError::request(format!(
                "No room available for new account \"{user_name}\"."
            )));
        };

        debug!("Will create new account using slot at id {}", slot.id);
        self.update_account(
            &slot.odata_id,
            AccountUpdate {
                username: Some(user_name.to_string()),
                password: Some(password.to_string()),
                enabled: Some(true),
                role_id: Some(role),
            },
        )
    }

    fn delete_account(&mut self, user_name: &str) -> Result<(), RedfishError> {
        if user_name == PROTECTED_ACCOUNT {
            return Err(RedfishError::request(format!(
                "Refusing to delete account \"{user_name}\" via automation."
            )));
        }
        info!("Deleting BMC account for user \"{user_name}\".");
        let account = self.existing_account(user_name)?;

        // iDRAC 9 wants the account disabled before the user name can be
        // blanked, in separate requests. The password must be left alone:
        // blanking it gets a 400 "The specified value is not allowed to be
        // configured if the user name or password is blank."
        self.update_account(
            &account.odata_id,
            AccountUpdate {
                enabled: Some(false),
                role_id: Some(AccountRole::None),
                ..Default::default()
            },
        )?;
        self.update_account(
            &account.odata_id,
            AccountUpdate {
                username: Some(String::new()),
                ..Default::default()
            },
        )
    }

    fn set_account_role(
        &mut self,
        user_name: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError> {
        let role = map_role(role)?;
        info!("Setting BMC account for user \"{user_name}\" to have role {role}.");
        let account = self.existing_account(user_name)?;
        self.update_account(
            &account.odata_id,
            AccountUpdate {
                role_id: Some(role),
                ..Default::default()
            },
        )
    }

    fn set_account_password(
        &mut self,
        user_name: &str,
        password: &str,
    ) -> Result<(), RedfishError> {
        info!("Setting BMC account password for user \"{user_name}\".");
        let account = self.existing_account(user_name)?;
        self.update_account(
            &account.odata_id,
            AccountUpdate {
                password: Some(password.to_string()),
                ..Default::default()
            },
        )
    }
}

impl RedfishStandard {
    //
    // PUBLIC
    //

    /// Create and setup a connection to BMC.
    /// Issues two unauthenticated HTTP calls: version discovery, then the
    /// versioned service root.
    pub fn new(mut client: RedfishHttpClient) -> Result<Self, RedfishError> {
        let versions_url = client.url(Some(REDFISH_DISCOVERY));
        let versions: RedfishVersions =
            jsonmap::decode(&client.get_unauth(Some(REDFISH_DISCOVERY))?, &versions_url)?;
        client.set_service_root(versions.v1(&versions_url)?);

        let root_doc = client.get_unauth(None)?;
        trace!(
            "Service root resource:\n{}",
            serde_json::to_string_pretty(&root_doc).unwrap_or_default()
        );
        let service_root: ServiceRoot = jsonmap::decode(&root_doc, client.service_root_url())?;
        debug!(
            "BMC Vendor: {}",
            service_root.vendor_string().as_deref().unwrap_or("Unknown")
        );

        Ok(Self {
            client,
            service_root,
            resources: ResourceCache::new(),
            system_id: None,
            slot_policy: Box::new(FullScan::default()),
        })
    }

    /// Replace the rule for which empty account slots may be reused.
    pub fn with_slot_policy(mut self, policy: Box<dyn SlotPolicy>) -> Self {
        self.slot_policy = policy;
        self
    }

    pub fn vendor(&self) -> Option<String> {
        self.service_root.vendor_string()
    }

    pub fn resources(&self) -> &ResourceCache {
        &self.resources
    }

    /// Cached resource, fetched on first use.
    pub fn get_resource(&mut self, path: &str) -> Result<serde_json::Value, RedfishError> {
        cached_get(&self.client, &mut self.resources, path)
    }

    /// PATCH a resource. Its cache entry is dropped whether or not the BMC
    /// accepted the change.
    pub fn update_resource(
        &mut self,
        path: &str,
        update: &serde_json::Value,
    ) -> Result<serde_json::Value, RedfishError> {
        let result = self.client.patch(path, update);
        self.resources.invalidate(path);
        result
    }

    /// Collections are always fetched fresh. `expand_levels` adds
    /// `$expand=.($levels=N)`, which iDRAC gets wrong for Accounts.
    pub fn get_collection(
        &self,
        path: &str,
        expand_levels: Option<u32>,
    ) -> Result<Collection, RedfishError> {
        let doc = match expand_levels {
            Some(n) => {
                let levels = format!(".($levels={n})");
                self.client
                    .get_with_query(path, &[("$expand", levels.as_str())])?
            }
            None => self.client.get(path)?,
        };
        jsonmap::decode(&doc, path)
    }

    pub fn systems_collection_path(&self) -> Result<&str, RedfishError> {
        self.service_root.systems_path()
    }

    pub fn managers_collection_path(&self) -> Result<&str, RedfishError> {
        self.service_root.managers_path()
    }

    pub fn account_service_path(&self) -> Result<&str, RedfishError> {
        self.service_root.account_service_path()
    }

    pub fn accounts_collection_path(&mut self) -> Result<String, RedfishError> {
        let path = self.account_service_path()?.to_string();
        let service: AccountService = jsonmap::decode(&self.get_resource(&path)?, &path)?;
        Ok(service.accounts_path()?.to_string())
    }

    /// Resource path of the single Computer System behind this BMC. Looked
    /// up once, then remembered.
    pub fn this_system_id(&mut self) -> Result<String, RedfishError> {
        if let Some(id) = &self.system_id {
            return Ok(id.clone());
        }

        // A BMC manages exactly one system. Anything else is not a BMC we
        // know how to drive.
        let systems = self.get_collection(self.systems_collection_path()?, None)?;
        let id = match systems.members.as_slice() {
            [only] => only.odata_id.clone(),
            [] => return Err(RedfishError::request("No Computer Systems found.")),
            _ => return Err(RedfishError::request("Multiple Computer Systems found.")),
        };
        debug!("Determined this system id: {id}");
        self.system_id = Some(id.clone());
        Ok(id)
    }

    //
    // PRIVATE
    //

    fn scan_accounts(&mut self, query: ScanQuery<'_>) -> Result<AccountScan, RedfishError> {
        let col_path = self.accounts_collection_path()?;
        // No $expand: iDRAC answers 404 about the last member.
        let members: Vec<String> = self
            .get_collection(&col_path, None)?
            .member_paths()
            .map(str::to_string)
            .collect();

        let Self {
            client,
            resources,
            slot_policy,
            ..
        } = self;
        account::scan(&members, query, &**slot_policy, |path| {
            jsonmap::decode(&cached_get(client, resources, path)?, path)
        })
    }

    fn existing_account(&mut self, user_name: &str) -> Result<ManagerAccount, RedfishError> {
        self.get_account(user_name)?.ok_or_else(|| {
            RedfishError::request(format!("Account \"{user_name}\" doesn't exist."))
        })
    }

    fn update_account(&mut self, path: &str, update: AccountUpdate) -> Result<(), RedfishError> {
        let body = serde_json::to_value(&update).map_err(|e| RedfishError::JsonSerializeError {
            url: path.to_string(),
            object_debug: format!("{update:?}"),
            source: e,
        })?;
        self.update_resource(path, &body).map(|_| ())
    }
}

fn cached_get(
    client: &RedfishHttpClient,
    resources: &mut ResourceCache,
    path: &str,
) -> Result<serde_json::Value, RedfishError> {
    if let Some(doc) = resources.get(path) {
        return Ok(doc.clone());
    }
    let doc = client.get(path)?;
    resources.put(path, doc.clone());
    Ok(doc)
}

fn map_role(role: Option<&str>) -> Result<AccountRole, RedfishError> {
    role.unwrap_or("none").parse()
}

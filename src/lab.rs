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
//! Lab-facing facade: find a machine's BMC in the machine inventory, log in
//! with the right credentials, and offer the operations lab tooling is
//! allowed to use.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use crate::network::HttpTransport;
use crate::{dell, ConfigError, ManagerAccount, PowerOutcome, Redfish, RedfishError};

/// Environment variable naming the machine inventory file.
pub const INVENTORY_ENV: &str = "LAB_MACHINE_INVENTORY";
const DEFAULT_INVENTORY: &str = "machines.json";

/// Standard BMC users recorded in the machine inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StdUser {
    Default,
    Root,
    Mgmt,
    Admin,
}

impl StdUser {
    pub fn as_str(&self) -> &'static str {
        match self {
            StdUser::Default => "default",
            StdUser::Root => "root",
            StdUser::Mgmt => "mgmt",
            StdUser::Admin => "admin",
        }
    }
}

impl fmt::Display for StdUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BMC login flags shared by every lab tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginOptions {
    pub username: Option<String>,
    pub password: Option<String>,
    pub use_default_creds: bool,
    pub as_admin: bool,
    pub as_root: bool,
    pub as_mgmt: bool,
}

impl LoginOptions {
    pub fn add_argument_definitions(opts: &mut getopts::Options) {
        opts.optopt("u", "username", "BMC login username", "USER");
        opts.optopt("p", "password", "BMC login password", "PASS");
        opts.optflag(
            "D",
            "use-default-creds",
            "Log in with the machine's default BMC credentials",
        );
        opts.optflag("A", "as-admin", "Log in as the standard admin user");
        opts.optflag("R", "as-root", "Log in as the standard root user");
        opts.optflag("M", "as-mgmt", "Log in as the standard mgmt user");
    }

    pub fn from_matches(matches: &getopts::Matches) -> LoginOptions {
        LoginOptions {
            username: matches.opt_str("u"),
            password: matches.opt_str("p"),
            use_default_creds: matches.opt_present("D"),
            as_admin: matches.opt_present("A"),
            as_root: matches.opt_present("R"),
            as_mgmt: matches.opt_present("M"),
        }
    }

    /// The standard user selected by the flags, first match wins.
    pub fn std_user(&self, default_to_admin: bool) -> Option<StdUser> {
        if self.use_default_creds {
            Some(StdUser::Default)
        } else if self.as_root {
            Some(StdUser::Root)
        } else if self.as_mgmt {
            Some(StdUser::Mgmt)
        } else if self.as_admin || default_to_admin {
            Some(StdUser::Admin)
        } else {
            None
        }
    }
}

/// Where a machine's BMC is and how to log in to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BmcInfo {
    pub address: String,
    pub username: String,
    pub password: String,
}

/// Lookup of machines by name. `std_user` picks a credential profile; `None`
/// means the machine's default standard user.
pub trait MachineInventory {
    fn lookup(&self, machine: &str, std_user: Option<StdUser>) -> Result<BmcInfo, ConfigError>;
}

#[derive(Debug, Clone, Deserialize)]
struct Credentials {
    username: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BmcRecord {
    address: Option<String>,
    username: Option<String>,
    password: Option<String>,
    #[serde(default)]
    users: HashMap<String, Credentials>,
}

#[derive(Debug, Clone, Deserialize)]
struct MachineEntry {
    bmc: Option<BmcRecord>,
}

/// Machine inventory kept in a JSON file.
#[derive(Debug, Clone, Deserialize)]
pub struct JsonInventory {
    machines: HashMap<String, MachineEntry>,
}

impl JsonInventory {
    /// `--inventory` if given, else $LAB_MACHINE_INVENTORY, else ./machines.json
    pub fn default_path(explicit: Option<&str>) -> PathBuf {
        explicit
            .map(PathBuf::from)
            .or_else(|| std::env::var_os(INVENTORY_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INVENTORY))
    }

    pub fn load(path: &Path) -> Result<JsonInventory, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|e| ConfigError::InventoryRead {
            path: path.display().to_string(),
            source: e,
        })?;
        JsonInventory::parse(&data, &path.display().to_string())
    }

    pub fn parse(data: &str, path: &str) -> Result<JsonInventory, ConfigError> {
        serde_json::from_str(data).map_err(|e| ConfigError::InventoryParse {
            path: path.to_string(),
            source: e,
        })
    }
}

impl MachineInventory for JsonInventory {
    fn lookup(&self, machine: &str, std_user: Option<StdUser>) -> Result<BmcInfo, ConfigError> {
        let entry = self
            .machines
            .get(machine)
            .ok_or_else(|| ConfigError::MachineNotFound(machine.to_string()))?;
        let missing = |detail: &str| ConfigError::BmcRecordMissing {
            machine: machine.to_string(),
            detail: detail.to_string(),
        };
        let bmc = entry.bmc.as_ref().ok_or_else(|| missing("bmc"))?;

        let profile = std_user.and_then(|u| bmc.users.get(u.as_str()));
        let (username, password) = match profile {
            Some(c) => (c.username.clone(), c.password.clone()),
            None => (bmc.username.clone(), bmc.password.clone()),
        };
        Ok(BmcInfo {
            address: bmc.address.clone().ok_or_else(|| missing("address"))?,
            username: username.ok_or_else(|| missing("username"))?,
            password: password.ok_or_else(|| missing("password"))?,
        })
    }
}

/// What lab tooling may do to a BMC. Setting account roles is deliberately
/// left out.
pub trait LabBmc {
    fn get_power_state(&mut self) -> Result<String, RedfishError>;
    fn system_power_on(&mut self) -> Result<PowerOutcome, RedfishError>;
    fn system_power_off(&mut self) -> Result<PowerOutcome, RedfishError>;
    fn get_all_accounts(&mut self) -> Result<HashMap<String, ManagerAccount>, RedfishError>;
    fn get_account(&mut self, user_name: &str) -> Result<Option<ManagerAccount>, RedfishError>;
    fn create_account(
        &mut self,
        user_name: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError>;
    fn delete_account(&mut self, user_name: &str) -> Result<(), RedfishError>;
    fn set_account_password(&mut self, user_name: &str, password: &str)
        -> Result<(), RedfishError>;
}

/// A logged-in connection to the BMC of a named lab machine.
pub struct LabBmcConnection {
    machine_name: String,
    host: String,
    username: String,
    connection: Box<dyn Redfish>,
}

impl fmt::Debug for LabBmcConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabBmcConnection")
            .field("machine_name", &self.machine_name)
            .field("host", &self.host)
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl LabBmcConnection {
    /// Connect using the login flags a lab tool was given.
    pub fn create_connection(
        machine_name: &str,
        login: &LoginOptions,
        default_to_admin: bool,
        inventory: &dyn MachineInventory,
    ) -> Result<LabBmcConnection, ConfigError> {
        let for_std_user = login.std_user(default_to_admin);
        match (&login.username, for_std_user) {
            (Some(user), _) => {
                debug!("Creating connection to {machine_name} as specified user \"{user}\".")
            }
            (None, Some(std_user)) => debug!(
                "Creating connection to {machine_name} as standard user \"{std_user}\"."
            ),
            (None, None) => {
                debug!("Creating connection to {machine_name} using default standard user.")
            }
        }
        let pool = dell::client_pool().map_err(|e| ConfigError::Connection {
            machine: machine_name.to_string(),
            source: e,
        })?;
        LabBmcConnection::new(
            machine_name,
            login.username.as_deref(),
            login.password.as_deref(),
            for_std_user,
            inventory,
            Box::new(pool.transport()),
        )
    }

    /// Username and password override the inventory's credentials, and must
    /// come together.
    pub fn new(
        machine_name: &str,
        username: Option<&str>,
        password: Option<&str>,
        for_std_user: Option<StdUser>,
        inventory: &dyn MachineInventory,
        transport: Box<dyn HttpTransport>,
    ) -> Result<LabBmcConnection, ConfigError> {
        if username.is_some() != password.is_some() {
            return Err(ConfigError::PartialCredentials);
        }
        let bmc = inventory.lookup(machine_name, for_std_user)?;
        let username = username.map(str::to_string).unwrap_or(bmc.username);
        let password = password.map(str::to_string).unwrap_or(bmc.password);

        let connection = dell::Bmc::connect(transport, &bmc.address, &username, &password)
            .map_err(|e| ConfigError::Connection {
                machine: machine_name.to_string(),
                source: e,
            })?;
        Ok(LabBmcConnection {
            machine_name: machine_name.to_string(),
            host: bmc.address,
            username,
            connection: Box::new(connection),
        })
    }

    pub fn machine_name(&self) -> &str {
        &self.machine_name
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl LabBmc for LabBmcConnection {
    fn get_power_state(&mut self) -> Result<String, RedfishError> {
        self.connection.get_power_state()
    }

    fn system_power_on(&mut self) -> Result<PowerOutcome, RedfishError> {
        self.connection.system_power_on()
    }

    fn system_power_off(&mut self) -> Result<PowerOutcome, RedfishError> {
        self.connection.system_power_off()
    }

    fn get_all_accounts(&mut self) -> Result<HashMap<String, ManagerAccount>, RedfishError> {
        self.connection.get_all_accounts()
    }

    fn get_account(&mut self, user_name: &str) -> Result<Option<ManagerAccount>, RedfishError> {
        self.connection.get_account(user_name)
    }

    fn create_account(
        &mut self,
        user_name: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError> {
        self.connection.create_account(user_name, password, role)
    }

    fn delete_account(&mut self, user_name: &str) -> Result<(), RedfishError> {
        self.connection.delete_account(user_name)
    }

    fn set_account_password(
        &mut self,
        user_name: &str,
        password: &str,
    ) -> Result<(), RedfishError> {
        self.connection.set_account_password(user_name, password)
    }
}

/*
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

pub mod account;
pub mod cache;
pub mod dell;
mod error;
pub mod jsonmap;
pub mod lab;
pub mod model;
pub mod network;
pub mod standard;

pub use account::{ContiguousSlots, FullScan, SlotPolicy};
pub use error::{ConfigError, RedfishError, RequestError};
pub use lab::{LabBmc, LabBmcConnection, LoginOptions, StdUser};
pub use model::service_root::ServiceRoot;
pub use model::system::PowerOutcome;
pub use model::{AccountRole, ManagerAccount, ResetAction, ResetType};
pub use network::{
    Endpoint, HttpRequest, HttpResponse, HttpTransport, RedfishClientPool,
    RedfishClientPoolBuilder, REDFISH_DISCOVERY,
};

/// Interface to a BMC Redfish server. All calls except `get_service_root`
/// may issue one or more HTTP requests.
///
/// A connection caches resources and is not meant to be shared between
/// threads. Callers wanting concurrency use one connection per worker.
pub trait Redfish: Send {
    /// Service root document fetched when the connection was made.
    fn get_service_root(&self) -> &ServiceRoot;

    /// The one Computer System this BMC manages, as a raw resource document.
    fn get_system(&mut self) -> Result<serde_json::Value, RedfishError>;

    /// Is this thing even on? Returned as the BMC spells it ("On", "Off", ...).
    fn get_power_state(&mut self) -> Result<String, RedfishError>;

    /// Power on unless already on.
    fn system_power_on(&mut self) -> Result<PowerOutcome, RedfishError>;

    /// Force power off unless already off.
    fn system_power_off(&mut self) -> Result<PowerOutcome, RedfishError>;

    /// Invoke ComputerSystem.Reset with the given type, if the system
    /// advertises it.
    fn system_reset(&mut self, reset_type: ResetType) -> Result<(), RedfishError>;

    /// List current user accounts, by user name
    fn get_all_accounts(&mut self) -> Result<HashMap<String, ManagerAccount>, RedfishError>;

    /// `None` if there is no such account.
    fn get_account(&mut self, user_name: &str) -> Result<Option<ManagerAccount>, RedfishError>;

    /// Create a new user in the first free account slot.
    /// `role` is one of administrator, operator, readonly or none (the default).
    fn create_account(
        &mut self,
        user_name: &str,
        password: &str,
        role: Option<&str>,
    ) -> Result<(), RedfishError>;

    /// Delete a BMC user. Never deletes "root".
    fn delete_account(&mut self, user_name: &str) -> Result<(), RedfishError>;

    fn set_account_role(&mut self, user_name: &str, role: Option<&str>)
        -> Result<(), RedfishError>;

    fn set_account_password(&mut self, user_name: &str, password: &str)
        -> Result<(), RedfishError>;
}

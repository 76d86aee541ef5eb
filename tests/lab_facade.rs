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
//! The lab facade: inventory lookup, credential selection and the narrowed
//! operation set.

mod common;

use common::{account_path, FakeIdrac, HOST};
use lab_redfish::lab::{JsonInventory, MachineInventory};
use lab_redfish::{ConfigError, LabBmc, LabBmcConnection, PowerOutcome, ResetType, StdUser};
use reqwest::Method;
use serde_json::json;

fn inventory() -> JsonInventory {
    let doc = json!({
        "machines": {
            "node07": {
                "bmc": {
                    "address": HOST,
                    "username": "labuser",
                    "password": "labpass",
                    "users": {
                        "root": {"username": "root", "password": "calvin"},
                        "admin": {"username": "admin", "password": "adminpass"},
                        "default": {"username": "root", "password": "factory"}
                    }
                }
            }
        }
    });
    JsonInventory::parse(&doc.to_string(), "machines.json").unwrap()
}

fn connect(
    fake: &FakeIdrac,
    username: Option<&str>,
    password: Option<&str>,
    std_user: Option<StdUser>,
) -> Result<LabBmcConnection, ConfigError> {
    LabBmcConnection::new(
        "node07",
        username,
        password,
        std_user,
        &inventory(),
        fake.transport(),
    )
}

fn logged_in_as(fake: &FakeIdrac) -> Vec<Option<String>> {
    fake.requests().into_iter().map(|r| r.user).collect()
}

#[test]
fn test_connect_as_std_user() -> Result<(), anyhow::Error> {
    let fake = FakeIdrac::new();
    let mut bmc = connect(&fake, None, None, Some(StdUser::Admin))?;
    assert_eq!(bmc.machine_name(), "node07");
    assert_eq!(bmc.host(), HOST);
    assert_eq!(bmc.username(), "admin");

    fake.clear_requests();
    bmc.get_power_state()?;
    assert!(logged_in_as(&fake)
        .iter()
        .all(|u| u.as_deref() == Some("admin")));
    Ok(())
}

#[test]
fn test_connect_default_std_user() -> Result<(), anyhow::Error> {
    let fake = FakeIdrac::new();
    let bmc = connect(&fake, None, None, None)?;
    assert_eq!(bmc.username(), "labuser");
    let bmc = connect(&fake, None, None, Some(StdUser::Default))?;
    assert_eq!(bmc.username(), "root");
    Ok(())
}

#[test]
fn test_explicit_credentials_win() -> Result<(), anyhow::Error> {
    let fake = FakeIdrac::new();
    let mut bmc = connect(&fake, Some("ops"), Some("opspass"), Some(StdUser::Root))?;
    assert_eq!(bmc.username(), "ops");
    // Address still comes from the inventory
    assert_eq!(bmc.host(), HOST);

    fake.clear_requests();
    bmc.get_all_accounts()?;
    assert!(logged_in_as(&fake)
        .iter()
        .all(|u| u.as_deref() == Some("ops")));
    Ok(())
}

#[test]
fn test_partial_credentials_make_no_request() {
    let fake = FakeIdrac::new();
    let err = connect(&fake, Some("ops"), None, None).unwrap_err();
    assert!(matches!(err, ConfigError::PartialCredentials));
    assert!(fake.requests().is_empty());
}

#[test]
fn test_discovery_failure_is_fatal() {
    let fake = FakeIdrac::new();
    fake.respond_once(Method::GET, "/redfish", 500, json!({}));
    let err = connect(&fake, None, None, None).unwrap_err();
    match err {
        ConfigError::Connection { machine, source } => {
            assert_eq!(machine, "node07");
            assert!(source.is_request_error());
        }
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn test_lab_operations() -> Result<(), anyhow::Error> {
    let fake = FakeIdrac::new().with_power_state("On");
    let mut bmc = connect(&fake, None, None, Some(StdUser::Root))?;

    assert_eq!(bmc.get_power_state()?, "On");
    assert_eq!(
        bmc.system_power_off()?,
        PowerOutcome::ResetRequested(ResetType::ForceOff)
    );
    assert_eq!(bmc.get_power_state()?, "Off");
    assert!(matches!(
        bmc.system_power_off()?,
        PowerOutcome::AlreadyInState(_)
    ));

    bmc.create_account("alice", "pw", Some("operator"))?;
    assert_eq!(bmc.get_account("alice")?.map(|a| a.id).as_deref(), Some("3"));
    bmc.set_account_password("alice", "pw2")?;
    assert_eq!(fake.password(3).as_deref(), Some("pw2"));
    assert_eq!(bmc.get_all_accounts()?.len(), 2);

    bmc.delete_account("alice")?;
    assert!(bmc.get_account("alice")?.is_none());
    assert_eq!(fake.account(3)["UserName"], "");
    assert!(bmc.delete_account("root").is_err());
    assert_eq!(fake.account(2)["UserName"], "root");
    assert!(fake
        .requests_with(Method::PATCH)
        .iter()
        .all(|r| r.path == account_path(3)));
    Ok(())
}

#[test]
fn test_inventory_trait_object() -> Result<(), anyhow::Error> {
    let inv = inventory();
    let inv: &dyn MachineInventory = &inv;
    let info = inv.lookup("node07", Some(StdUser::Mgmt))?;
    assert_eq!(info.username, "labuser");
    Ok(())
}

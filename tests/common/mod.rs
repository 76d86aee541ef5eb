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
//! In-memory iDRAC for driving the client without hardware. Serves the
//! resources the client navigates, applies account PATCHes and reset POSTs
//! to its own state, records every request, and can be told to answer the
//! next matching request with a canned response instead.

#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use lab_redfish::{dell, HttpRequest, HttpResponse, HttpTransport, RedfishError};
use reqwest::{Method, StatusCode};
use serde_json::{json, Value};

pub const HOST: &str = "idrac-node07.lab";
pub const BASE: &str = "https://idrac-node07.lab";
pub const SYSTEM: &str = "/redfish/v1/Systems/System.Embedded.1";
pub const RESET_TARGET: &str =
    "/redfish/v1/Systems/System.Embedded.1/Actions/ComputerSystem.Reset";
pub const ACCOUNTS: &str = "/redfish/v1/AccountService/Accounts";
pub const SLOTS: u32 = 16;

/// A request as the fake BMC saw it. `path` is the URL without the base.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub user: Option<String>,
}

struct Canned {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

struct State {
    accounts: BTreeMap<u32, Value>,
    passwords: BTreeMap<u32, String>,
    systems: Vec<String>,
    power_state: String,
    allowable_resets: Vec<String>,
    slash_member_links: bool,
    canned: VecDeque<Canned>,
    requests: Vec<Recorded>,
}

#[derive(Clone)]
pub struct FakeIdrac {
    state: Arc<Mutex<State>>,
}

pub fn account_path(id: u32) -> String {
    format!("{ACCOUNTS}/{id}")
}

fn slot_doc(id: u32, user: &str, role: &str, enabled: bool) -> Value {
    json!({
        "@odata.id": account_path(id),
        "@odata.type": "#ManagerAccount.v1_5_0.ManagerAccount",
        "Id": id.to_string(),
        "Name": "User Account",
        "Description": "User Account",
        "UserName": user,
        "Password": null,
        "RoleId": role,
        "Enabled": enabled,
        "Locked": false
    })
}

impl FakeIdrac {
    /// Powered on, one system, and only "root" in slot 2.
    pub fn new() -> FakeIdrac {
        let mut accounts = BTreeMap::new();
        for id in 1..=SLOTS {
            accounts.insert(id, slot_doc(id, "", "None", false));
        }
        let fake = FakeIdrac {
            state: Arc::new(Mutex::new(State {
                accounts,
                passwords: BTreeMap::new(),
                systems: vec![SYSTEM.to_string()],
                power_state: "On".to_string(),
                allowable_resets: [
                    "On",
                    "ForceOff",
                    "ForceRestart",
                    "GracefulShutdown",
                    "PushPowerButton",
                    "Nmi",
                    "PowerCycle",
                ]
                .iter()
                .map(|s| s.to_string())
                .collect(),
                slash_member_links: false,
                canned: VecDeque::new(),
                requests: Vec::new(),
            })),
        };
        fake.with_account(2, "root", "Administrator")
    }

    pub fn with_account(self, id: u32, user: &str, role: &str) -> FakeIdrac {
        self.state
            .lock()
            .unwrap()
            .accounts
            .insert(id, slot_doc(id, user, role, true));
        self
    }

    /// Keep only slots 1..=n.
    pub fn with_slot_count(self, n: u32) -> FakeIdrac {
        self.state
            .lock()
            .unwrap()
            .accounts
            .retain(|id, _| *id <= n);
        self
    }

    /// List Accounts members as `.../Accounts/N/` while each account's own
    /// `@odata.id` stays `.../Accounts/N`.
    pub fn with_slash_member_links(self) -> FakeIdrac {
        self.state.lock().unwrap().slash_member_links = true;
        self
    }

    pub fn with_power_state(self, state: &str) -> FakeIdrac {
        self.state.lock().unwrap().power_state = state.to_string();
        self
    }

    pub fn with_systems(self, systems: &[&str]) -> FakeIdrac {
        self.state.lock().unwrap().systems = systems.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_allowable_resets(self, resets: &[&str]) -> FakeIdrac {
        self.state.lock().unwrap().allowable_resets =
            resets.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Every slot from 2 up is taken by user{id}.
    pub fn full(self) -> FakeIdrac {
        let mut fake = self;
        for id in 3..=SLOTS {
            fake = fake.with_account(id, &format!("user{id}"), "ReadOnly");
        }
        fake
    }

    /// Answer the next `method` request to `path` with this instead.
    pub fn respond_once(&self, method: Method, path: &str, status: u16, body: Value) {
        self.state.lock().unwrap().canned.push_back(Canned {
            method,
            path: path.to_string(),
            status: StatusCode::from_u16(status).unwrap(),
            body: body.to_string(),
        });
    }

    pub fn transport(&self) -> Box<dyn HttpTransport> {
        Box::new(self.clone())
    }

    /// Log in as root and forget the discovery traffic.
    pub fn connect(&self) -> dell::Bmc {
        let bmc = dell::Bmc::connect(self.transport(), HOST, "root", "calvin").unwrap();
        self.clear_requests();
        bmc
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    pub fn requests_with(&self, method: Method) -> Vec<Recorded> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method)
            .collect()
    }

    pub fn account(&self, id: u32) -> Value {
        self.state.lock().unwrap().accounts[&id].clone()
    }

    pub fn password(&self, id: u32) -> Option<String> {
        self.state.lock().unwrap().passwords.get(&id).cloned()
    }

    pub fn power_state(&self) -> String {
        self.state.lock().unwrap().power_state.clone()
    }
}

fn reply(status: StatusCode, body: Value) -> HttpResponse {
    HttpResponse {
        status,
        body: body.to_string(),
    }
}

fn not_found(path: &str) -> HttpResponse {
    reply(
        StatusCode::NOT_FOUND,
        json!({"error": {
            "code": "Base.1.8.GeneralError",
            "message": "A general error has occurred. See ExtendedInfo for more information.",
            "@Message.ExtendedInfo": [{
                "Message": format!("The resource at the URI {path} was not found."),
                "MessageId": "Base.1.8.ResourceMissingAtURI"
            }]
        }}),
    )
}

fn success() -> Value {
    json!({"@Message.ExtendedInfo": [{
        "Message": "The request completed successfully.",
        "MessageId": "Base.1.8.Success"
    }]})
}

impl State {
    fn collection(name: &str, path: &str, members: Vec<String>) -> Value {
        json!({
            "@odata.id": path,
            "Name": name,
            "Members": members.iter().map(|m| json!({"@odata.id": m})).collect::<Vec<_>>(),
            "Members@odata.count": members.len(),
        })
    }

    fn system(&self) -> Value {
        json!({
            "@odata.id": SYSTEM,
            "Id": "System.Embedded.1",
            "PowerState": self.power_state,
            "Actions": {
                "#ComputerSystem.Reset": {
                    "target": RESET_TARGET,
                    "ResetType@Redfish.AllowableValues": self.allowable_resets,
                }
            }
        })
    }

    fn get(&self, path: &str) -> HttpResponse {
        let doc = match path {
            "/redfish" => json!({"v1": "/redfish/v1/"}),
            "/redfish/v1" => json!({
                "@odata.id": "/redfish/v1",
                "Product": "Integrated Dell Remote Access Controller",
                "RedfishVersion": "1.9.0",
                "Vendor": "Dell",
                "AccountService": {"@odata.id": "/redfish/v1/AccountService"},
                "Managers": {"@odata.id": "/redfish/v1/Managers"},
                "Systems": {"@odata.id": "/redfish/v1/Systems"},
            }),
            "/redfish/v1/Systems" => {
                State::collection("Computer System Collection", path, self.systems.clone())
            }
            "/redfish/v1/Managers" => State::collection(
                "Manager Collection",
                path,
                vec!["/redfish/v1/Managers/iDRAC.Embedded.1".to_string()],
            ),
            SYSTEM => self.system(),
            "/redfish/v1/AccountService" => json!({
                "@odata.id": "/redfish/v1/AccountService",
                "Accounts": {"@odata.id": ACCOUNTS},
            }),
            ACCOUNTS => State::collection(
                "Accounts Collection",
                path,
                self.accounts
                    .keys()
                    .map(|id| {
                        let member = account_path(*id);
                        if self.slash_member_links {
                            member + "/"
                        } else {
                            member
                        }
                    })
                    .collect(),
            ),
            _ => match self.slot_of(path) {
                Some(id) => self.accounts[&id].clone(),
                None => return not_found(path),
            },
        };
        reply(StatusCode::OK, doc)
    }

    fn slot_of(&self, path: &str) -> Option<u32> {
        let id = path.strip_prefix(ACCOUNTS)?.strip_prefix('/')?.parse().ok()?;
        self.accounts.contains_key(&id).then_some(id)
    }

    fn patch(&mut self, path: &str, body: &Value) -> HttpResponse {
        let Some(id) = self.slot_of(path) else {
            return not_found(path);
        };
        if let Some(pw) = body.get("Password").and_then(Value::as_str) {
            self.passwords.insert(id, pw.to_string());
        }
        let Some(doc) = self.accounts.get_mut(&id) else {
            return not_found(path);
        };
        for field in ["UserName", "Enabled", "RoleId"] {
            if let Some(v) = body.get(field) {
                doc[field] = v.clone();
            }
        }
        reply(StatusCode::OK, success())
    }

    fn post(&mut self, path: &str, body: &Value) -> HttpResponse {
        if path != RESET_TARGET {
            return not_found(path);
        }
        match body.get("ResetType").and_then(Value::as_str) {
            Some("On") | Some("PowerCycle") | Some("ForceRestart") => {
                self.power_state = "On".to_string()
            }
            Some("ForceOff") | Some("GracefulShutdown") => self.power_state = "Off".to_string(),
            _ => {}
        }
        HttpResponse {
            status: StatusCode::NO_CONTENT,
            body: String::new(),
        }
    }
}

impl HttpTransport for FakeIdrac {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, RedfishError> {
        let mut state = self.state.lock().unwrap();
        let path = request
            .url
            .strip_prefix(BASE)
            .unwrap_or(&request.url)
            .to_string();
        let body: Option<Value> = request
            .body
            .as_deref()
            .map(|b| serde_json::from_str(b).unwrap());
        state.requests.push(Recorded {
            method: request.method.clone(),
            path: path.clone(),
            query: request.query.clone(),
            body: body.clone(),
            user: request.basic_auth.as_ref().map(|(u, _)| u.clone()),
        });

        if let Some(pos) = state
            .canned
            .iter()
            .position(|c| c.method == request.method && c.path == path)
        {
            let canned = state.canned.remove(pos).unwrap();
            return Ok(HttpResponse {
                status: canned.status,
                body: canned.body,
            });
        }

        let body = body.unwrap_or(Value::Null);
        Ok(match request.method {
            Method::GET => state.get(&path),
            Method::PATCH => state.patch(&path, &body),
            Method::POST => state.post(&path, &body),
            _ => not_found(&path),
        })
    }
}

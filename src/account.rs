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
//! Walking the Accounts collection.
//!
//! A BMC exposes a fixed array of account slots (ids 1 to 16 on iDRAC), each
//! either in use (non-empty UserName) or free (empty UserName). Creating an
//! account means claiming a free slot; deleting one means blanking it again.
//! Everything account related goes through [`scan`].

use std::collections::HashMap;
use std::fmt;

use tracing::debug;

use crate::model::ManagerAccount;
use crate::RedfishError;

/// Decides which empty slots may be handed out, and whether a search may
/// give up at the first one.
pub trait SlotPolicy: fmt::Debug + Send + Sync {
    /// May an empty slot with this id hold a new account?
    fn is_reusable(&self, slot_id: u32) -> bool;

    /// May a lookup stop at the first reusable empty slot, assuming no
    /// accounts live past it? Enumerating all accounts always visits every
    /// slot regardless.
    fn stops_at_first_empty(&self) -> bool;
}

/// Visit every slot. Slot 1 is reserved on iDRAC (the web UI never uses it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FullScan {
    pub reserved_slots: u32,
}

impl Default for FullScan {
    fn default() -> Self {
        FullScan { reserved_slots: 1 }
    }
}

impl SlotPolicy for FullScan {
    fn is_reusable(&self, slot_id: u32) -> bool {
        slot_id > self.reserved_slots
    }

    fn stops_at_first_empty(&self) -> bool {
        false
    }
}

/// Assume slots fill from the lowest usable id upwards with no gaps, so the
/// first empty slot marks the end of the in-use ones. Holds for iDRAC as long
/// as accounts are only managed through this crate or the web UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContiguousSlots {
    pub reserved_slots: u32,
}

impl Default for ContiguousSlots {
    fn default() -> Self {
        ContiguousSlots { reserved_slots: 1 }
    }
}

impl SlotPolicy for ContiguousSlots {
    fn is_reusable(&self, slot_id: u32) -> bool {
        slot_id > self.reserved_slots
    }

    fn stops_at_first_empty(&self) -> bool {
        true
    }
}

/// What a scan is looking for. The default looks for nothing in particular
/// and enumerates every account.
#[derive(Debug, Default, Clone, Copy)]
pub struct ScanQuery<'a> {
    pub want_user_name: Option<&'a str>,
    pub find_empty_slot: bool,
}

impl ScanQuery<'_> {
    fn is_lookup(&self) -> bool {
        self.want_user_name.is_some() || self.find_empty_slot
    }
}

#[derive(Debug, Default)]
pub struct AccountScan {
    /// In-use accounts seen so far, by user name. Complete only when the
    /// scan enumerated everything.
    pub accounts: HashMap<String, ManagerAccount>,
    /// The account matching `want_user_name`, if found.
    pub wanted: Option<ManagerAccount>,
    /// First reusable empty slot seen before the scan ended.
    pub empty_slot: Option<ManagerAccount>,
}

/// Fetch each member in collection order and sort them into in-use accounts
/// and the first reusable empty slot. Returns as soon as the wanted user is
/// found.
pub fn scan<F>(
    member_paths: &[String],
    query: ScanQuery<'_>,
    policy: &dyn SlotPolicy,
    mut fetch: F,
) -> Result<AccountScan, RedfishError>
where
    F: FnMut(&str) -> Result<ManagerAccount, RedfishError>,
{
    let mut out = AccountScan::default();
    for path in member_paths {
        let account = fetch(path)?;
        if !account.is_empty_slot() {
            debug!("Found account for user \"{}\"", account.username);
            if query.want_user_name == Some(account.username.as_str()) {
                debug!("Found account for the user we were interested in.");
                out.wanted = Some(account);
                return Ok(out);
            }
            out.accounts.insert(account.username.clone(), account);
            continue;
        }

        let id = account.slot_id()?;
        if !policy.is_reusable(id) {
            continue;
        }
        if out.empty_slot.is_none() {
            debug!("Found first empty account slot at id {id}.");
            out.empty_slot = Some(account);
        }
        if query.is_lookup() && policy.stops_at_first_empty() {
            break;
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn slot(id: u32, user: &str) -> ManagerAccount {
        ManagerAccount {
            odata_id: format!("/redfish/v1/AccountService/Accounts/{id}"),
            id: id.to_string(),
            username: user.to_string(),
            ..Default::default()
        }
    }

    fn slots(users: &[&str]) -> Vec<ManagerAccount> {
        users
            .iter()
            .enumerate()
            .map(|(i, u)| slot(i as u32 + 1, u))
            .collect()
    }

    fn run(
        accounts: &[ManagerAccount],
        query: ScanQuery<'_>,
        policy: &dyn SlotPolicy,
    ) -> (AccountScan, usize) {
        let paths: Vec<String> = accounts.iter().map(|a| a.odata_id.clone()).collect();
        let fetched = RefCell::new(0);
        let result = scan(&paths, query, policy, |p| {
            *fetched.borrow_mut() += 1;
            Ok(accounts.iter().find(|a| a.odata_id == p).unwrap().clone())
        })
        .unwrap();
        (result, fetched.into_inner())
    }

    #[test]
    fn test_enumerate_all() {
        let accounts = slots(&["", "alice", "bob", "", ""]);
        let (result, fetched) = run(&accounts, ScanQuery::default(), &ContiguousSlots::default());
        assert_eq!(fetched, 5);
        let mut names: Vec<_> = result.accounts.keys().cloned().collect();
        names.sort();
        assert_eq!(names, vec!["alice", "bob"]);
        assert_eq!(result.empty_slot.unwrap().id, "4");
    }

    #[test]
    fn test_enumerate_past_gap() {
        let accounts = slots(&["", "alice", "", "carol"]);
        let (result, _) = run(&accounts, ScanQuery::default(), &ContiguousSlots::default());
        assert!(result.accounts.contains_key("carol"));
    }

    #[test]
    fn test_lookup_short_circuits() {
        let accounts = slots(&["", "alice", "bob", "carol"]);
        let query = ScanQuery {
            want_user_name: Some("bob"),
            find_empty_slot: false,
        };
        let (result, fetched) = run(&accounts, query, &FullScan::default());
        assert_eq!(fetched, 3);
        assert_eq!(result.wanted.unwrap().id, "3");
    }

    #[test]
    fn test_lookup_not_found() {
        let accounts = slots(&["", "alice", "", ""]);
        let query = ScanQuery {
            want_user_name: Some("zed"),
            find_empty_slot: false,
        };
        let (result, fetched) = run(&accounts, query, &FullScan::default());
        assert_eq!(fetched, 4);
        assert!(result.wanted.is_none());
    }

    #[test]
    fn test_reserved_slot_never_offered() {
        let accounts = slots(&["", "alice", "bob"]);
        let query = ScanQuery {
            want_user_name: Some("dave"),
            find_empty_slot: true,
        };
        let (result, _) = run(&accounts, query, &FullScan::default());
        assert!(result.wanted.is_none());
        assert!(result.empty_slot.is_none());
    }

    #[test]
    fn test_contiguous_stops_at_first_empty() {
        let accounts = slots(&["", "alice", "", "", "carol"]);
        let query = ScanQuery {
            want_user_name: Some("carol"),
            find_empty_slot: true,
        };
        let (result, fetched) = run(&accounts, query, &ContiguousSlots::default());
        assert_eq!(fetched, 3);
        assert!(result.wanted.is_none());
        assert_eq!(result.empty_slot.unwrap().id, "3");

        let (result, fetched) = run(&accounts, query, &FullScan::default());
        assert_eq!(fetched, 5);
        assert_eq!(result.wanted.unwrap().id, "5");
    }

    #[test]
    fn test_bad_slot_id() {
        let mut bad = slot(2, "");
        bad.id = "two".to_string();
        let paths = vec![bad.odata_id.clone()];
        let err = scan(&paths, ScanQuery::default(), &FullScan::default(), |_| Ok(bad.clone()))
            .unwrap_err();
        assert!(matches!(err, RedfishError::InvalidKeyType { .. }));
    }
}

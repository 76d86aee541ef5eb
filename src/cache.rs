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

use chrono::{DateTime, Utc};
use tracing::{debug, trace};

/// A resource document and when we fetched it.
#[derive(Debug, Clone)]
pub struct CachedResource {
    pub fetched_at: DateTime<Utc>,
    pub document: serde_json::Value,
}

/// Resources already fetched from one BMC, keyed by resource path. A
/// trailing `/` is not part of the key, so `.../Accounts/3/` and
/// `.../Accounts/3` name the same entry.
///
/// There is no expiry. Entries live until [`ResourceCache::invalidate`] is
/// called, which every write to a path must do before returning.
#[derive(Debug, Default)]
pub struct ResourceCache {
    resources: HashMap<String, CachedResource>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, path: &str) -> Option<&serde_json::Value> {
        let hit = self.resources.get(key(path)).map(|r| &r.document);
        if hit.is_some() {
            debug!("Getting resource from cache: {path}");
        }
        hit
    }

    pub fn fetched_at(&self, path: &str) -> Option<DateTime<Utc>> {
        self.resources.get(key(path)).map(|r| r.fetched_at)
    }

    pub fn put(&mut self, path: &str, document: serde_json::Value) {
        let path = key(path);
        let msg_start = if self.resources.contains_key(path) {
            "Updated in"
        } else {
            "Added to"
        };
        debug!("{msg_start} resource cache: {path}");
        trace!(
            "Resource contents:\n{}",
            serde_json::to_string_pretty(&document).unwrap_or_default()
        );
        self.resources.insert(
            path.to_string(),
            CachedResource {
                fetched_at: Utc::now(),
                document,
            },
        );
    }

    pub fn invalidate(&mut self, path: &str) -> Option<CachedResource> {
        let path = key(path);
        let removed = self.resources.remove(path);
        if removed.is_some() {
            debug!("Removed from resource cache: {path}");
        }
        removed
    }

    pub fn contains(&self, path: &str) -> bool {
        self.resources.contains_key(key(path))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

fn key(path: &str) -> &str {
    path.trim_end_matches('/')
}

// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Bundlenews Contributors

//! Startup reconciliation of the configured newsgroup list against the
//! store. The configuration is the single source of truth: groups are
//! created when missing and removed (with their articles) when no longer
//! configured.

use bn_storage::{Store, StoreError};
use chrono::Utc;
use std::collections::HashSet;
use tracing::info;

pub fn reconcile_groups(store: &Store, want: &[String]) -> Result<(), StoreError> {
    info!("reconciling newsgroup configuration with the store");

    let want_set: HashSet<&str> = want.iter().map(String::as_str).collect();
    let have: Vec<String> = store.groups().into_iter().map(|g| g.name).collect();
    let have_set: HashSet<&str> = have.iter().map(String::as_str).collect();

    for name in want {
        if !have_set.contains(name.as_str()) {
            info!(group = %name, "adding new group");
            store.create_group(name, None, Utc::now())?;
        }
    }
    for name in &have {
        if !want_set.contains(name.as_str()) {
            info!(group = %name, "removing group");
            store.delete_group(name)?;
        }
    }

    Ok(())
}

#[cfg(test)]
#[path = "reconcile_tests.rs"]
mod tests;

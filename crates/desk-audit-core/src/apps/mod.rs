pub mod assignment;
pub mod published;

use std::collections::BTreeSet;

/// Sentinel shown when an application resolves to no delivery group at all.
pub const UNASSIGNED: &str = "Unassigned";

/// Join a set of group names for display; empty names are dropped.
pub fn join_group_names(names: &BTreeSet<String>) -> String {
    names
        .iter()
        .filter(|name| !name.trim().is_empty())
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

use crate::error::Result;
use crate::inventory::{DirectoryService, OrganizationalUnit};
use crate::paths::sanitize_file_name;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// One linked policy and every folder its report goes to.
#[derive(Debug, Clone, Default)]
pub struct PlannedPolicy {
    /// The id as first seen on a link, used for lookups.
    pub id: String,
    pub destinations: BTreeSet<PathBuf>,
}

/// Case-folded policy id → planned policy. Both levels are ordered so the
/// export runs in a stable order.
#[derive(Debug, Default)]
pub struct LinkPlan {
    pub policies: BTreeMap<String, PlannedPolicy>,
    pub skipped_scopes: Vec<String>,
}

impl LinkPlan {
    /// Queue `destination` for `policy_id`. Ids differing only in ASCII case
    /// are the same policy. Returns false when the pair was already queued.
    pub fn add(&mut self, policy_id: &str, destination: PathBuf) -> bool {
        self.policies
            .entry(policy_id.to_ascii_lowercase())
            .or_insert_with(|| PlannedPolicy {
                id: policy_id.to_string(),
                destinations: BTreeSet::new(),
            })
            .destinations
            .insert(destination)
    }

    pub fn get(&self, policy_id: &str) -> Option<&PlannedPolicy> {
        self.policies.get(&policy_id.to_ascii_lowercase())
    }

    /// Number of unique policies.
    pub fn policy_count(&self) -> usize {
        self.policies.len()
    }

    /// Number of (policy, destination) pairs, i.e. files to write.
    pub fn pair_count(&self) -> usize {
        self.policies.values().map(|p| p.destinations.len()).sum()
    }
}

/// The target unit first, followed by its descendants when `recurse` is set.
pub fn collect_scopes(
    service: &dyn DirectoryService,
    target_dn: &str,
    recurse: bool,
) -> Result<Vec<OrganizationalUnit>> {
    let target = service.organizational_unit(target_dn)?;
    let mut scopes = vec![target];
    if recurse {
        scopes.extend(service.descendant_units(target_dn)?);
    }
    Ok(scopes)
}

pub fn destination_for(scope: &OrganizationalUnit, target_dn: &str, output_root: &Path) -> PathBuf {
    if scope.distinguished_name.eq_ignore_ascii_case(target_dn) {
        output_root.to_path_buf()
    } else {
        output_root.join(sanitize_file_name(&scope.name))
    }
}

/// Gather effective links for every scope. A scope whose links cannot be read
/// is logged and recorded in `skipped_scopes`.
pub fn build_link_plan(
    service: &dyn DirectoryService,
    scopes: &[OrganizationalUnit],
    target_dn: &str,
    output_root: &Path,
) -> LinkPlan {
    let mut plan = LinkPlan::default();

    for scope in scopes {
        let links = match service.effective_links(&scope.distinguished_name) {
            Ok(links) => links,
            Err(err) => {
                warn!(
                    "Skipping '{}': could not read policy links: {}",
                    scope.distinguished_name, err
                );
                plan.skipped_scopes.push(scope.distinguished_name.clone());
                continue;
            }
        };

        let destination = destination_for(scope, target_dn, output_root);
        for link in links {
            if !plan.add(&link.gpo_id, destination.clone()) {
                debug!(
                    "'{}' already queued for {}",
                    link.display_name,
                    destination.display()
                );
            }
        }
    }

    plan
}

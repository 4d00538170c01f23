#![allow(dead_code)]

use desk_audit_core::config::ReportFormat;
use desk_audit_core::inventory::{
    Application, ApplicationGroup, DeliveryGroup, DeliveryService, DirectoryService,
    OrganizationalUnit, PolicyLink, PolicyObject,
};
use desk_audit_core::{Error, Result};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

#[derive(Default)]
pub struct FakeDelivery {
    pub applications: Option<Vec<Application>>,
    pub groups: Vec<DeliveryGroup>,
    pub app_groups: Vec<ApplicationGroup>,
    /// Uids whose lookup fails with a service error instead of "not found".
    pub broken_uids: HashSet<u32>,
    pub group_lookups: RefCell<usize>,
}

impl DeliveryService for FakeDelivery {
    fn supports_application_query(&self) -> bool {
        self.applications.is_some()
    }

    fn applications(&self) -> Result<Vec<Application>> {
        self.applications
            .clone()
            .ok_or_else(|| Error::MissingCapability("application query".to_string()))
    }

    fn delivery_groups(&self) -> Result<Vec<DeliveryGroup>> {
        Ok(self.groups.clone())
    }

    fn delivery_group(&self, uid: u32) -> Result<DeliveryGroup> {
        *self.group_lookups.borrow_mut() += 1;
        if self.broken_uids.contains(&uid) {
            return Err(Error::Service(format!("controller timeout on {}", uid)));
        }
        self.groups
            .iter()
            .find(|g| g.uid == uid)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("delivery group {}", uid)))
    }

    fn application_group(&self, uid: u32) -> Result<ApplicationGroup> {
        self.app_groups
            .iter()
            .find(|g| g.uid == uid)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("application group {}", uid)))
    }
}

pub fn group(uid: u32, name: &str) -> DeliveryGroup {
    DeliveryGroup {
        uid,
        name: name.to_string(),
    }
}

pub fn app(uid: u32, name: &str) -> Application {
    Application {
        uid,
        name: name.to_string(),
        enabled: true,
        visible: true,
        ..Default::default()
    }
}

#[derive(Default)]
pub struct FakeDirectory {
    pub units: Vec<OrganizationalUnit>,
    pub links: HashMap<String, Vec<PolicyLink>>,
    pub policies: Vec<PolicyObject>,
    pub broken_scopes: HashSet<String>,
    pub broken_reports: HashSet<String>,
    pub metadata_lookups: RefCell<HashMap<String, usize>>,
}

impl FakeDirectory {
    pub fn unit(mut self, dn: &str, name: &str, gpo_ids: &[&str]) -> Self {
        self.units.push(OrganizationalUnit {
            distinguished_name: dn.to_string(),
            name: name.to_string(),
        });
        self.links.insert(
            dn.to_string(),
            gpo_ids
                .iter()
                .map(|id| PolicyLink {
                    gpo_id: id.to_string(),
                    display_name: id.to_string(),
                    enabled: true,
                })
                .collect(),
        );
        self
    }

    pub fn policy(mut self, id: &str, display_name: &str) -> Self {
        self.policies.push(PolicyObject {
            id: id.to_string(),
            display_name: display_name.to_string(),
            ..Default::default()
        });
        self
    }
}

impl DirectoryService for FakeDirectory {
    fn organizational_unit(&self, distinguished_name: &str) -> Result<OrganizationalUnit> {
        self.units
            .iter()
            .find(|u| u.distinguished_name == distinguished_name)
            .cloned()
            .ok_or_else(|| Error::NotFound(distinguished_name.to_string()))
    }

    fn descendant_units(&self, distinguished_name: &str) -> Result<Vec<OrganizationalUnit>> {
        let suffix = format!(",{}", distinguished_name);
        Ok(self
            .units
            .iter()
            .filter(|u| u.distinguished_name.ends_with(&suffix))
            .cloned()
            .collect())
    }

    fn effective_links(&self, distinguished_name: &str) -> Result<Vec<PolicyLink>> {
        if self.broken_scopes.contains(distinguished_name) {
            return Err(Error::Service("access denied".to_string()));
        }
        Ok(self.links.get(distinguished_name).cloned().unwrap_or_default())
    }

    fn policy(&self, id: &str) -> Result<PolicyObject> {
        *self
            .metadata_lookups
            .borrow_mut()
            .entry(id.to_string())
            .or_insert(0) += 1;
        self.policies
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("policy {}", id)))
    }

    fn policy_report(&self, policy: &PolicyObject, format: ReportFormat) -> Result<String> {
        if self.broken_reports.contains(&policy.id) {
            return Err(Error::Service("report generation failed".to_string()));
        }
        Ok(format!("{:?} report for {}", format, policy.display_name))
    }
}

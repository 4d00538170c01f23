//! Shapes of the records consumed from the management services, and the
//! service seams the reporting jobs query through.
//!
//! Every job only reads from these services; none of them mutate remote state.

pub mod snapshot;

use crate::config::ReportFormat;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use snapshot::{SnapshotDelivery, SnapshotDirectory};

/// A published application as reported by the delivery controller.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Application {
    pub uid: u32,
    pub name: String,
    pub published_name: Option<String>,
    pub enabled: bool,
    pub visible: bool,
    pub command_line_executable: Option<String>,
    pub command_line_arguments: Option<String>,
    pub working_directory: Option<String>,
    /// Delivery group names attached directly to the application.
    pub associated_group_names: Vec<String>,
    /// Delivery group uids that still need a name lookup.
    pub associated_group_uids: Vec<u32>,
    /// Application groups whose own delivery groups apply to this application.
    pub associated_application_group_uids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeliveryGroup {
    pub uid: u32,
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApplicationGroup {
    pub uid: u32,
    pub name: String,
    pub associated_group_uids: Vec<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrganizationalUnit {
    pub distinguished_name: String,
    pub name: String,
}

/// A policy link effective on a scope, either direct or inherited.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PolicyLink {
    pub gpo_id: String,
    pub display_name: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PolicyObject {
    pub id: String,
    pub display_name: String,
    pub status: Option<String>,
    pub created: Option<String>,
    pub modified: Option<String>,
    pub description: Option<String>,
    pub settings: BTreeMap<String, String>,
}

/// Read-only queries against the application-delivery controller.
pub trait DeliveryService {
    /// Whether the application query is available at all. Checked before any work.
    fn supports_application_query(&self) -> bool;
    fn applications(&self) -> Result<Vec<Application>>;
    fn delivery_groups(&self) -> Result<Vec<DeliveryGroup>>;
    fn delivery_group(&self, uid: u32) -> Result<DeliveryGroup>;
    fn application_group(&self, uid: u32) -> Result<ApplicationGroup>;
}

/// Read-only queries against the directory and its group policy store.
pub trait DirectoryService {
    fn organizational_unit(&self, distinguished_name: &str) -> Result<OrganizationalUnit>;
    /// All scopes below `distinguished_name`, at any depth, excluding itself.
    fn descendant_units(&self, distinguished_name: &str) -> Result<Vec<OrganizationalUnit>>;
    fn effective_links(&self, distinguished_name: &str) -> Result<Vec<PolicyLink>>;
    fn policy(&self, id: &str) -> Result<PolicyObject>;
    fn policy_report(&self, policy: &PolicyObject, format: ReportFormat) -> Result<String>;
}

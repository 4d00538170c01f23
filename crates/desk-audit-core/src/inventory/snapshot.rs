//! JSON inventory snapshots exported from the delivery controller and the
//! directory, served back through the service traits.

use super::{
    Application, ApplicationGroup, DeliveryGroup, DeliveryService, DirectoryService,
    OrganizationalUnit, PolicyLink, PolicyObject,
};
use crate::config::ReportFormat;
use crate::error::{Error, Result};
use serde::Deserialize;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DeliverySnapshot {
    /// `None` when the export was taken without the application query available.
    pub applications: Option<Vec<Application>>,
    pub delivery_groups: Vec<DeliveryGroup>,
    pub application_groups: Vec<ApplicationGroup>,
}

pub struct SnapshotDelivery {
    snapshot: DeliverySnapshot,
}

impl SnapshotDelivery {
    pub fn new(snapshot: DeliverySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn open(path: &Path) -> Result<Self> {
        debug!("Loading delivery snapshot from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }
}

impl DeliveryService for SnapshotDelivery {
    fn supports_application_query(&self) -> bool {
        self.snapshot.applications.is_some()
    }

    fn applications(&self) -> Result<Vec<Application>> {
        self.snapshot
            .applications
            .clone()
            .ok_or_else(|| Error::MissingCapability("application query".to_string()))
    }

    fn delivery_groups(&self) -> Result<Vec<DeliveryGroup>> {
        Ok(self.snapshot.delivery_groups.clone())
    }

    fn delivery_group(&self, uid: u32) -> Result<DeliveryGroup> {
        self.snapshot
            .delivery_groups
            .iter()
            .find(|group| group.uid == uid)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("delivery group {}", uid)))
    }

    fn application_group(&self, uid: u32) -> Result<ApplicationGroup> {
        self.snapshot
            .application_groups
            .iter()
            .find(|group| group.uid == uid)
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("application group {}", uid)))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct OrganizationalUnitEntry {
    pub distinguished_name: String,
    pub name: String,
    pub gpo_links: Vec<PolicyLink>,
    pub block_inheritance: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct DirectorySnapshot {
    pub organizational_units: Vec<OrganizationalUnitEntry>,
    pub policies: Vec<PolicyObject>,
}

pub struct SnapshotDirectory {
    snapshot: DirectorySnapshot,
}

impl SnapshotDirectory {
    pub fn new(snapshot: DirectorySnapshot) -> Self {
        Self { snapshot }
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(raw)?))
    }

    pub fn open(path: &Path) -> Result<Self> {
        debug!("Loading directory snapshot from {}", path.display());
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn entry(&self, distinguished_name: &str) -> Option<&OrganizationalUnitEntry> {
        self.snapshot
            .organizational_units
            .iter()
            .find(|ou| ou.distinguished_name.eq_ignore_ascii_case(distinguished_name))
    }
}

impl DirectoryService for SnapshotDirectory {
    fn organizational_unit(&self, distinguished_name: &str) -> Result<OrganizationalUnit> {
        self.entry(distinguished_name)
            .map(|ou| OrganizationalUnit {
                distinguished_name: ou.distinguished_name.clone(),
                name: ou.name.clone(),
            })
            .ok_or_else(|| Error::NotFound(format!("organizational unit {}", distinguished_name)))
    }

    fn descendant_units(&self, distinguished_name: &str) -> Result<Vec<OrganizationalUnit>> {
        let suffix = format!(",{}", distinguished_name.to_ascii_lowercase());
        Ok(self
            .snapshot
            .organizational_units
            .iter()
            .filter(|ou| ou.distinguished_name.to_ascii_lowercase().ends_with(&suffix))
            .map(|ou| OrganizationalUnit {
                distinguished_name: ou.distinguished_name.clone(),
                name: ou.name.clone(),
            })
            .collect())
    }

    /// Direct links first, then links inherited from each ancestor present in the
    /// snapshot, nearest first, until a scope blocks inheritance.
    fn effective_links(&self, distinguished_name: &str) -> Result<Vec<PolicyLink>> {
        let mut current = self
            .entry(distinguished_name)
            .ok_or_else(|| Error::NotFound(format!("organizational unit {}", distinguished_name)))?;

        let mut links: Vec<PolicyLink> = Vec::new();
        loop {
            for link in &current.gpo_links {
                if !links.iter().any(|l| l.gpo_id.eq_ignore_ascii_case(&link.gpo_id)) {
                    links.push(link.clone());
                }
            }
            if current.block_inheritance {
                break;
            }

            let mut parent = parent_dn(&current.distinguished_name);
            let mut next = None;
            while let Some(dn) = parent {
                if let Some(entry) = self.entry(dn) {
                    next = Some(entry);
                    break;
                }
                parent = parent_dn(dn);
            }
            match next {
                Some(entry) => current = entry,
                None => break,
            }
        }

        Ok(links)
    }

    fn policy(&self, id: &str) -> Result<PolicyObject> {
        self.snapshot
            .policies
            .iter()
            .find(|policy| policy.id.eq_ignore_ascii_case(id))
            .cloned()
            .ok_or_else(|| Error::NotFound(format!("policy {}", id)))
    }

    fn policy_report(&self, policy: &PolicyObject, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Html => render_html(policy),
            ReportFormat::Xml => render_xml(policy),
        })
    }
}

/// Strip the leading RDN, honouring `\,` escapes.
fn parent_dn(distinguished_name: &str) -> Option<&str> {
    let mut escaped = false;
    for (idx, ch) in distinguished_name.char_indices() {
        match ch {
            '\\' if !escaped => escaped = true,
            ',' if !escaped => {
                let rest = &distinguished_name[idx + 1..];
                return if rest.is_empty() { None } else { Some(rest) };
            }
            _ => escaped = false,
        }
    }
    None
}

fn escape_markup(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn metadata_rows(policy: &PolicyObject) -> Vec<(&'static str, String)> {
    vec![
        ("Identifier", policy.id.clone()),
        ("Name", policy.display_name.clone()),
        ("Status", policy.status.clone().unwrap_or_default()),
        ("Created", policy.created.clone().unwrap_or_default()),
        ("Modified", policy.modified.clone().unwrap_or_default()),
        ("Description", policy.description.clone().unwrap_or_default()),
    ]
}

fn render_html(policy: &PolicyObject) -> String {
    let title = escape_markup(&policy.display_name);
    let mut out = String::new();
    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html><head><meta charset=\"utf-8\"><title>{}</title></head><body>", title);
    let _ = writeln!(out, "<h1>{}</h1>", title);
    let _ = writeln!(out, "<table>");
    for (label, value) in metadata_rows(policy) {
        let _ = writeln!(out, "<tr><th>{}</th><td>{}</td></tr>", label, escape_markup(&value));
    }
    let _ = writeln!(out, "</table>");
    let _ = writeln!(out, "<h2>Settings</h2>");
    let _ = writeln!(out, "<table>");
    for (name, value) in &policy.settings {
        let _ = writeln!(
            out,
            "<tr><th>{}</th><td>{}</td></tr>",
            escape_markup(name),
            escape_markup(value)
        );
    }
    let _ = writeln!(out, "</table>");
    let _ = writeln!(out, "</body></html>");
    out
}

fn render_xml(policy: &PolicyObject) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "<?xml version=\"1.0\" encoding=\"utf-8\"?>");
    let _ = writeln!(out, "<GPO>");
    for (label, value) in metadata_rows(policy) {
        let _ = writeln!(out, "  <{0}>{1}</{0}>", label, escape_markup(&value));
    }
    let _ = writeln!(out, "  <Settings>");
    for (name, value) in &policy.settings {
        let _ = writeln!(
            out,
            "    <Setting name=\"{}\">{}</Setting>",
            escape_markup(name),
            escape_markup(value)
        );
    }
    let _ = writeln!(out, "  </Settings>");
    let _ = writeln!(out, "</GPO>");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const DIRECTORY: &str = r#"{
        "OrganizationalUnits": [
            { "DistinguishedName": "DC=corp,DC=local", "Name": "corp",
              "GpoLinks": [ { "GpoId": "dom-1", "DisplayName": "Default Domain Policy", "Enabled": true } ] },
            { "DistinguishedName": "OU=Sites,DC=corp,DC=local", "Name": "Sites",
              "GpoLinks": [ { "GpoId": "site-1", "DisplayName": "Site Baseline", "Enabled": true } ] },
            { "DistinguishedName": "OU=Kiosk,OU=Sites,DC=corp,DC=local", "Name": "Kiosk",
              "BlockInheritance": true,
              "GpoLinks": [ { "GpoId": "kiosk-1", "DisplayName": "Kiosk Lockdown", "Enabled": true } ] },
            { "DistinguishedName": "OU=Branch,OU=Sites,DC=corp,DC=local", "Name": "Branch",
              "GpoLinks": [ { "GpoId": "SITE-1", "DisplayName": "Site Baseline", "Enabled": true } ] }
        ],
        "Policies": [
            { "Id": "site-1", "DisplayName": "Site <Baseline>", "Settings": { "Wallpaper": "a&b", "Proxy \"Auto\"": "on" } }
        ]
    }"#;

    #[test]
    fn test_parent_dn_handles_escaped_commas() {
        assert_eq!(
            parent_dn(r"OU=Smith\, John,OU=Users,DC=corp"),
            Some("OU=Users,DC=corp")
        );
        assert_eq!(parent_dn("DC=local"), None);
    }

    #[test]
    fn test_effective_links_include_ancestors_once() {
        let directory = SnapshotDirectory::from_json(DIRECTORY).unwrap();
        let links = directory
            .effective_links("OU=Branch,OU=Sites,DC=corp,DC=local")
            .unwrap();
        let ids: Vec<&str> = links.iter().map(|l| l.gpo_id.as_str()).collect();
        assert_eq!(ids, vec!["SITE-1", "dom-1"]);
    }

    #[test]
    fn test_effective_links_stop_at_blocked_inheritance() {
        let directory = SnapshotDirectory::from_json(DIRECTORY).unwrap();
        let links = directory
            .effective_links("OU=Kiosk,OU=Sites,DC=corp,DC=local")
            .unwrap();
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].gpo_id, "kiosk-1");
    }

    #[test]
    fn test_descendants_exclude_target() {
        let directory = SnapshotDirectory::from_json(DIRECTORY).unwrap();
        let units = directory.descendant_units("OU=Sites,DC=corp,DC=local").unwrap();
        let names: Vec<&str> = units.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(names, vec!["Kiosk", "Branch"]);
    }

    #[test]
    fn test_html_report_escapes_markup() {
        let directory = SnapshotDirectory::from_json(DIRECTORY).unwrap();
        let policy = directory.policy("site-1").unwrap();
        let html = directory.policy_report(&policy, ReportFormat::Html).unwrap();
        assert!(html.contains("<title>Site &lt;Baseline&gt;</title>"));
        assert!(html.contains("<td>a&amp;b</td>"));
    }

    #[test]
    fn test_xml_report_lists_metadata_and_escaped_settings() {
        let directory = SnapshotDirectory::from_json(DIRECTORY).unwrap();
        let policy = directory.policy("site-1").unwrap();
        let xml = directory.policy_report(&policy, ReportFormat::Xml).unwrap();

        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<GPO>\n"));
        assert!(xml.contains("  <Identifier>site-1</Identifier>\n"));
        assert!(xml.contains("  <Name>Site &lt;Baseline&gt;</Name>\n"));
        assert!(xml.contains("  <Status></Status>\n"));
        assert!(xml.contains("    <Setting name=\"Wallpaper\">a&amp;b</Setting>\n"));
        assert!(xml.contains("    <Setting name=\"Proxy &quot;Auto&quot;\">on</Setting>\n"));
        assert!(xml.trim_end().ends_with("  </Settings>\n</GPO>"));
    }

    #[test]
    fn test_missing_applications_disable_capability() {
        let delivery = SnapshotDelivery::from_json(r#"{ "DeliveryGroups": [] }"#).unwrap();
        assert!(!delivery.supports_application_query());
        assert!(matches!(
            delivery.applications(),
            Err(Error::MissingCapability(_))
        ));
    }
}

//! README manifest advertised by a project

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Transport a project exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InterfaceType {
    Rest,
    Graphql,
    Grpc,
    #[default]
    #[serde(other)]
    Undefined,
}

/// One way of reaching a project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessInterface {
    #[serde(rename = "type")]
    pub kind: InterfaceType,
    pub base_url_or_address: String,
    pub available_methods_or_operations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationDetails {
    pub access_interfaces: Vec<AccessInterface>,
    pub default_data_formats: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityInfo {
    pub encryption_required: bool,
}

/// Pricing model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MonetizationModel {
    Free,
    Paid,
    Freemium,
    #[default]
    #[serde(rename = "MODEL_TYPE_UNSPECIFIED", alias = "UNSPECIFIED")]
    #[serde(other)]
    Unspecified,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MonetizationInfo {
    pub model: MonetizationModel,
    pub price_details: String,
    pub currency: String,
    pub pricing_page_url: String,
    pub commission_enabled: bool,
    pub commission_details_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LicensingInfo {
    pub license_key: String,
    pub license_url: String,
}

/// Structured self-description of a project.
///
/// Every field is optional on the wire; absent sections decode to their
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadmeProto {
    pub name: String,
    pub version: String,
    pub description: String,
    pub tags: BTreeSet<String>,
    pub communication_details: CommunicationDetails,
    pub security_info: SecurityInfo,
    pub monetization_info: MonetizationInfo,
    pub licensing_info: LicensingInfo,
}

impl ReadmeProto {
    /// Interfaces of the given transport
    pub fn interfaces(&self, kind: InterfaceType) -> impl Iterator<Item = &AccessInterface> {
        self.communication_details
            .access_interfaces
            .iter()
            .filter(move |iface| iface.kind == kind)
    }

    pub fn is_paid(&self) -> bool {
        matches!(
            self.monetization_info.model,
            MonetizationModel::Paid | MonetizationModel::Freemium
        )
    }
}

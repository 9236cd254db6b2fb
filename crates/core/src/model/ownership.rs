// Ownership blocks and their hierarchy-resolved form.
//
// Every field inherits independently from the nearest ancestor that defines
// it; the resolved form pairs each value with the path it was defined at.

use serde::{Deserialize, Serialize};

/// Ownership declared on a single catalog node.
///
/// The simplified triple (owner/specialist/channel) sits alongside the
/// formal governance triple (adop/ads/adal) and their human-readable names.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ownership {
    #[serde(default)]
    pub accountable_owner: Option<String>,
    #[serde(default)]
    pub data_specialist: Option<String>,
    #[serde(default)]
    pub support_channel: Option<String>,

    #[serde(default)]
    pub adop: Option<String>,
    #[serde(default)]
    pub ads: Option<String>,
    #[serde(default)]
    pub adal: Option<String>,
    #[serde(default)]
    pub adop_name: Option<String>,
    #[serde(default)]
    pub ads_name: Option<String>,
    #[serde(default)]
    pub adal_name: Option<String>,

    /// Link to a custom UI/dashboard for this node.
    #[serde(default)]
    pub ui: Option<String>,
}

impl Ownership {
    pub fn is_empty(&self) -> bool {
        self.accountable_owner.is_none()
            && self.data_specialist.is_none()
            && self.support_channel.is_none()
            && self.adop.is_none()
            && self.ads.is_none()
            && self.adal.is_none()
            && self.adop_name.is_none()
            && self.ads_name.is_none()
            && self.adal_name.is_none()
            && self.ui.is_none()
    }

    pub fn has_governance_roles(&self) -> bool {
        self.adop.is_some() || self.ads.is_some() || self.adal.is_some()
    }
}

/// Ownership resolved through the hierarchy, with per-field provenance.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolvedOwnership {
    pub accountable_owner: Option<String>,
    pub accountable_owner_source: Option<String>,

    pub data_specialist: Option<String>,
    pub data_specialist_source: Option<String>,

    pub support_channel: Option<String>,
    pub support_channel_source: Option<String>,

    pub adop: Option<String>,
    pub adop_source: Option<String>,
    pub adop_name: Option<String>,
    pub adop_name_source: Option<String>,

    pub ads: Option<String>,
    pub ads_source: Option<String>,
    pub ads_name: Option<String>,
    pub ads_name_source: Option<String>,

    pub adal: Option<String>,
    pub adal_source: Option<String>,
    pub adal_name: Option<String>,
    pub adal_name_source: Option<String>,

    pub ui: Option<String>,
    pub ui_source: Option<String>,
}

impl ResolvedOwnership {
    /// Overlay one node's ownership block. Fields the node defines overwrite
    /// both the running value and its provenance; undefined fields are left
    /// untouched.
    pub fn apply(&mut self, defined_at: &str, ownership: &Ownership) {
        if let Some(value) = &ownership.accountable_owner {
            self.accountable_owner = Some(value.clone());
            self.accountable_owner_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.data_specialist {
            self.data_specialist = Some(value.clone());
            self.data_specialist_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.support_channel {
            self.support_channel = Some(value.clone());
            self.support_channel_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.adop {
            self.adop = Some(value.clone());
            self.adop_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.ads {
            self.ads = Some(value.clone());
            self.ads_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.adal {
            self.adal = Some(value.clone());
            self.adal_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.adop_name {
            self.adop_name = Some(value.clone());
            self.adop_name_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.ads_name {
            self.ads_name = Some(value.clone());
            self.ads_name_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.adal_name {
            self.adal_name = Some(value.clone());
            self.adal_name_source = Some(defined_at.to_string());
        }
        if let Some(value) = &ownership.ui {
            self.ui = Some(value.clone());
            self.ui_source = Some(defined_at.to_string());
        }
    }
}

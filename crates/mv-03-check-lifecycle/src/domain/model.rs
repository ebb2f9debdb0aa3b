//! Provider-native check resource, as returned by the REST API.

use serde::{Deserialize, Serialize};

/// A check resource. Fields a given check kind does not carry are `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCheck {
    pub check_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(rename = "match", default)]
    pub matched: Option<bool>,
    #[serde(default)]
    pub no_sim_change: Option<bool>,
    #[serde(default)]
    pub last_sim_change_at: Option<String>,
    #[serde(rename = "_links", default)]
    pub links: Option<ProviderLinks>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLinks {
    #[serde(default)]
    pub check_url: Option<Link>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
}

impl ProviderCheck {
    pub fn check_url(&self) -> Option<&str> {
        self.links
            .as_ref()
            .and_then(|l| l.check_url.as_ref())
            .map(|l| l.href.as_str())
    }
}

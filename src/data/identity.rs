use serde::{Deserialize, Serialize};

use crate::codec::base64url;

/// The relying party's own identity, sent in creation options.
///
/// `id` must be a registrable domain suffix of every configured origin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RpIdentity {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
}

impl RpIdentity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), icon: None }
    }
}

/// A user account as the authenticator will see it. `id` is the user
/// handle: 1..=64 opaque bytes, persistent across credential registrations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    #[serde(with = "base64url::bytes")]
    pub id: Vec<u8>,
    pub name: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub icon: Option<String>,
}

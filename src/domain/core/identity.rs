use bon::Builder;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::error::MwaError;

/// The identity a dapp presents when requesting authorization.
///
/// All fields are optional, but when present they must satisfy the
/// protocol's constraints: `uri` absolute and hierarchical, `icon` a
/// relative URI (resolved against `uri`), `name` non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
pub struct Identity {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<Url>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Identity {
    /// Validate the identity constraints.
    pub fn validate(&self) -> Result<(), MwaError> {
        if let Some(uri) = &self.uri {
            if uri.cannot_be_a_base() {
                return Err(MwaError::InvalidParams(
                    "identity.uri must be an absolute, hierarchical URI".to_string(),
                ));
            }
        }
        if let Some(icon) = &self.icon {
            match Url::parse(icon) {
                Err(url::ParseError::RelativeUrlWithoutBase) => {}
                _ => {
                    return Err(MwaError::InvalidParams(
                        "identity.icon must be a relative URI".to_string(),
                    ));
                }
            }
        }
        if let Some(name) = &self.name {
            if name.is_empty() {
                return Err(MwaError::InvalidParams(
                    "identity.name must be a non-empty string".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Resolve the icon URI against the identity URI, when both are present.
    pub fn resolve_icon(&self) -> Option<Url> {
        let uri = self.uri.as_ref()?;
        let icon = self.icon.as_ref()?;
        uri.join(icon).ok()
    }
}

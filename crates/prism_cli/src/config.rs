//! Configuration file for the CLI.
//!
//! ```json
//! {
//!   "projector": {"wrapping": "bare", "order_key": "published_at"},
//!   "permissions": ["title", {"posts": ["content"]}]
//! }
//! ```
//!
//! Both sections are optional. A missing `permissions` section (or
//! `null`) leaves every field selectable.

use prism_core::{PrismError, PrismResult};
use prism_policy::PermissionTree;
use prism_project::{CollectionWrapping, ProjectorConfig};
use serde::Deserialize;
use std::path::Path;

/// Contents of a `--config` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Projector settings
    pub projector: ProjectorConfig,
    /// Allow-list for every projection
    pub permissions: PermissionTree,
}

impl FileConfig {
    /// Load a config file
    ///
    /// # Errors
    ///
    /// Returns [`PrismError::InvalidConfig`] if the file cannot be read
    /// or does not describe a valid configuration.
    pub fn load(path: &Path) -> PrismResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|err| PrismError::InvalidConfig {
            reason: format!("cannot read {}: {}", path.display(), err),
        })?;
        serde_json::from_str(&text).map_err(|err| PrismError::InvalidConfig {
            reason: format!("{}: {}", path.display(), err),
        })
    }

    /// Load `path` if given, otherwise use the defaults
    ///
    /// # Errors
    ///
    /// As [`FileConfig::load`].
    pub fn load_or_default(path: Option<&Path>) -> PrismResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Root collection wrapping
    pub wrapping: Option<CollectionWrapping>,
    /// Ordering key
    pub order_key: Option<String>,
    /// Suppress denied-field diagnostics
    pub quiet_denied: bool,
}

impl Overrides {
    /// Apply to a projector configuration
    #[must_use]
    pub fn apply(self, mut config: ProjectorConfig) -> ProjectorConfig {
        if let Some(wrapping) = self.wrapping {
            config.wrapping = wrapping;
        }
        if let Some(order_key) = self.order_key {
            config.order_key = order_key;
        }
        if self.quiet_denied {
            config.diagnose_denied_fields = false;
        }
        config
    }
}

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Name of the preset used when a source names no theme or an unknown one.
pub const DEFAULT_PRESET: &str = "default";

/// Selector rules for one site theme.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Preset {
    pub friends_page: Option<FriendsPageRule>,
}

/// Extraction expressions for a friends listing page.
///
/// `item` is a CSS selector for each friend's container; the other fields
/// are attribute-extraction expressions evaluated against that container
/// (see [`crate::friends::Expression`]).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FriendsPageRule {
    pub item: String,
    pub name: String,
    pub link: String,
    pub avatar: String,
}

/// All presets from `rules.yaml`, keyed by preset name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Rules {
    pub presets: BTreeMap<String, Preset>,
}

impl Rules {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::from_yaml(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    pub fn from_yaml(content: &str) -> Result<Self, serde_yaml::Error> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content)
    }

    pub fn with_preset(mut self, name: impl Into<String>, preset: Preset) -> Self {
        self.presets.insert(name.into(), preset);
        self
    }

    /// Find the preset for a theme name.
    ///
    /// Lookup order: exact name, case-insensitive name, `default`, then the
    /// first preset by name. An empty theme is treated as `default`.
    pub fn preset(&self, theme: &str) -> Option<&Preset> {
        let theme = if theme.trim().is_empty() {
            DEFAULT_PRESET
        } else {
            theme.trim()
        };

        self.presets
            .get(theme)
            .or_else(|| {
                self.presets
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(theme))
                    .map(|(_, preset)| preset)
            })
            .or_else(|| self.presets.get(DEFAULT_PRESET))
            .or_else(|| self.presets.values().next())
    }
}

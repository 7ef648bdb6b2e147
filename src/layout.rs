//! Gate layouts: which subtrees are gated and which opt out.
//!
//! A layout is declared once, either in code through [`GateLayout::builder`]
//! or from YAML:
//!
//! ```yaml
//! default: guarded
//! subtrees:
//!   - path: /auth/reset-password
//!     gate: none
//! table:
//!   admin_subtree: /admin
//! ```
//!
//! The most specific declared subtree wins. Paths nobody declared are
//! guarded.

use std::path::Path;

use serde::Deserialize;

use crate::error::LayoutError;
use crate::paths;
use crate::table::TableConfig;
use crate::target::{is_within, normalize_path};

/// Whether a subtree runs the gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GateMode {
    /// Resolve the session and consult the decision table.
    #[default]
    Guarded,
    /// Render without looking at the session.
    #[serde(alias = "none")]
    Open,
}

/// Subtree declarations, most specific first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateLayout {
    default: GateMode,
    subtrees: Vec<(String, GateMode)>,
}

impl GateLayout {
    /// Start building a layout. Undeclared paths are guarded.
    pub fn builder() -> GateLayoutBuilder {
        GateLayoutBuilder::default()
    }

    /// The layout used when none is configured.
    ///
    /// Sign-in and the password-recovery pages are open. Everything else
    /// is guarded.
    pub fn standard() -> Self {
        GateLayout {
            default: GateMode::Guarded,
            subtrees: sorted(vec![
                (paths::SIGN_IN.to_string(), GateMode::Open),
                (paths::FORGOT_PASSWORD.to_string(), GateMode::Open),
                (paths::RESET_PASSWORD.to_string(), GateMode::Open),
            ]),
        }
    }

    /// The gate mode governing `path`.
    pub fn mode_for(&self, path: &str) -> GateMode {
        self.subtrees
            .iter()
            .find(|(root, _)| is_within(root, path))
            .map(|(_, mode)| *mode)
            .unwrap_or(self.default)
    }

    /// Declared subtrees, most specific first.
    pub fn subtrees(&self) -> impl Iterator<Item = (&str, GateMode)> {
        self.subtrees.iter().map(|(root, mode)| (root.as_str(), *mode))
    }
}

impl Default for GateLayout {
    fn default() -> Self {
        GateLayout::standard()
    }
}

/// Builder for [`GateLayout`].
#[derive(Debug, Default)]
pub struct GateLayoutBuilder {
    default: GateMode,
    subtrees: Vec<(String, GateMode)>,
}

impl GateLayoutBuilder {
    /// Mode for paths no subtree declares.
    pub fn default_mode(mut self, mode: GateMode) -> Self {
        self.default = mode;
        self
    }

    /// Declare a subtree with the given mode.
    pub fn subtree(mut self, path: impl Into<String>, mode: GateMode) -> Self {
        self.subtrees.push((path.into(), mode));
        self
    }

    /// Declare a subtree that opts out of gating.
    pub fn open(self, path: impl Into<String>) -> Self {
        self.subtree(path, GateMode::Open)
    }

    /// Declare a gated subtree, e.g. to re-guard part of an open one.
    pub fn guarded(self, path: impl Into<String>) -> Self {
        self.subtree(path, GateMode::Guarded)
    }

    /// Validate the declarations and build the layout.
    pub fn build(self) -> Result<GateLayout, LayoutError> {
        let mut subtrees = Vec::with_capacity(self.subtrees.len());
        for (path, mode) in self.subtrees {
            if !path.starts_with('/') {
                return Err(LayoutError::RelativePath(path));
            }
            let root = normalize_path(&path).into_owned();
            if subtrees.iter().any(|(existing, _): &(String, GateMode)| *existing == root) {
                return Err(LayoutError::DuplicateSubtree(root));
            }
            subtrees.push((root, mode));
        }

        Ok(GateLayout {
            default: self.default,
            subtrees: sorted(subtrees),
        })
    }
}

/// Longest roots first so the first containing root is the most specific.
fn sorted(mut subtrees: Vec<(String, GateMode)>) -> Vec<(String, GateMode)> {
    subtrees.sort_by(|(a, _), (b, _)| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    subtrees
}

/// Routing configuration as it appears in a layout file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
struct LayoutFile {
    #[serde(default)]
    default: GateMode,
    #[serde(default)]
    subtrees: Vec<SubtreeEntry>,
    #[serde(default)]
    table: TableConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct SubtreeEntry {
    path: String,
    gate: GateMode,
}

/// A loaded layout file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutingConfig {
    /// Which subtrees are gated.
    pub layout: GateLayout,
    /// Which paths the decision table matches.
    pub table: TableConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        RoutingConfig {
            layout: GateLayout::standard(),
            table: TableConfig::default(),
        }
    }
}

/// Load routing configuration from a YAML file.
pub fn load_routing_file(path: &Path) -> Result<RoutingConfig, LayoutError> {
    let contents = std::fs::read_to_string(path)?;
    parse_routing(&contents)
}

/// Parse routing configuration from a YAML string.
pub fn parse_routing(yaml: &str) -> Result<RoutingConfig, LayoutError> {
    let file: LayoutFile = serde_yaml::from_str(yaml)?;

    let layout = file
        .subtrees
        .into_iter()
        .fold(GateLayout::builder().default_mode(file.default), |builder, entry| {
            builder.subtree(entry.path, entry.gate)
        })
        .build()?;

    Ok(RoutingConfig {
        layout,
        table: file.table,
    })
}

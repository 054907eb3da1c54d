use std::path::PathBuf;

/// Configuration for [`crate::Dsl::from_config`].
///
/// The expansion ceilings are fixed constants
/// ([`crate::template::MAX_PASSES`], [`crate::template::MAX_REPLACEMENTS`])
/// and are not part of the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Directory of component templates. Default: **none**, which disables
    /// include expansion.
    pub components_dir: Option<PathBuf>,

    /// File extension of component templates, without the dot.
    /// Default: **"skx"**.
    pub template_extension: String,

    /// Register the `Button`, `Card` and `Header` factories. Default: **true**.
    pub builtin_factories: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            components_dir: None,
            template_extension: "skx".to_string(),
            builtin_factories: true,
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn with_components_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.components_dir = Some(dir.into());
        self
    }
}

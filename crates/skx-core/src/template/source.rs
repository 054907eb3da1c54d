//! Where component templates come from.
//!
//! Templates are loaded once, eagerly, into a [`TemplateRegistry`]. The
//! engine never touches the filesystem itself; hosts pick a source.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Supplies component templates as `(name, body)` pairs.
///
/// - `DirectorySource`: one `<Name>.<ext>` file per component
/// - `MemorySource`: bodies held in memory (tests, embedding)
pub trait TemplateSource {
    fn load_all(&self) -> Vec<(String, String)>;
}

/// Reads every `*.skx` (or configured extension) file in a directory;
/// the file stem is the component name.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    dir: PathBuf,
    extension: String,
}

impl DirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            extension: "skx".to_string(),
        }
    }

    #[must_use]
    pub fn with_extension(mut self, extension: &str) -> Self {
        self.extension = extension.trim_start_matches('.').to_string();
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn matches_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }
}

impl TemplateSource for DirectorySource {
    fn load_all(&self) -> Vec<(String, String)> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(err) => {
                log::warn!(
                    "component directory {} is unavailable ({err}); no templates loaded",
                    self.dir.display()
                );
                return Vec::new();
            }
        };

        let mut templates = Vec::new();
        for entry in entries.flatten() {
            let path = entry.path();
            if !path.is_file() || !self.matches_extension(&path) {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            match fs::read_to_string(&path) {
                Ok(body) => templates.push((name.to_string(), body)),
                Err(err) => log::warn!("skipping template {}: {err}", path.display()),
            }
        }
        templates.sort_by(|a, b| a.0.cmp(&b.0));
        log::debug!(
            "loaded {} template(s) from {}",
            templates.len(),
            self.dir.display()
        );
        templates
    }
}

/// Template bodies held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    templates: Vec<(String, String)>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, name: &str, body: &str) -> Self {
        self.insert(name, body);
        self
    }

    pub fn insert(&mut self, name: &str, body: &str) {
        self.templates.push((name.to_string(), body.to_string()));
    }
}

impl<N: Into<String>, B: Into<String>> FromIterator<(N, B)> for MemorySource {
    fn from_iter<T: IntoIterator<Item = (N, B)>>(iter: T) -> Self {
        Self {
            templates: iter
                .into_iter()
                .map(|(n, b)| (n.into(), b.into()))
                .collect(),
        }
    }
}

impl TemplateSource for MemorySource {
    fn load_all(&self) -> Vec<(String, String)> {
        self.templates.clone()
    }
}

// ─── Registry ────────────────────────────────────────────────────────────

/// Component bodies by case-insensitive name. Bodies are stored trimmed.
#[derive(Debug, Clone, Default)]
pub struct TemplateRegistry {
    templates: HashMap<String, String>,
}

impl TemplateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_source(source: &dyn TemplateSource) -> Self {
        let mut registry = Self::new();
        for (name, body) in source.load_all() {
            registry.insert(&name, &body);
        }
        registry
    }

    /// Add or replace a template.
    pub fn insert(&mut self, name: &str, body: &str) {
        let key = name.to_ascii_lowercase();
        if self
            .templates
            .insert(key, body.trim().to_string())
            .is_some()
        {
            log::warn!("template {name:?} defined more than once; keeping the last definition");
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.templates
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.templates.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn registry_lookup_ignores_case() {
        let source = MemorySource::new().with("NavBar", "  <view/>\n");
        let registry = TemplateRegistry::from_source(&source);
        assert_eq!(registry.get("navbar"), Some("<view/>"));
        assert!(registry.contains("NAVBAR"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn later_definition_wins() {
        let source: MemorySource = [("Card", "<view/>"), ("card", "<box/>")].into_iter().collect();
        let registry = TemplateRegistry::from_source(&source);
        assert_eq!(registry.get("Card"), Some("<box/>"));
    }

    #[test]
    fn directory_source_reads_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Card.skx"), "<view>{title}</view>").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        fs::create_dir(dir.path().join("nested.skx")).unwrap();

        let loaded = DirectorySource::new(dir.path()).load_all();
        assert_eq!(
            loaded,
            vec![("Card".to_string(), "<view>{title}</view>".to_string())]
        );
    }

    #[test]
    fn custom_extension() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("Badge.tpl"), "<circle/>").unwrap();
        let source = DirectorySource::new(dir.path()).with_extension(".tpl");
        let registry = TemplateRegistry::from_source(&source);
        assert!(registry.contains("badge"));
    }

    #[test]
    fn missing_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let source = DirectorySource::new(dir.path().join("does-not-exist"));
        assert!(source.load_all().is_empty());
    }
}

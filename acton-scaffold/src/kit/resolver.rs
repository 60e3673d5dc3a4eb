//! Kit cascade resolution with a per-resolver cache

use super::{
    DirectorySource, EmbeddedSource, Kit, KitError, KitInfo, KitManifest, KitSource, KitTier,
    MANIFEST_FILE,
};
use crate::styling::StrategyRegistry;
use parking_lot::RwLock;
use similar::TextDiff;
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Kits already loaded by a resolver, keyed by name
#[derive(Debug, Default)]
pub struct KitCache {
    kits: RwLock<HashMap<String, Arc<Kit>>>,
}

impl KitCache {
    /// Cached kit
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<Kit>> {
        self.kits.read().get(name).cloned()
    }

    /// Store a loaded kit
    pub fn insert(&self, kit: Arc<Kit>) {
        self.kits.write().insert(kit.name().to_string(), kit);
    }

    /// Drop every cached kit
    pub fn clear(&self) {
        self.kits.write().clear();
    }

    /// Number of cached kits
    #[must_use]
    pub fn len(&self) -> usize {
        self.kits.read().len()
    }

    /// Whether nothing is cached
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.kits.read().is_empty()
    }
}

/// A template body and the tier it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTemplate {
    /// Template path relative to the kit root
    pub path: String,
    /// Template source
    pub body: String,
    /// Tier that supplied it
    pub tier: KitTier,
}

/// A kit visible through the cascade
#[derive(Debug, Clone)]
pub struct KitListing {
    /// Kit name
    pub name: String,
    /// Tier supplying the manifest
    pub tier: KitTier,
    /// Lower tiers that also carry a manifest for this kit
    pub shadowed: Vec<KitTier>,
    /// Loaded kit, or the reason it failed to load
    pub kit: Result<Arc<Kit>, String>,
}

/// Resolves kits and templates across an ordered list of sources
///
/// Sources are searched front to back and the first hit wins.
#[derive(Debug)]
pub struct KitResolver {
    sources: Vec<Box<dyn KitSource>>,
    strategies: StrategyRegistry,
    cache: KitCache,
}

impl KitResolver {
    /// Standard cascade: project, user, built-in
    #[must_use]
    pub fn new(project_kits: impl Into<PathBuf>, user_kits: Option<PathBuf>) -> Self {
        let mut sources: Vec<Box<dyn KitSource>> =
            vec![Box::new(DirectorySource::new(project_kits, KitTier::Project))];
        if let Some(user) = user_kits.or_else(Self::user_kits_dir) {
            sources.push(Box::new(DirectorySource::new(user, KitTier::User)));
        }
        sources.push(Box::new(EmbeddedSource));
        Self::with_sources(sources)
    }

    /// Resolver over an explicit list of sources
    #[must_use]
    pub fn with_sources(sources: Vec<Box<dyn KitSource>>) -> Self {
        Self {
            sources,
            strategies: StrategyRegistry::default(),
            cache: KitCache::default(),
        }
    }

    /// Replace the strategy registry used for validation and binding
    #[must_use]
    pub fn with_strategies(mut self, strategies: StrategyRegistry) -> Self {
        self.strategies = strategies;
        self.cache.clear();
        self
    }

    /// User-global kit directory
    ///
    /// Returns `$XDG_CONFIG_HOME/acton-scaffold/kits/`, falling back to the
    /// platform config directory.
    #[must_use]
    pub fn user_kits_dir() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .filter(|path| path.is_absolute())
            .or_else(dirs::config_dir)?;
        Some(base.join("acton-scaffold").join("kits"))
    }

    /// Add a directory searched before every existing source
    ///
    /// Clears the kit cache.
    pub fn add_search_path(&mut self, root: impl AsRef<Path>, tier: KitTier) {
        self.sources
            .insert(0, Box::new(DirectorySource::new(root.as_ref(), tier)));
        self.cache.clear();
        tracing::debug!(path = %root.as_ref().display(), %tier, "Added kit search path");
    }

    /// Strategy registry
    #[must_use]
    pub const fn strategies(&self) -> &StrategyRegistry {
        &self.strategies
    }

    /// The resolver's cache
    #[must_use]
    pub const fn cache(&self) -> &KitCache {
        &self.cache
    }

    /// Load and validate a kit's manifest
    ///
    /// # Errors
    ///
    /// Returns [`KitError::NotFound`] when no source has a manifest and
    /// [`KitError::InvalidManifest`] when the winning manifest is invalid.
    pub fn load(&self, name: &str) -> Result<Arc<Kit>, KitError> {
        if let Some(kit) = self.cache.get(name) {
            return Ok(kit);
        }

        for source in &self.sources {
            let Some(body) = source.read(name, MANIFEST_FILE)? else {
                continue;
            };
            let (manifest, version) = KitManifest::parse(&body, name, &self.strategies)?;
            tracing::debug!(kit = %name, tier = %source.tier(), "Kit manifest resolved");
            let kit = Arc::new(Kit::new(
                manifest,
                version,
                source.tier(),
                source.location(name),
            ));
            self.cache.insert(Arc::clone(&kit));
            return Ok(kit);
        }

        Err(KitError::NotFound(name.to_string()))
    }

    /// Load a kit and bind its styling strategy
    ///
    /// # Errors
    ///
    /// Returns loading errors and the binding errors of [`Kit::bind`].
    pub fn resolve(&self, name: &str, strategy: Option<&str>) -> Result<KitInfo, KitError> {
        self.load(name)?.bind(strategy, &self.strategies)
    }

    /// Resolve one template of a kit
    ///
    /// Each template path walks the cascade on its own.
    ///
    /// # Errors
    ///
    /// Returns [`KitError::TemplateNotFound`] when no source has the file.
    pub fn resolve_template(&self, kit: &str, path: &str) -> Result<ResolvedTemplate, KitError> {
        self.find_template(kit, path)?
            .ok_or_else(|| KitError::TemplateNotFound {
                kit: kit.to_string(),
                template: path.to_string(),
            })
    }

    /// Resolve a component (`components/<name>.html`)
    ///
    /// # Errors
    ///
    /// Returns [`KitError::ComponentNotFound`] when no source has the file.
    pub fn resolve_component(&self, kit: &str, name: &str) -> Result<ResolvedTemplate, KitError> {
        self.find_template(kit, &format!("components/{name}.html"))?
            .ok_or_else(|| KitError::ComponentNotFound {
                kit: kit.to_string(),
                component: name.to_string(),
            })
    }

    /// Tier a template resolves from
    ///
    /// # Errors
    ///
    /// Returns [`KitError::TemplateNotFound`] when no source has the file.
    pub fn template_origin(&self, kit: &str, path: &str) -> Result<KitTier, KitError> {
        self.resolve_template(kit, path).map(|template| template.tier)
    }

    /// Unified diff between the winning template and the one it shadows
    ///
    /// Returns `None` when only one tier provides the template.
    ///
    /// # Errors
    ///
    /// Returns [`KitError::TemplateNotFound`] when no source has the file.
    pub fn diff_template(&self, kit: &str, path: &str) -> Result<Option<String>, KitError> {
        let mut hits = Vec::new();
        for source in &self.sources {
            if let Some(body) = source.read(kit, path)? {
                hits.push((source.tier(), body));
                if hits.len() == 2 {
                    break;
                }
            }
        }

        let mut hits = hits.into_iter();
        let Some((winner_tier, winner)) = hits.next() else {
            return Err(KitError::TemplateNotFound {
                kit: kit.to_string(),
                template: path.to_string(),
            });
        };
        let Some((base_tier, base)) = hits.next() else {
            return Ok(None);
        };

        let diff = TextDiff::from_lines(&base, &winner)
            .unified_diff()
            .context_radius(3)
            .header(
                &format!("{base_tier}/{kit}/{path}"),
                &format!("{winner_tier}/{kit}/{path}"),
            )
            .to_string();
        Ok(Some(diff))
    }

    /// Every kit visible across the cascade, sorted by name
    ///
    /// # Errors
    ///
    /// Returns an error when a directory source cannot be enumerated.
    pub fn list_kits(&self) -> Result<Vec<KitListing>, KitError> {
        let mut tiers: BTreeMap<String, Vec<KitTier>> = BTreeMap::new();
        for source in &self.sources {
            for name in source.kit_names()? {
                tiers.entry(name).or_default().push(source.tier());
            }
        }

        Ok(tiers
            .into_iter()
            .map(|(name, mut found)| {
                let tier = found.remove(0);
                let kit = self.load(&name).map_err(|e| e.to_string());
                KitListing {
                    name,
                    tier,
                    shadowed: found,
                    kit,
                }
            })
            .collect())
    }

    fn find_template(&self, kit: &str, path: &str) -> Result<Option<ResolvedTemplate>, KitError> {
        for source in &self.sources {
            if let Some(body) = source.read(kit, path)? {
                tracing::debug!(kit = %kit, template = %path, tier = %source.tier(), "Template resolved");
                return Ok(Some(ResolvedTemplate {
                    path: path.to_string(),
                    body,
                    tier: source.tier(),
                }));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(root: &Path, rel: &str, body: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, body).unwrap();
    }

    fn resolver(project: &TempDir, user: &TempDir) -> KitResolver {
        KitResolver::new(project.path(), Some(user.path().to_path_buf()))
    }

    #[test]
    fn test_builtin_default_kit() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let kit = resolver(&project, &user).load("default").unwrap();
        assert_eq!(kit.tier(), KitTier::BuiltIn);
        assert_eq!(kit.location(), "builtin:default");
    }

    #[test]
    fn test_not_found() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let err = resolver(&project, &user).load("nope").unwrap_err();
        assert!(matches!(err, KitError::NotFound(name) if name == "nope"));
    }

    #[test]
    fn test_cache_hit_and_invalidation() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let mut resolver = resolver(&project, &user);
        resolver.load("default").unwrap();
        assert_eq!(resolver.cache().len(), 1);

        let extra = TempDir::new().unwrap();
        write(
            extra.path(),
            "default/kit.toml",
            "name = \"default\"\nversion = \"9.0.0\"\nstyling = \"classless\"",
        );
        resolver.add_search_path(extra.path(), KitTier::Project);
        assert!(resolver.cache().is_empty());
        assert_eq!(resolver.load("default").unwrap().version().major, 9);
    }

    #[test]
    fn test_diff_against_shadowed_template() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write(user.path(), "default/view/tests.rs", "// customised\n");
        let resolver = resolver(&project, &user);

        let diff = resolver.diff_template("default", "view/tests.rs").unwrap().unwrap();
        assert!(diff.contains("+// customised"));
        assert!(diff.contains("built-in/default/view/tests.rs"));
        assert!(resolver.diff_template("default", "view/handler.rs").unwrap().is_none());
    }

    #[test]
    fn test_list_kits_reports_shadowing() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        write(
            project.path(),
            "default/kit.toml",
            "name = \"default\"\nversion = \"2.0.0\"\nstyling = \"bootstrap\"",
        );
        write(project.path(), "broken/kit.toml", "name = \"wrong\"");

        let listings = resolver(&project, &user).list_kits().unwrap();
        let names: Vec<&str> = listings.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["broken", "default"]);

        let default = &listings[1];
        assert_eq!(default.tier, KitTier::Project);
        assert_eq!(default.shadowed, vec![KitTier::BuiltIn]);
        assert!(listings[0].kit.is_err());
    }
}

//! Plugin discovery
//!
//! Scans `plugins/<category>/<plugin>/info.json` and builds a
//! [`PluginCatalog`]. A broken plugin is logged and left out; it never
//! stops its siblings from being discovered.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};
use tokio::fs;
use tokio::task::JoinSet;
use ts_rs::TS;

use crate::config::MANIFEST_FILE;
use crate::shared::error::{AppError, AppResult};
use crate::shared::types::{Category, ServiceIdentifier};

/// A configuration field a plugin asks the user to fill in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct PluginNeed {
    pub key: String,
    pub display: String,
    #[serde(rename = "type", default = "default_need_kind")]
    pub kind: String,
}

fn default_need_kind() -> String {
    "input".to_string()
}

/// `info.json` as written by plugin authors
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default)]
    id: Option<String>,
    display: String,
    #[serde(default)]
    icon: Option<String>,
    #[serde(default)]
    homepage: Option<String>,
    #[serde(default)]
    needs: Vec<PluginNeed>,
    #[serde(default)]
    language: HashMap<String, String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct PluginManifest {
    pub identifier: ServiceIdentifier,
    pub category: Category,
    pub display: String,
    /// Id declared inside the manifest, informational only
    pub declared_id: Option<String>,
    /// Asset URI of the icon, ready for the webview
    pub icon: Option<String>,
    pub homepage: Option<String>,
    pub needs: Vec<PluginNeed>,
    /// App language key -> plugin language code
    pub language: HashMap<String, String>,
}

/// category -> identifier -> manifest. Rebuilt wholesale on every pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export, export_to = "../../src/types/services.ts")]
pub struct PluginCatalog(BTreeMap<Category, BTreeMap<ServiceIdentifier, PluginManifest>>);

impl PluginCatalog {
    pub fn plugins(&self, category: Category) -> impl Iterator<Item = &PluginManifest> {
        self.0.get(&category).into_iter().flat_map(|plugins| plugins.values())
    }

    pub fn get(&self, category: Category, identifier: &ServiceIdentifier) -> Option<&PluginManifest> {
        self.0.get(&category).and_then(|plugins| plugins.get(identifier))
    }

    pub fn contains(&self, category: Category, identifier: &ServiceIdentifier) -> bool {
        self.get(category, identifier).is_some()
    }

    pub fn len(&self, category: Category) -> usize {
        self.0.get(&category).map_or(0, BTreeMap::len)
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.0.contains_key(&category)
    }
}

/// The catalog every service list reads. Lists rescan only their own
/// category; the rescan is merged in and published as a new snapshot.
#[derive(Clone)]
pub struct SharedCatalog {
    plugins_root: PathBuf,
    current: Arc<RwLock<Arc<PluginCatalog>>>,
}

impl SharedCatalog {
    pub fn new(plugins_root: impl Into<PathBuf>) -> Self {
        Self {
            plugins_root: plugins_root.into(),
            current: Arc::new(RwLock::new(Arc::new(PluginCatalog::default()))),
        }
    }

    pub fn snapshot(&self) -> Arc<PluginCatalog> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Rediscover `categories` and replace exactly those entries
    pub async fn reload(&self, categories: &[Category]) -> Arc<PluginCatalog> {
        let PluginCatalog(mut fresh) = discover_plugins(&self.plugins_root, categories).await;
        let mut guard = match self.current.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let mut next = guard.as_ref().clone();
        for category in categories {
            next.0.insert(*category, fresh.remove(category).unwrap_or_default());
        }
        *guard = Arc::new(next);
        guard.clone()
    }
}

/// Build a fresh catalog for `categories` under `plugins_root`.
///
/// Every requested category gets an entry, empty when its directory is
/// missing or unreadable. Manifests are read concurrently; the catalog is
/// only returned once all reads finished.
pub async fn discover_plugins(plugins_root: &Path, categories: &[Category]) -> PluginCatalog {
    let mut catalog = BTreeMap::new();
    for &category in categories {
        let plugins = discover_category(&plugins_root.join(category.as_str()), category).await;
        log::info!("[Plugins] {} plugin(s) found for {}", plugins.len(), category);
        catalog.insert(category, plugins);
    }
    PluginCatalog(catalog)
}

async fn discover_category(dir: &Path, category: Category) -> BTreeMap<ServiceIdentifier, PluginManifest> {
    let mut plugins = BTreeMap::new();
    if !fs::try_exists(dir).await.unwrap_or(false) {
        return plugins;
    }

    let mut entries = match fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("[Plugins] Failed to read {}: {}", dir.display(), e);
            return plugins;
        }
    };

    let mut plugin_dirs = Vec::new();
    loop {
        match entries.next_entry().await {
            Ok(Some(entry)) => {
                let is_dir = entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false);
                if is_dir {
                    plugin_dirs.push((entry.file_name().to_string_lossy().into_owned(), entry.path()));
                }
            }
            Ok(None) => break,
            Err(e) => {
                log::warn!("[Plugins] Stopped listing {}: {}", dir.display(), e);
                break;
            }
        }
    }
    // Deterministic winner when two directories normalise to one identifier
    plugin_dirs.sort();

    let mut reads = JoinSet::new();
    for (index, (name, path)) in plugin_dirs.into_iter().enumerate() {
        reads.spawn(async move { (index, load_plugin(&path, &name, category).await) });
    }

    let mut loaded = Vec::new();
    while let Some(joined) = reads.join_next().await {
        match joined {
            Ok((index, Ok(manifest))) => loaded.push((index, manifest)),
            Ok((_, Err(e))) => log::warn!("[Plugins] Skipping plugin: {}", e),
            Err(e) => log::warn!("[Plugins] Manifest task failed: {}", e),
        }
    }
    loaded.sort_by_key(|(index, _)| *index);

    for (_, manifest) in loaded {
        if plugins.contains_key(&manifest.identifier) {
            log::warn!("[Plugins] Duplicate plugin identifier {}, keeping the first", manifest.identifier);
            continue;
        }
        plugins.insert(manifest.identifier.clone(), manifest);
    }
    plugins
}

async fn load_plugin(plugin_dir: &Path, name: &str, category: Category) -> AppResult<PluginManifest> {
    let manifest_path = plugin_dir.join(MANIFEST_FILE);
    let content = fs::read_to_string(&manifest_path).await
        .map_err(|e| AppError::Manifest(format!("{}: {}", manifest_path.display(), e)))?;
    let raw: RawManifest = serde_json::from_str(&content)
        .map_err(|e| AppError::Manifest(format!("{}: {}", manifest_path.display(), e)))?;

    let icon = match raw.icon.as_deref() {
        Some(relative) => match resolve_icon(plugin_dir, relative) {
            Some(path) => Some(asset_uri(&path)),
            None => {
                log::warn!("[Plugins] Icon '{}' escapes {}, ignoring it", relative, plugin_dir.display());
                None
            }
        },
        None => None,
    };

    Ok(PluginManifest {
        identifier: ServiceIdentifier::plugin(name),
        category,
        display: raw.display,
        declared_id: raw.id,
        icon,
        homepage: raw.homepage,
        needs: raw.needs,
        language: raw.language,
    })
}

/// Absolute path of `relative` inside `plugin_dir`, or `None` if it would
/// leave the plugin directory
fn resolve_icon(plugin_dir: &Path, relative: &str) -> Option<PathBuf> {
    let relative = Path::new(relative);
    if relative.as_os_str().is_empty()
        || !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return None;
    }
    let joined = plugin_dir.join(relative);
    Some(std::path::absolute(&joined).unwrap_or(joined))
}

/// Webview-loadable URI for a local file, the same shape Tauri's
/// `convertFileSrc` produces for the `asset` protocol
pub fn asset_uri(path: &Path) -> String {
    let encoded = urlencoding::encode(&path.to_string_lossy()).into_owned();
    if cfg!(any(windows, target_os = "android")) {
        format!("http://asset.localhost/{}", encoded)
    } else {
        format!("asset://localhost/{}", encoded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;

    fn write_plugin(root: &Path, category: &str, name: &str, manifest: &str) -> PathBuf {
        let dir = root.join(category).join(name);
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(MANIFEST_FILE), manifest).unwrap();
        dir
    }

    #[tokio::test]
    async fn malformed_manifest_is_skipped() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "translate", "[plugin]good", r#"{ "display": "Good" }"#);
        write_plugin(root.path(), "translate", "[plugin]broken", r#"{ "display": "#);

        let catalog = discover_plugins(root.path(), &[Category::Translate]).await;

        assert_eq!(catalog.len(Category::Translate), 1);
        let good = catalog
            .get(Category::Translate, &ServiceIdentifier::new("[plugin]good"))
            .unwrap();
        assert_eq!(good.display, "Good");
    }

    #[tokio::test]
    async fn missing_manifest_is_skipped() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "tts", "[plugin]speak", r#"{ "display": "Speak" }"#);
        std::fs::create_dir_all(root.path().join("tts").join("[plugin]empty")).unwrap();

        let catalog = discover_plugins(root.path(), &[Category::Tts]).await;
        assert_eq!(catalog.len(Category::Tts), 1);
    }

    #[tokio::test]
    async fn missing_category_dir_yields_empty_mapping() {
        let root = tempdir().unwrap();
        let catalog = discover_plugins(root.path(), &Category::ALL).await;
        for category in Category::ALL {
            assert!(catalog.has_category(category));
            assert_eq!(catalog.len(category), 0);
        }
    }

    #[tokio::test]
    async fn stray_files_are_not_plugins() {
        let root = tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("translate")).unwrap();
        std::fs::write(root.path().join("translate").join("README.md"), "hi").unwrap();
        let catalog = discover_plugins(root.path(), &[Category::Translate]).await;
        assert_eq!(catalog.len(Category::Translate), 0);
    }

    #[tokio::test]
    async fn icon_resolves_to_asset_uri_inside_plugin_dir() {
        let root = tempdir().unwrap();
        let dir = write_plugin(
            root.path(),
            "recognize",
            "[plugin]ocr",
            r#"{ "display": "OCR", "icon": "ocr.svg", "needs": [{ "key": "token", "display": "Token" }] }"#,
        );

        let catalog = discover_plugins(root.path(), &[Category::Recognize]).await;
        let ocr = catalog
            .get(Category::Recognize, &ServiceIdentifier::new("[plugin]ocr"))
            .unwrap();

        assert_eq!(ocr.icon, Some(asset_uri(&dir.join("ocr.svg"))));
        assert_eq!(ocr.needs[0].kind, "input");
    }

    #[tokio::test]
    async fn icon_outside_plugin_dir_is_dropped() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "translate", "[plugin]sneaky", r#"{ "display": "S", "icon": "../../x.png" }"#);
        let catalog = discover_plugins(root.path(), &[Category::Translate]).await;
        let sneaky = catalog
            .get(Category::Translate, &ServiceIdentifier::new("[plugin]sneaky"))
            .unwrap();
        assert_eq!(sneaky.icon, None);
    }

    #[tokio::test]
    async fn plugin_named_like_builtin_gets_distinct_identifier() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "translate", "google", r#"{ "display": "Google (plugin)" }"#);

        let catalog = discover_plugins(root.path(), &[Category::Translate]).await;

        assert!(!catalog.contains(Category::Translate, &ServiceIdentifier::builtin("google")));
        assert!(catalog.contains(Category::Translate, &ServiceIdentifier::plugin("google")));
    }

    #[tokio::test]
    async fn shared_reload_replaces_only_requested_categories() {
        let root = tempdir().unwrap();
        write_plugin(root.path(), "translate", "[plugin]a", r#"{ "display": "A" }"#);
        write_plugin(root.path(), "tts", "[plugin]voice", r#"{ "display": "Voice" }"#);
        let shared = SharedCatalog::new(root.path());

        shared.reload(&[Category::Tts]).await;
        let snapshot = shared.reload(&[Category::Translate]).await;
        assert_eq!(snapshot.len(Category::Translate), 1);
        assert_eq!(snapshot.len(Category::Tts), 1);

        // A later translate rescan keeps the tts entries it did not look at
        write_plugin(root.path(), "translate", "[plugin]b", r#"{ "display": "B" }"#);
        std::fs::remove_dir_all(root.path().join("tts")).unwrap();
        shared.reload(&[Category::Translate]).await;

        let snapshot = shared.snapshot();
        assert_eq!(snapshot.len(Category::Translate), 2);
        assert_eq!(snapshot.len(Category::Tts), 1);
        assert!(!snapshot.has_category(Category::Recognize));
    }

    #[cfg(unix)]
    #[test]
    fn asset_uri_encodes_the_whole_path() {
        assert_eq!(
            asset_uri(Path::new("/cfg/plugins/a b.png")),
            "asset://localhost/%2Fcfg%2Fplugins%2Fa%20b.png"
        );
    }
}

//! Client bundle manifest.
//!
//! The client build writes a stats file listing the assets of each named
//! chunk group. Only the `main` group is used:
//!
//! ```json
//! {
//!   "hash": "4f1c",
//!   "publicPath": "auto",
//!   "namedChunkGroups": {
//!     "main": { "assets": [{ "name": "vendors.4f1c.js", "size": 1024 }] }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Public path used when the build reports `auto`.
pub const AUTO_PUBLIC_PATH: &str = "/client/";
/// Script loaded when no manifest is available.
pub const FALLBACK_BUNDLE: &str = "/client.bundle.js";

const MAIN_GROUP: &str = "main";

/// Errors raised while reading the stats file.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    /// The stats file could not be read.
    #[error("failed to read manifest at {path}: {source}")]
    Read {
        /// Stats file location.
        path: String,
        /// Read failure.
        #[source]
        source: std::io::Error,
    },
    /// The stats file is not valid JSON of the expected shape.
    #[error("malformed manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct AssetInfo {
    name: String,
    #[serde(default)]
    size: u64,
}

#[derive(Debug, Deserialize)]
struct ChunkGroup {
    #[serde(default)]
    assets: Vec<AssetInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct BuildStats {
    #[serde(default)]
    hash: Option<String>,
    #[serde(default)]
    public_path: Option<String>,
    #[serde(default)]
    named_chunk_groups: HashMap<String, ChunkGroup>,
}

/// Kind of a bundle asset, derived from its file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    /// `.js`
    Javascript,
    /// `.css`
    Stylesheet,
    /// `.js.map`
    Sourcemap,
    /// Anything else.
    Unknown,
}

impl AssetKind {
    fn of(name: &str) -> Self {
        if name.ends_with(".js") {
            Self::Javascript
        } else if name.ends_with(".css") {
            Self::Stylesheet
        } else if name.ends_with(".js.map") {
            Self::Sourcemap
        } else {
            Self::Unknown
        }
    }
}

/// An asset URL with its size and kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Public URL.
    pub url: String,
    /// Size in bytes as reported by the build.
    pub size: u64,
    /// Kind derived from the extension.
    #[serde(rename = "type")]
    pub kind: AssetKind,
}

/// Assets of the client bundle's `main` chunk group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkManifest {
    hash: Option<String>,
    public_path: String,
    assets: Vec<AssetInfo>,
    development: bool,
}

impl ChunkManifest {
    /// Parse a stats document. Source maps are only listed when
    /// `development` is set.
    ///
    /// ```
    /// use recordkeeper::inbound::ssr::ChunkManifest;
    ///
    /// let manifest = ChunkManifest::from_json(
    ///     r#"{"hash":"h","publicPath":"auto","namedChunkGroups":{"main":{"assets":[
    ///         {"name":"main.js","size":10},{"name":"vendors.js","size":20}]}}}"#,
    ///     false,
    /// ).expect("valid stats");
    /// assert_eq!(manifest.bootstrap_scripts(), ["/client/vendors.js", "/client/main.js"]);
    /// ```
    pub fn from_json(raw: &str, development: bool) -> Result<Self, ManifestError> {
        let stats: BuildStats = serde_json::from_str(raw)?;
        let public_path = match stats.public_path.as_deref() {
            None | Some("auto") => AUTO_PUBLIC_PATH.to_owned(),
            Some(path) => path.to_owned(),
        };
        let assets = stats
            .named_chunk_groups
            .get(MAIN_GROUP)
            .map(|group| group.assets.clone())
            .unwrap_or_default();
        if assets.is_empty() {
            warn!("manifest has no assets in the main chunk group");
        }
        Ok(Self {
            hash: stats.hash,
            public_path,
            assets,
            development,
        })
    }

    /// Manifest naming only [`FALLBACK_BUNDLE`].
    #[must_use]
    pub fn fallback(development: bool) -> Self {
        Self {
            hash: None,
            public_path: "/".to_owned(),
            assets: vec![AssetInfo {
                name: FALLBACK_BUNDLE.trim_start_matches('/').to_owned(),
                size: 0,
            }],
            development,
        }
    }

    /// Read the stats file at `path`.
    pub fn load(path: &Path, development: bool) -> Result<Self, ManifestError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let manifest = Self::from_json(&raw, development)?;
        info!(
            path = %path.display(),
            hash = manifest.hash.as_deref().unwrap_or("none"),
            assets = manifest.assets.len(),
            "client manifest loaded"
        );
        Ok(manifest)
    }

    /// [`Self::load`], falling back to [`Self::fallback`] with a warning.
    #[must_use]
    pub fn load_or_fallback(path: &Path, development: bool) -> Self {
        Self::load(path, development).unwrap_or_else(|err| {
            warn!(error = %err, bundle = FALLBACK_BUNDLE, "using fallback client bundle");
            Self::fallback(development)
        })
    }

    /// Build hash, when the stats file has one.
    #[must_use]
    pub fn hash(&self) -> Option<&str> {
        self.hash.as_deref()
    }

    fn url(&self, name: &str) -> String {
        format!("{}{name}", self.public_path)
    }

    fn urls_of(&self, kind: AssetKind) -> Vec<String> {
        self.assets
            .iter()
            .filter(|asset| AssetKind::of(&asset.name) == kind)
            .map(|asset| self.url(&asset.name))
            .collect()
    }

    /// URLs of the JavaScript assets.
    #[must_use]
    pub fn javascript_assets(&self) -> Vec<String> {
        self.urls_of(AssetKind::Javascript)
    }

    /// URLs of the stylesheets.
    #[must_use]
    pub fn css_assets(&self) -> Vec<String> {
        self.urls_of(AssetKind::Stylesheet)
    }

    /// Source maps of the JavaScript assets; empty outside development.
    #[must_use]
    pub fn source_map_assets(&self) -> Vec<String> {
        if !self.development {
            return Vec::new();
        }
        self.assets
            .iter()
            .filter(|asset| AssetKind::of(&asset.name) == AssetKind::Javascript)
            .map(|asset| self.url(&format!("{}.map", asset.name)))
            .collect()
    }

    /// Every asset with its size and kind.
    #[must_use]
    pub fn assets(&self) -> Vec<Asset> {
        self.assets
            .iter()
            .map(|asset| Asset {
                url: self.url(&asset.name),
                size: asset.size,
                kind: AssetKind::of(&asset.name),
            })
            .collect()
    }

    /// JavaScript assets in load order: vendors, shared, main, then the rest.
    /// Ties keep manifest order.
    #[must_use]
    pub fn bootstrap_scripts(&self) -> Vec<String> {
        let mut scripts = self.javascript_assets();
        scripts.sort_by_key(|url| load_priority(url));
        scripts
    }
}

fn load_priority(url: &str) -> u8 {
    if url.contains("vendors") {
        0
    } else if url.contains("shared") {
        1
    } else if url.contains("main") {
        2
    } else {
        3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const STATS: &str = r#"{
        "hash": "abc123",
        "publicPath": "/static/",
        "namedChunkGroups": {
            "main": {
                "name": "main",
                "chunks": ["runtime", "vendors", "main"],
                "assets": [
                    { "name": "runtime.abc123.js", "size": 1 },
                    { "name": "main.abc123.js", "size": 2 },
                    { "name": "main.abc123.css", "size": 3 },
                    { "name": "shared.abc123.js", "size": 4 },
                    { "name": "vendors.abc123.js", "size": 5 },
                    { "name": "logo.svg", "size": 6 }
                ]
            }
        }
    }"#;

    #[fixture]
    fn manifest() -> ChunkManifest {
        ChunkManifest::from_json(STATS, true).expect("stats parse")
    }

    #[rstest]
    fn bootstrap_order_is_vendors_shared_main_rest(manifest: ChunkManifest) {
        assert_eq!(
            manifest.bootstrap_scripts(),
            [
                "/static/vendors.abc123.js",
                "/static/shared.abc123.js",
                "/static/main.abc123.js",
                "/static/runtime.abc123.js",
            ]
        );
    }

    #[rstest]
    fn splits_assets_by_kind(manifest: ChunkManifest) {
        assert_eq!(manifest.css_assets(), ["/static/main.abc123.css"]);
        assert_eq!(manifest.javascript_assets().len(), 4);
        assert_eq!(manifest.hash(), Some("abc123"));
        let svg = manifest
            .assets()
            .into_iter()
            .find(|a| a.url.ends_with(".svg"))
            .expect("svg asset");
        assert_eq!(svg.kind, AssetKind::Unknown);
        assert_eq!(svg.size, 6);
    }

    #[rstest]
    #[case(true, 4)]
    #[case(false, 0)]
    fn source_maps_only_in_development(#[case] development: bool, #[case] expected: usize) {
        let manifest = ChunkManifest::from_json(STATS, development).expect("stats parse");
        let maps = manifest.source_map_assets();
        assert_eq!(maps.len(), expected);
        assert!(maps.iter().all(|m| m.ends_with(".js.map")));
    }

    #[rstest]
    #[case(r#"{"publicPath":"auto","namedChunkGroups":{"main":{"assets":[{"name":"a.js","size":1}]}}}"#)]
    #[case(r#"{"namedChunkGroups":{"main":{"assets":[{"name":"a.js"}]}}}"#)]
    fn auto_public_path_maps_to_client_dir(#[case] raw: &str) {
        let manifest = ChunkManifest::from_json(raw, false).expect("stats parse");
        assert_eq!(manifest.bootstrap_scripts(), ["/client/a.js"]);
    }

    #[rstest]
    fn missing_main_group_has_no_assets() {
        let manifest =
            ChunkManifest::from_json(r#"{"hash":"x","namedChunkGroups":{}}"#, false).expect("parse");
        assert!(manifest.bootstrap_scripts().is_empty());
        assert!(manifest.assets().is_empty());
    }

    #[rstest]
    fn unreadable_manifest_falls_back_to_single_bundle() {
        let path = std::env::temp_dir().join(format!("missing-{}.json", uuid::Uuid::new_v4()));
        let manifest = ChunkManifest::load_or_fallback(&path, false);
        assert_eq!(manifest.bootstrap_scripts(), [FALLBACK_BUNDLE]);
        assert!(matches!(
            ChunkManifest::load(&path, false),
            Err(ManifestError::Read { .. })
        ));
    }

    #[rstest]
    fn malformed_manifest_is_a_parse_error() {
        assert!(matches!(
            ChunkManifest::from_json("[", false),
            Err(ManifestError::Parse(_))
        ));
    }
}

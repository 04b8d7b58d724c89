//! Asset manifest and request classification.
//!
//! The manifest is immutable for the lifetime of a deployed version. It
//! decides which class a request path falls into; the worker maps each class
//! to a caching strategy.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::AppConfig;

/// Classification of an intercepted request, in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AssetClass {
    /// Listed in the static asset table.
    Static,
    /// Under a dynamic asset namespace (product images, collections...).
    Dynamic,
    /// Under the API prefix.
    Api,
    /// Anything else.
    Other,
}

/// The two version-qualified bucket names of one deployment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketNames {
    pub static_bucket: String,
    pub dynamic_bucket: String,
}

impl BucketNames {
    /// `<app>-static-v<version>` and `<app>-dynamic-v<version>`.
    pub fn new(app_name: &str, version: &str) -> Self {
        Self {
            static_bucket: format!("{app_name}-static-v{version}"),
            dynamic_bucket: format!("{app_name}-dynamic-v{version}"),
        }
    }

    /// Whether a bucket belongs to the current version.
    pub fn is_current(&self, name: &str) -> bool {
        name == self.static_bucket || name == self.dynamic_bucket
    }
}

/// A static asset table entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StaticAsset {
    /// Site-relative path such as `/index.html` or `/assets/fonts/`.
    Path(String),
    /// Externally hosted asset.
    External(Url),
}

impl StaticAsset {
    fn parse(entry: &str) -> Option<Self> {
        if entry.starts_with("http://") || entry.starts_with("https://") {
            Url::parse(entry).ok().map(StaticAsset::External)
        } else if entry.starts_with('/') {
            Some(StaticAsset::Path(entry.to_string()))
        } else {
            None
        }
    }

    /// The manifest entry as written.
    pub fn as_str(&self) -> &str {
        match self {
            StaticAsset::Path(p) => p,
            StaticAsset::External(u) => u.as_str(),
        }
    }

    /// Resolve against the origin into the URL fetched at install.
    pub fn resolve(&self, origin: &Url) -> Option<Url> {
        match self {
            StaticAsset::Path(p) => origin.join(p).ok(),
            StaticAsset::External(u) => Some(u.clone()),
        }
    }

    fn matches(&self, url: &Url, strict_external: bool) -> bool {
        let path = url.path();
        match self {
            // Every site entry is a path prefix except the root, which covers only itself.
            StaticAsset::Path(p) if p == "/" => path == "/",
            StaticAsset::Path(p) => path.starts_with(p.as_str()),
            StaticAsset::External(asset) => {
                if strict_external {
                    return asset.host_str() == url.host_str() && asset.path() == path;
                }
                match asset.path_segments().and_then(|mut s| s.next_back()) {
                    Some(filename) if !filename.is_empty() => path.contains(filename),
                    _ => false,
                }
            }
        }
    }
}

/// Static asset table plus dynamic and API prefixes.
#[derive(Debug, Clone)]
pub struct AssetManifest {
    static_assets: Vec<StaticAsset>,
    dynamic_prefixes: Vec<String>,
    api_prefix: String,
    strict_external_match: bool,
}

impl AssetManifest {
    /// Build a manifest; entries that are neither site paths nor http(s)
    /// URLs are dropped with a warning.
    pub fn new(
        static_assets: &[String], dynamic_prefixes: &[String], api_prefix: &str, strict_external_match: bool,
    ) -> Self {
        let static_assets = static_assets
            .iter()
            .filter_map(|entry| {
                let parsed = StaticAsset::parse(entry);
                if parsed.is_none() {
                    tracing::warn!(entry = %entry, "ignoring unusable static asset entry");
                }
                parsed
            })
            .collect();

        Self {
            static_assets,
            dynamic_prefixes: dynamic_prefixes.to_vec(),
            api_prefix: api_prefix.to_string(),
            strict_external_match,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.static_assets, &config.dynamic_prefixes, &config.api_prefix, config.strict_external_match)
    }

    pub fn static_assets(&self) -> &[StaticAsset] {
        &self.static_assets
    }

    pub fn is_static_asset(&self, url: &Url) -> bool {
        self.static_assets
            .iter()
            .any(|asset| asset.matches(url, self.strict_external_match))
    }

    pub fn is_dynamic_asset(&self, path: &str) -> bool {
        self.dynamic_prefixes.iter().any(|prefix| path.starts_with(prefix.as_str()))
    }

    pub fn is_api(&self, path: &str) -> bool {
        path.starts_with(self.api_prefix.as_str())
    }

    /// Classify a request URL; first match wins.
    pub fn classify(&self, url: &Url) -> AssetClass {
        let path = url.path();
        if self.is_static_asset(url) {
            AssetClass::Static
        } else if self.is_dynamic_asset(path) {
            AssetClass::Dynamic
        } else if self.is_api(path) {
            AssetClass::Api
        } else {
            AssetClass::Other
        }
    }
}

impl Default for AssetManifest {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

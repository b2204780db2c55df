//! Bridge configuration (`~/.config/micropub-bridge/config.toml`).
//!
//! Holds the site identity and storage layout every component needs:
//! - `[site]`: public origin (`me`), content and media directories
//! - `[publish]`: delete mode, unknown-property policy, enrichment toggles
//! - `[store]`: working copy used by the local file store
//!
//! The loaded value is passed explicitly to every component; nothing
//! downstream reads process state.

use anyhow::{Context, Result, bail};
use mpb_core::UnknownProperties;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const APP_NAME: &str = "micropub-bridge";

const DEFAULT_CONTENT_DIR: &str = "src";
const DEFAULT_MEDIA_DIR: &str = "uploads";

/// Complete configuration loaded from TOML plus environment overrides.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BridgeConfig {
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub publish: PublishOptions,
    #[serde(default)]
    pub store: StoreConfig,
}

/// `[site]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Public origin of the site, e.g. `https://example.com/`.
    #[serde(default)]
    pub me: String,
    /// Directory posts are stored under (default: `src`).
    #[serde(default = "default_content_dir")]
    pub content_dir: String,
    /// Directory uploaded media is stored under (default: `uploads`).
    #[serde(default = "default_media_dir")]
    pub media_dir: String,
    /// Prefix post slugs with the creation date (`2021-09-09-title`).
    #[serde(default)]
    pub full_date_filenames: bool,
    /// Media endpoint advertised by the config query.
    #[serde(default)]
    pub media_endpoint: Option<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            me: String::new(),
            content_dir: default_content_dir(),
            media_dir: default_media_dir(),
            full_date_filenames: false,
            media_endpoint: None,
        }
    }
}

/// `[publish]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublishOptions {
    /// Physically remove files on delete instead of writing a tombstone.
    #[serde(default)]
    pub permanent_delete: bool,
    /// Policy for properties without a dedicated field.
    #[serde(default)]
    pub unknown_properties: UnknownProperties,
    /// Look up the liked page's title when a like has no name.
    #[serde(default = "default_true")]
    pub fetch_like_titles: bool,
}

impl Default for PublishOptions {
    fn default() -> Self {
        Self {
            permanent_delete: false,
            unknown_properties: UnknownProperties::default(),
            fetch_like_titles: true,
        }
    }
}

/// `[store]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Root of the site working copy (default: current directory).
    #[serde(default = "default_store_root")]
    pub root: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            root: default_store_root(),
        }
    }
}

fn default_content_dir() -> String {
    DEFAULT_CONTENT_DIR.to_string()
}

fn default_media_dir() -> String {
    DEFAULT_MEDIA_DIR.to_string()
}

fn default_store_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_true() -> bool {
    true
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

impl SiteConfig {
    /// `me` without a trailing slash, ready to prefix a path.
    pub fn origin(&self) -> &str {
        self.me.trim_end_matches('/')
    }

    /// Public URL for a storage path or slug.
    pub fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.origin(), path.trim_start_matches('/'))
    }
}

impl BridgeConfig {
    /// Load from the default location, then apply environment overrides.
    ///
    /// Returns defaults (plus overrides) if the file does not exist or the
    /// config directory cannot be determined.
    pub fn load() -> Result<Self> {
        let config = match Self::config_path() {
            Ok(path) if path.exists() => Self::load_from(&path)?,
            _ => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Load a specific file without applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        Self::parse(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }

    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        Ok(config.normalized())
    }

    /// Path to the config file: `~/.config/micropub-bridge/config.toml`.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = directories::ProjectDirs::from("", "", APP_NAME)
            .context("Failed to determine config directory")?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `ME`, `CONTENT_DIR`, `MEDIA_DIR`, `PERMANENT_DELETE` and
    /// `FULL_DATE_FILENAMES` overrides from `lookup`.
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(me) = lookup("ME") {
            self.site.me = me;
        }
        if let Some(dir) = lookup("CONTENT_DIR") {
            self.site.content_dir = dir;
        }
        if let Some(dir) = lookup("MEDIA_DIR") {
            self.site.media_dir = dir;
        }
        if let Some(flag) = lookup("PERMANENT_DELETE") {
            self.publish.permanent_delete = parse_flag(&flag);
        }
        if let Some(flag) = lookup("FULL_DATE_FILENAMES") {
            self.site.full_date_filenames = parse_flag(&flag);
        }
        self.normalized()
    }

    fn normalized(mut self) -> Self {
        self.site.content_dir = self.site.content_dir.trim_end_matches('/').to_string();
        self.site.media_dir = self.site.media_dir.trim_end_matches('/').to_string();
        self
    }

    /// Reject configurations no request could succeed against.
    pub fn validate(&self) -> Result<()> {
        if self.site.me.trim().is_empty() {
            bail!("site.me is not set (set it in config.toml or via ME)");
        }
        let me = url::Url::parse(&self.site.me)
            .with_context(|| format!("site.me is not a valid URL: '{}'", self.site.me))?;
        if !matches!(me.scheme(), "http" | "https") {
            bail!("site.me must be an http(s) URL, got '{}'", self.site.me);
        }
        if self.site.content_dir.is_empty() {
            bail!("site.content_dir must not be empty");
        }
        if self.site.media_dir.is_empty() {
            bail!("site.media_dir must not be empty");
        }
        Ok(())
    }

    /// Generate a commented TOML template.
    pub fn default_template() -> String {
        r#"# micropub-bridge configuration
# Location: ~/.config/micropub-bridge/config.toml
#
# Every key can be omitted; defaults are shown. Environment variables
# ME, CONTENT_DIR, MEDIA_DIR, PERMANENT_DELETE and FULL_DATE_FILENAMES
# override the matching keys.

[site]
me = "https://example.com/"     # Public origin; post URLs must match it
content_dir = "src"             # Posts live at {content_dir}/{kind}/{slug}.md
media_dir = "uploads"           # Uploads live at {media_dir}/{unix}_{filename}
full_date_filenames = false     # Prefix slugs with YYYY-MM-DD
# media_endpoint = "https://example.com/micropub/media"

[publish]
permanent_delete = false        # true: delete removes the file; false: tombstone
unknown_properties = "passthrough"  # or "strict" to drop unrecognized properties
fetch_like_titles = true        # Use the liked page's title as the post name

[store]
root = "."                      # Working copy of the site repository
"#
        .to_string()
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;

//! Configuration for phonk-typegen.
//!
//! Loads config from:
//! 1. Global: ~/.config/phonk-typegen/config.toml
//! 2. Per-checkout: <root>/.phonk-typegen.toml (overrides global)
//!
//! Further files (e.g. `--config`) can be layered with [`TypegenConfig::merge`].
//! Every setting is optional; accessors fall back to the PHONK layout.
//!
//! Example config.toml:
//! ```toml
//! [runner]
//! class = "AppRunner"
//! init_method = "initInterpreter"
//!
//! [api]
//! dir = "PHONK-android/phonk_apprunner/src/main/java/io/phonk/runner/apprunner/api"
//!
//! [types.map]
//! Integer = "number"
//! ```

use crate::error::{Error, Result};
use crate::input::{ApiScan, ExposureMarkers, RunnerPattern};
use crate::output::TypeRenderer;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const DEFAULT_RUNNER_PATH: &str =
    "PHONK-android/phonk_apprunner/src/main/java/io/phonk/runner/apprunner/AppRunner.java";
const DEFAULT_API_DIR: &str =
    "PHONK-android/phonk_apprunner/src/main/java/io/phonk/runner/apprunner/api";

/// Per-checkout config file name.
pub const PROJECT_CONFIG_FILE: &str = ".phonk-typegen.toml";

/// Runner class settings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct RunnerConfig {
    /// Runner source file, relative to the checkout root.
    pub path: Option<PathBuf>,
    pub class: Option<String>,
    pub init_method: Option<String>,
    pub receiver: Option<String>,
    pub register_method: Option<String>,
}

impl RunnerConfig {
    pub fn path(&self) -> PathBuf {
        self.path
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_RUNNER_PATH))
    }

    pub fn pattern(&self) -> RunnerPattern {
        let defaults = RunnerPattern::default();
        RunnerPattern {
            class: self.class.clone().unwrap_or(defaults.class),
            init_method: self.init_method.clone().unwrap_or(defaults.init_method),
            receiver: self.receiver.clone().unwrap_or(defaults.receiver),
            register_method: self
                .register_method
                .clone()
                .unwrap_or(defaults.register_method),
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            path: other.path.or(self.path),
            class: other.class.or(self.class),
            init_method: other.init_method.or(self.init_method),
            receiver: other.receiver.or(self.receiver),
            register_method: other.register_method.or(self.register_method),
        }
    }
}

/// API tree settings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ApiConfig {
    /// API source directory, relative to the checkout root.
    pub dir: Option<PathBuf>,
    pub extension: Option<String>,
    pub field_annotation: Option<String>,
    pub method_annotation: Option<String>,
}

impl ApiConfig {
    pub fn dir(&self) -> PathBuf {
        self.dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_API_DIR))
    }

    pub fn extension(&self) -> &str {
        self.extension.as_deref().unwrap_or("java")
    }

    pub fn markers(&self) -> ExposureMarkers {
        let defaults = ExposureMarkers::default();
        ExposureMarkers {
            field: self.field_annotation.clone().unwrap_or(defaults.field),
            method: self.method_annotation.clone().unwrap_or(defaults.method),
        }
    }

    fn merge(self, other: Self) -> Self {
        Self {
            dir: other.dir.or(self.dir),
            extension: other.extension.or(self.extension),
            field_annotation: other.field_annotation.or(self.field_annotation),
            method_annotation: other.method_annotation.or(self.method_annotation),
        }
    }
}

/// Extra Java → TypeScript name mappings.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TypesConfig {
    pub map: BTreeMap<String, String>,
}

impl TypesConfig {
    fn merge(mut self, other: Self) -> Self {
        self.map.extend(other.map);
        self
    }
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct TypegenConfig {
    pub runner: RunnerConfig,
    pub api: ApiConfig,
    pub types: TypesConfig,
}

impl TypegenConfig {
    /// Load configuration for a checkout.
    ///
    /// Missing files are skipped; unreadable or malformed ones are logged and
    /// skipped.
    pub fn load(root: &Path) -> Self {
        let mut config = Self::default();

        let candidates = Self::global_config_path()
            .into_iter()
            .chain(std::iter::once(root.join(PROJECT_CONFIG_FILE)));
        for path in candidates {
            if !path.is_file() {
                continue;
            }
            match Self::load_file(&path) {
                Ok(layer) => {
                    debug!(path = %path.display(), "loaded config");
                    config = config.merge(layer);
                }
                Err(e) => warn!("ignoring config: {}", e),
            }
        }

        config
    }

    /// Get the global config path.
    fn global_config_path() -> Option<PathBuf> {
        let config_home = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .ok()
            .or_else(|| dirs::home_dir().map(|h| h.join(".config")))?;
        Some(config_home.join("phonk-typegen").join("config.toml"))
    }

    /// Load one config file.
    pub fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| Error::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `other` on top of `self`: settings present in `other` win.
    pub fn merge(self, other: Self) -> Self {
        Self {
            runner: self.runner.merge(other.runner),
            api: self.api.merge(other.api),
            types: self.types.merge(other.types),
        }
    }

    /// Runner source path under `root`.
    pub fn runner_path(&self, root: &Path) -> PathBuf {
        root.join(self.runner.path())
    }

    /// API scan settings under `root`.
    pub fn api_scan(&self, root: &Path) -> ApiScan {
        ApiScan {
            dir: root.join(self.api.dir()),
            extension: self.api.extension().to_string(),
            markers: self.api.markers(),
        }
    }

    /// Type renderer with the configured extra names.
    pub fn renderer(&self) -> TypeRenderer {
        TypeRenderer::new().with_names(self.types.map.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::TypeExpr;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TypegenConfig::default();
        assert_eq!(config.runner.pattern(), RunnerPattern::default());
        assert_eq!(config.api.markers(), ExposureMarkers::default());
        assert_eq!(config.api.extension(), "java");
        assert!(config.runner.path().ends_with("apprunner/AppRunner.java"));
        assert!(config.api.dir().ends_with("apprunner/api"));
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(PROJECT_CONFIG_FILE),
            r#"
[runner]
class = "Runner"

[api]
dir = "src/api"
method_annotation = "Exposed"

[types.map]
Integer = "number"
"#,
        )
        .unwrap();

        let config = TypegenConfig::load(dir.path());
        let pattern = config.runner.pattern();
        assert_eq!(pattern.class, "Runner");
        assert_eq!(pattern.init_method, "initInterpreter"); // default
        let scan = config.api_scan(dir.path());
        assert_eq!(scan.dir, dir.path().join("src/api"));
        assert_eq!(scan.markers.method, "Exposed");
        assert_eq!(scan.markers.field, "PhonkField"); // default
        let rendered = config
            .renderer()
            .render(Some(&TypeExpr::named("Integer")))
            .unwrap();
        assert_eq!(rendered, "number");
    }

    #[test]
    fn test_merge_keeps_unset_fields() {
        let base: TypegenConfig = toml::from_str(
            r#"
[runner]
class = "A"
receiver = "js"

[types.map]
Integer = "number"
"#,
        )
        .unwrap();
        let layer: TypegenConfig = toml::from_str(
            r#"
[runner]
class = "B"

[types.map]
Long = "number"
"#,
        )
        .unwrap();

        let merged = base.merge(layer);
        assert_eq!(merged.runner.class.as_deref(), Some("B"));
        assert_eq!(merged.runner.receiver.as_deref(), Some("js"));
        assert_eq!(merged.types.map.len(), 2);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.toml");
        std::fs::write(&path, "[runner]\nclas = \"typo\"\n").unwrap();
        let err = TypegenConfig::load_file(&path).unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
        // implicit loading skips it
        std::fs::copy(&path, dir.path().join(PROJECT_CONFIG_FILE)).unwrap();
        assert_eq!(
            TypegenConfig::load(dir.path()).runner,
            TypegenConfig::default().runner
        );
    }
}

//! Configuration management with layered hierarchy

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::processing::owt::SectionProperties;

/// Name of the project-level config file, looked up in the working directory
pub const PROJECT_CONFIG_FILE: &str = ".owtgeo.yaml";

/// owtgeo configuration with layered hierarchy
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default output format
    pub default_format: Option<String>,

    /// Elastic constants of the can tables
    pub section_properties: Option<SectionProperties>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let project_dir = std::env::current_dir().ok();
        let mut config = Self::load_from(
            Self::global_config_path().as_deref(),
            project_dir.as_deref(),
        );
        config.apply_env(|key| std::env::var(key).ok());
        config
    }

    /// Load the file layers: built-in defaults, then the global file, then
    /// the project file in `project_dir`
    pub fn load_from(global: Option<&Path>, project_dir: Option<&Path>) -> Self {
        let mut config = Config::default();

        if let Some(global) = global.and_then(Self::read_file) {
            config.merge(global);
        }
        if let Some(project) = project_dir
            .map(|dir| dir.join(PROJECT_CONFIG_FILE))
            .and_then(|path| Self::read_file(&path))
        {
            config.merge(project);
        }

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read config file");
                return None;
            }
        };
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Some(config)
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring invalid config file");
                None
            }
        }
    }

    /// Apply `OWTGEO_*` variables read through `var`
    ///
    /// `OWTGEO_SECTION_PROPERTIES` selects `fixed` or `material`; the two
    /// constants only apply to fixed section properties.
    pub fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(format) = var("OWTGEO_FORMAT") {
            self.default_format = Some(format);
        }

        if let Some(source) = var("OWTGEO_SECTION_PROPERTIES") {
            match source.to_lowercase().as_str() {
                "material" => self.section_properties = Some(SectionProperties::FromMaterial),
                "fixed" => {
                    if !matches!(self.section_properties, Some(SectionProperties::Fixed { .. })) {
                        self.section_properties = Some(SectionProperties::default());
                    }
                }
                other => warn!(value = other, "OWTGEO_SECTION_PROPERTIES must be 'fixed' or 'material'"),
            }
        }

        let number = |key: &str| {
            var(key).and_then(|v| match v.trim().parse::<f64>() {
                Ok(n) => Some(n),
                Err(_) => {
                    warn!(variable = key, value = %v, "ignoring non-numeric value");
                    None
                }
            })
        };
        let youngs = number("OWTGEO_YOUNGS_MODULUS_GPA");
        let poisson = number("OWTGEO_POISSONS_RATIO");
        if youngs.is_none() && poisson.is_none() {
            return;
        }
        match self.section_properties() {
            SectionProperties::Fixed {
                youngs_modulus_gpa,
                poissons_ratio,
            } => {
                self.section_properties = Some(SectionProperties::Fixed {
                    youngs_modulus_gpa: youngs.unwrap_or(youngs_modulus_gpa),
                    poissons_ratio: poisson.unwrap_or(poissons_ratio),
                });
            }
            SectionProperties::FromMaterial => {
                warn!("elastic constants from the environment are ignored with material section properties")
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "owtgeo")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    fn merge(&mut self, other: Config) {
        if other.default_format.is_some() {
            self.default_format = other.default_format;
        }
        if other.section_properties.is_some() {
            self.section_properties = other.section_properties;
        }
    }

    /// Section properties, falling back to 210 GPa / 0.3
    pub fn section_properties(&self) -> SectionProperties {
        self.section_properties.unwrap_or_default()
    }
}

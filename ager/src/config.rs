use anyhow::{Context, Result, bail};
use image_aging::{AgingConfig, AgingLevel, ArchetypeSet, EncodeSpec, OutputFormat};
use log::{debug, warn};
use platform_dirs::AppDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

const APP_NAME: &str = "ager";

/// Defaults for every run, read from `ager.toml`. Command-line flags win.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Config {
    #[serde(skip)]
    pub config_path: PathBuf,

    pub aging: Aging,
    pub output: Output,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Aging {
    #[derivative(Default(value = "\"medium\".to_string()"))]
    pub level: String,

    #[derivative(Default(value = "8"))]
    pub marks: u32,

    #[derivative(Default(value = "0.7"))]
    pub intensity: f32,

    #[derivative(Default(value = "\"extended\".to_string()"))]
    pub archetype_set: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Derivative)]
#[derivative(Default)]
#[serde(default)]
pub struct Output {
    #[derivative(Default(value = "\"png\".to_string()"))]
    pub format: String,

    #[derivative(Default(value = "300"))]
    pub dpi: u32,

    #[derivative(Default(value = "1_000_000"))]
    pub byte_budget: usize,

    #[derivative(Default(value = "\"aged\".to_string()"))]
    pub dir: String,
}

impl Config {
    /// Loads `path` when given, otherwise the per-user `ager.toml`.
    ///
    /// A missing or unreadable per-user file is replaced with the defaults.
    /// An explicit path must exist and parse.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::load_user()?,
        };

        debug!("{config:?}");
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Can't read config file: {}", path.display()))?;

        let mut config = toml::from_str::<Config>(&text)
            .with_context(|| format!("Can't parse config file: {}", path.display()))?;
        config.config_path = path.to_path_buf();
        Ok(config)
    }

    fn load_user() -> Result<Self> {
        let Some(app_dirs) = AppDirs::new(Some(APP_NAME), true) else {
            warn!("no config directory on this platform, using defaults");
            return Ok(Self::default());
        };

        fs::create_dir_all(&app_dirs.config_dir)?;
        let config_path = app_dirs.config_dir.join(format!("{APP_NAME}.toml"));

        match Self::from_file(&config_path) {
            Ok(config) => Ok(config),
            Err(e) => {
                if config_path.exists() {
                    warn!("{e:?}, falling back to defaults");
                    _ = fs::copy(&config_path, config_path.with_extension("toml.bak"));
                }

                let config = Self {
                    config_path,
                    ..Default::default()
                };
                config.save()?;
                Ok(config)
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        match toml::to_string_pretty(self) {
            Ok(text) => Ok(fs::write(&self.config_path, text)
                .with_context(|| format!("save config failed: {}", self.config_path.display()))?),
            Err(e) => bail!("convert config to toml format failed. {e:?}"),
        }
    }

    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Aging parameters, rejected rather than clamped when out of range.
    ///
    /// Level names are not checked: anything unknown ages like `medium`.
    pub fn aging_config(&self) -> Result<AgingConfig> {
        let archetype_set = self.aging.archetype_set.parse::<ArchetypeSet>()?;
        let config = AgingConfig::new()
            .with_level(AgingLevel::from_name(&self.aging.level))
            .with_mark_count(self.aging.marks)
            .with_intensity(self.aging.intensity)
            .with_archetype_set(archetype_set);

        config.validate()?;
        Ok(config)
    }

    pub fn encode_spec(&self) -> Result<EncodeSpec> {
        let format = self.output.format.parse::<OutputFormat>()?;
        if self.output.byte_budget == 0 {
            bail!("byte budget must be positive");
        }

        Ok(EncodeSpec::new()
            .with_format(format)
            .with_dpi(self.output.dpi)
            .with_byte_budget(self.output.byte_budget))
    }
}

//! Loading decoder configuration from TOML files.
//!
//! Configuration is layered: device-matched presets first, then the system
//! config file, then drop-in overrides. Every file is an *overlay* — only
//! the keys it names are changed — so a preset can set the screen geometry
//! while the user file only flips one threshold. The `IPTS_STYLUS_CONFIG`
//! environment variable replaces the system layers entirely, which is
//! mainly useful while debugging against a known working setup.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use ipts_stylus_core::{Config, DeviceInfo, Metadata, MppVersion};

/// Directory with device presets shipped alongside the binary.
pub const PRESET_DIR: &str = "/usr/share/ipts-stylus/presets";

/// The system configuration file.
pub const CONFIG_FILE: &str = "/etc/ipts-stylus/config.toml";

/// Directory with drop-in configuration overrides.
pub const CONFIG_DIR: &str = "/etc/ipts-stylus/config.d";

/// Environment variable overriding the configuration entirely.
pub const CONFIG_ENV: &str = "IPTS_STYLUS_CONFIG";

/// Errors from config loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A config file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A config file could not be parsed.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// One parsed config file.
///
/// All fields are optional; applying the file only touches the options it
/// names.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    device: DeviceSection,
    config: ConfigSection,
    dft: DftSection,
    stylus: StylusSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DeviceSection {
    vendor: Option<u16>,
    product: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ConfigSection {
    invert_x: Option<bool>,
    invert_y: Option<bool>,
    width: Option<f64>,
    height: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DftSection {
    position_min_amp: Option<u32>,
    position_min_mag: Option<u32>,
    position_exp: Option<f64>,
    position2: Option<bool>,
    button_min_mag: Option<u32>,
    freq_min_mag: Option<u32>,
    tilt_min_mag: Option<u32>,
    tilt_distance: Option<f64>,
    tip_distance: Option<f64>,
    mpp_version: Option<MppVersion>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StylusSection {
    disable: Option<bool>,
}

impl ConfigFile {
    /// Parses a config file from a TOML string.
    pub fn from_toml(path: &Path, raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Whether this file targets the given device.
    ///
    /// Files without a `[device]` section apply to every device.
    #[must_use]
    pub fn matches_device(&self, info: &DeviceInfo) -> bool {
        let vendor = self.device.vendor.unwrap_or(info.vendor);
        let product = self.device.product.unwrap_or(info.product);

        vendor == info.vendor && product == info.product
    }

    /// Applies the options named in this file over `config`.
    pub fn apply(&self, config: &mut Config) {
        macro_rules! overlay {
            ($section:ident, $field:ident => $target:ident) => {
                if let Some(value) = self.$section.$field {
                    config.$target = value;
                }
            };
        }

        overlay!(config, invert_x => invert_x);
        overlay!(config, invert_y => invert_y);
        overlay!(config, width => width);
        overlay!(config, height => height);

        overlay!(dft, position_min_amp => dft_position_min_amp);
        overlay!(dft, position_min_mag => dft_position_min_mag);
        overlay!(dft, position_exp => dft_position_exp);
        overlay!(dft, position2 => dft_position2);
        overlay!(dft, button_min_mag => dft_button_min_mag);
        overlay!(dft, freq_min_mag => dft_freq_min_mag);
        overlay!(dft, tilt_min_mag => dft_tilt_min_mag);
        overlay!(dft, tilt_distance => dft_tilt_distance);
        overlay!(dft, tip_distance => dft_tip_distance);
        overlay!(dft, mpp_version => mpp_version);

        overlay!(stylus, disable => stylus_disable);
    }
}

/// Builds the effective [`Config`] for one device.
#[derive(Debug)]
pub struct ConfigLoader {
    config: Config,
    info: DeviceInfo,
}

impl ConfigLoader {
    /// Loads the configuration for the given device.
    ///
    /// Metadata-derived defaults (screen size and axis inversion) are
    /// applied first, then the file layers in order.
    pub fn new(info: &DeviceInfo, metadata: Option<&Metadata>) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(metadata) = metadata {
            config.apply_metadata(metadata);
        }

        let mut loader = Self {
            config,
            info: *info,
        };

        loader.load_dir(Path::new(PRESET_DIR), true)?;
        loader.load_dir(Path::new("./etc/presets"), true)?;

        if let Ok(path) = std::env::var(CONFIG_ENV) {
            loader.load_file(Path::new(&path))?;
            return Ok(loader);
        }

        let config_file = Path::new(CONFIG_FILE);
        if config_file.exists() {
            loader.load_file(config_file)?;
        }

        loader.load_dir(Path::new(CONFIG_DIR), false)?;

        Ok(loader)
    }

    /// The loaded config object.
    #[must_use]
    pub fn config(&self) -> Config {
        self.config.clone()
    }

    /// Loads all config files from a directory.
    ///
    /// With `check_device` set, files targeting other devices are skipped.
    fn load_dir(&mut self, dir: &Path, check_device: bool) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = fs::read_dir(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        let mut paths: Vec<PathBuf> = entries
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        paths.sort();

        for path in paths {
            let file = self.read_file(&path)?;

            if check_device && !file.matches_device(&self.info) {
                continue;
            }

            debug!("loading config from {}", path.display());
            file.apply(&mut self.config);
        }

        Ok(())
    }

    /// Loads a single config file.
    fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let file = self.read_file(path)?;

        debug!("loading config from {}", path.display());
        file.apply(&mut self.config);

        Ok(())
    }

    fn read_file(&self, path: &Path) -> Result<ConfigFile, ConfigError> {
        let raw = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        ConfigFile::from_toml(path, &raw)
    }
}

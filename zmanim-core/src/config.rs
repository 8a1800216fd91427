//! Service configuration.
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `ZMANIM_*` environment variables. A bare `PORT` variable
//! is honored last so the service runs unchanged on common PaaS hosts.

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::constants::{DEFAULT_CANDLE_LIGHTING_MINS, SPECIAL_REGION_CANDLE_LIGHTING_MINS};
use crate::engine::CalendarOptions;
use crate::error::{ZmanimError, ZmanimResult};
use crate::location::{LocationResolver, PostalTable, ResolvedLocation, TzfZoneLookup};

const ENV_PREFIX: &str = "ZMANIM";
const CONFIG_PATH_VAR: &str = "ZMANIM_CONFIG";

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_candle_lighting_mins() -> i64 {
    DEFAULT_CANDLE_LIGHTING_MINS
}

fn default_special_region_candle_lighting_mins() -> i64 {
    SPECIAL_REGION_CANDLE_LIGHTING_MINS
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Full postal dataset; the bundled table is used when unset
    #[serde(default)]
    pub postal_codes: Option<PathBuf>,

    #[serde(default = "default_candle_lighting_mins")]
    pub candle_lighting_mins: i64,

    #[serde(default = "default_special_region_candle_lighting_mins")]
    pub special_region_candle_lighting_mins: i64,

    /// Fixed Havdalah offset after sunset; nightfall when unset
    #[serde(default)]
    pub havdalah_mins: Option<i64>,

    /// Include weekly Torah portions unless the request says otherwise
    #[serde(default)]
    pub parasha: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            host: default_host(),
            port: default_port(),
            postal_codes: None,
            candle_lighting_mins: default_candle_lighting_mins(),
            special_region_candle_lighting_mins: default_special_region_candle_lighting_mins(),
            havdalah_mins: None,
            parasha: false,
        }
    }
}

impl Settings {
    /// `$ZMANIM_CONFIG`, or ~/.config/zmanim-feed/config.toml
    pub fn config_path() -> ZmanimResult<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
            return Ok(PathBuf::from(shellexpand::tilde(&path).into_owned()));
        }

        let config_dir = dirs::config_dir()
            .ok_or_else(|| ZmanimError::Config("Could not determine config directory".into()))?
            .join("zmanim-feed");

        Ok(config_dir.join("config.toml"))
    }

    /// Load settings from the config file and the process environment.
    pub fn load() -> ZmanimResult<Self> {
        let path = Self::config_path()?;
        Self::load_from(
            &path,
            Environment::with_prefix(ENV_PREFIX),
            std::env::var("PORT").ok(),
        )
    }

    fn load_from(path: &Path, env: Environment, port: Option<String>) -> ZmanimResult<Self> {
        Config::builder()
            .add_source(File::from(path).required(false))
            .add_source(env)
            .set_override_option("port", port)
            .map_err(|e| ZmanimError::Config(e.to_string()))?
            .build()
            .map_err(|e| ZmanimError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| ZmanimError::Config(e.to_string()))
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Postal dataset path with `~` expanded.
    pub fn postal_codes_path(&self) -> Option<PathBuf> {
        self.postal_codes
            .as_ref()
            .map(|p| PathBuf::from(shellexpand::tilde(&p.to_string_lossy()).into_owned()))
    }

    /// Location resolver over the configured postal dataset.
    pub fn resolver(&self) -> ZmanimResult<LocationResolver> {
        let postal = match self.postal_codes_path() {
            Some(path) => PostalTable::from_path(&path)?,
            None => PostalTable::bundled()?,
        };
        Ok(LocationResolver::new(postal, Box::new(TzfZoneLookup::new())))
    }

    /// Engine options for a location, before any per-request overrides.
    pub fn calendar_options(&self, location: &ResolvedLocation) -> CalendarOptions {
        CalendarOptions {
            candle_lighting_mins: if location.is_special_region {
                self.special_region_candle_lighting_mins
            } else {
                self.candle_lighting_mins
            },
            havdalah_mins: self.havdalah_mins,
            sedrot: self.parasha,
            ..CalendarOptions::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let mut source = config::Map::new();
        for (key, value) in vars {
            source.insert(key.to_string(), value.to_string());
        }
        Environment::with_prefix(ENV_PREFIX).source(Some(source))
    }

    fn location(special: bool) -> ResolvedLocation {
        ResolvedLocation {
            latitude: 31.7683,
            longitude: 35.2137,
            tz: chrono_tz::Asia::Jerusalem,
            is_special_region: special,
            display_name: "Custom Location".to_string(),
        }
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let settings =
            Settings::load_from(&dir.path().join("missing.toml"), env(&[]), None).unwrap();

        assert_eq!(settings, Settings::default());
        assert_eq!(settings.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_file_then_env_then_port() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "port = 8080\ncandle_lighting_mins = 20\nparasha = true\nhost = \"127.0.0.1\"\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path, env(&[]), None).unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:8080");
        assert_eq!(settings.candle_lighting_mins, 20);
        assert!(settings.parasha);

        let settings = Settings::load_from(
            &path,
            env(&[("ZMANIM_CANDLE_LIGHTING_MINS", "22"), ("ZMANIM_PORT", "9000")]),
            None,
        )
        .unwrap();
        assert_eq!(settings.candle_lighting_mins, 22);
        assert_eq!(settings.port, 9000);

        let settings =
            Settings::load_from(&path, env(&[("ZMANIM_PORT", "9000")]), Some("5000".into()))
                .unwrap();
        assert_eq!(settings.port, 5000);
    }

    #[test]
    fn test_bad_value_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "port = \"not a port\"\n").unwrap();

        let err = Settings::load_from(&path, env(&[]), None).unwrap_err();
        assert!(matches!(err, ZmanimError::Config(_)));
    }

    #[test]
    fn test_calendar_options_by_region() {
        let settings = Settings {
            havdalah_mins: Some(72),
            parasha: true,
            ..Settings::default()
        };

        let abroad = settings.calendar_options(&location(false));
        assert_eq!(abroad.candle_lighting_mins, 18);
        assert_eq!(abroad.havdalah_mins, Some(72));
        assert!(abroad.sedrot);
        assert!(abroad.candle_lighting);
        assert!(!abroad.omer);

        let israel = settings.calendar_options(&location(true));
        assert_eq!(israel.candle_lighting_mins, 40);
    }

    #[test]
    fn test_postal_codes_path_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("zips.json");
        std::fs::write(
            &data,
            r#"[{"zip": "11111", "latitude": 40.0, "longitude": -74.0, "city": "Test", "state": "NJ", "country": "US"}]"#,
        )
        .unwrap();

        let settings = Settings {
            postal_codes: Some(data.clone()),
            ..Settings::default()
        };
        assert_eq!(settings.postal_codes_path(), Some(data));
        assert!(settings.resolver().is_ok());

        let missing = Settings {
            postal_codes: Some(dir.path().join("nope.json")),
            ..Settings::default()
        };
        assert!(matches!(missing.resolver().err(), Some(ZmanimError::PostalData(_))));
    }
}

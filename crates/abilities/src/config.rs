use crate::cache::{CacheBackend, CacheConfig};
use crate::{AbilityError, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_API_BASE: &str = "https://pokeapi.co/api/v2";
pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_CACHE_KEY: &str = "pokemonAbilitiesData";

pub const ENV_API_BASE: &str = "POKEDEX_API_BASE";
pub const ENV_PAGE_SIZE: &str = "POKEDEX_PAGE_SIZE";
pub const ENV_CACHE_DIR: &str = "POKEDEX_CACHE_DIR";
pub const ENV_CACHE_BACKEND: &str = "POKEDEX_CACHE_BACKEND";

/// Settings of the ability list accumulator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListConfig {
    /// Root of the REST API, without trailing slash
    pub api_base: String,

    /// Items per remote page; also the `limit` of every synthesized cursor
    pub page_size: usize,

    /// Cache slot holding the list snapshot
    pub cache_key: String,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            cache_key: DEFAULT_CACHE_KEY.to_string(),
        }
    }
}

impl ListConfig {
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(AbilityError::invalid_config("page_size must be > 0"));
        }
        if self.cache_key.trim().is_empty() {
            return Err(AbilityError::invalid_config("cache_key must not be empty"));
        }
        if self.api_base.trim().is_empty() {
            return Err(AbilityError::invalid_config("api_base must not be empty"));
        }
        reqwest::Url::parse(&self.api_base).map_err(|err| {
            AbilityError::invalid_config(format!("api_base {:?}: {err}", self.api_base))
        })?;
        Ok(())
    }

    /// `<api_base>/ability/`
    pub fn listing_url(&self) -> String {
        format!("{}/ability/", self.api_base.trim_end_matches('/'))
    }

    /// Cursor of the page starting at `offset`, in the listing's own URL shape.
    pub fn cursor_at(&self, offset: usize) -> String {
        format!(
            "{}?offset={offset}&limit={}",
            self.listing_url(),
            self.page_size
        )
    }

    pub fn first_page_cursor(&self) -> String {
        self.cursor_at(0)
    }
}

/// Everything the `pokedex` binary needs to build an accumulator.
#[derive(Debug, Clone)]
pub struct Settings {
    pub list: ListConfig,
    pub cache: CacheConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            list: ListConfig::default(),
            cache: CacheConfig::with_defaults(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSettings {
    api_base: Option<String>,
    page_size: Option<usize>,
    cache_key: Option<String>,
    cache_dir: Option<PathBuf>,
    cache_backend: Option<String>,
}

impl Settings {
    /// Defaults overlaid with a JSON or TOML settings file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let raw = parse_raw(&bytes)
            .map_err(|err| AbilityError::invalid_config(format!("{}: {err}", path.display())))?;
        let mut settings = Self::default();
        settings.merge(raw)?;
        Ok(settings)
    }

    /// Overlay `POKEDEX_*` variables from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let page_size = match lookup(ENV_PAGE_SIZE) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|err| {
                AbilityError::invalid_config(format!("{ENV_PAGE_SIZE}={raw:?}: {err}"))
            })?),
            None => None,
        };
        self.merge(RawSettings {
            api_base: lookup(ENV_API_BASE),
            page_size,
            cache_key: None,
            cache_dir: lookup(ENV_CACHE_DIR).map(PathBuf::from),
            cache_backend: lookup(ENV_CACHE_BACKEND),
        })
    }

    pub fn validate(&self) -> Result<()> {
        self.list.validate()
    }

    fn merge(&mut self, raw: RawSettings) -> Result<()> {
        if let Some(base) = raw.api_base {
            self.list.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(size) = raw.page_size {
            self.list.page_size = size;
        }
        if let Some(key) = raw.cache_key {
            self.list.cache_key = key;
        }
        if let Some(dir) = raw.cache_dir {
            self.cache.dir = dir;
        }
        if let Some(backend) = raw.cache_backend {
            self.cache.backend = CacheBackend::parse(&backend)?;
        }
        Ok(())
    }
}

fn parse_raw(bytes: &[u8]) -> std::result::Result<RawSettings, String> {
    match serde_json::from_slice(bytes) {
        Ok(raw) => Ok(raw),
        Err(json_err) => {
            let utf8 = std::str::from_utf8(bytes).map_err(|err| format!("{json_err}; {err}"))?;
            toml::from_str(utf8).map_err(|toml_err| {
                format!("settings are not valid JSON ({json_err}) or TOML ({toml_err})")
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn cursors_use_listing_shape() {
        let cfg = ListConfig::default();
        assert_eq!(
            cfg.first_page_cursor(),
            "https://pokeapi.co/api/v2/ability/?offset=0&limit=10"
        );
        assert_eq!(
            cfg.cursor_at(25),
            "https://pokeapi.co/api/v2/ability/?offset=25&limit=10"
        );
    }

    #[test]
    fn trailing_slash_is_dropped_from_base() {
        let cfg = ListConfig::default().with_api_base("http://localhost:8080/api/v2/");
        assert_eq!(
            cfg.cursor_at(10),
            "http://localhost:8080/api/v2/ability/?offset=10&limit=10"
        );
    }

    #[test]
    fn validate_rejects_zero_page_size() {
        let cfg = ListConfig {
            page_size: 0,
            ..Default::default()
        };
        assert!(matches!(cfg.validate(), Err(AbilityError::InvalidConfig(_))));
    }

    #[test]
    fn validate_rejects_unparseable_base() {
        let cfg = ListConfig::default().with_api_base("not a url");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn env_overrides_defaults() {
        let vars: HashMap<&str, &str> = [
            (ENV_API_BASE, "http://127.0.0.1:9000/api/v2/"),
            (ENV_PAGE_SIZE, "20"),
            (ENV_CACHE_BACKEND, "memory"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings
            .apply_env_from(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(settings.list.api_base, "http://127.0.0.1:9000/api/v2");
        assert_eq!(settings.list.page_size, 20);
        assert_eq!(settings.cache.backend, CacheBackend::Memory);
        assert_eq!(settings.list.cache_key, DEFAULT_CACHE_KEY);
    }

    #[test]
    fn env_page_size_must_be_numeric() {
        let mut settings = Settings::default();
        let err = settings
            .apply_env_from(|key| (key == ENV_PAGE_SIZE).then(|| "ten".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_PAGE_SIZE));
    }

    #[test]
    fn settings_file_accepts_toml_and_json() {
        let dir = tempfile::tempdir().unwrap();

        let toml_path = dir.path().join("pokedex.toml");
        std::fs::write(&toml_path, "page_size = 5\ncache_dir = \"/tmp/pokedex\"\n").unwrap();
        let from_toml = Settings::from_file(&toml_path).unwrap();
        assert_eq!(from_toml.list.page_size, 5);
        assert_eq!(from_toml.cache.dir, PathBuf::from("/tmp/pokedex"));

        let json_path = dir.path().join("pokedex.json");
        std::fs::write(&json_path, r#"{"cache_key":"abilities-v2"}"#).unwrap();
        let from_json = Settings::from_file(&json_path).unwrap();
        assert_eq!(from_json.list.cache_key, "abilities-v2");
        assert_eq!(from_json.list.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn settings_file_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pokedex.toml");
        std::fs::write(&path, "pagesize = 5\n").unwrap();
        assert!(matches!(
            Settings::from_file(&path),
            Err(AbilityError::InvalidConfig(_))
        ));
    }
}

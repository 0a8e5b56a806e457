use crate::{AbilityError, Result, SnapshotStore};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const THEME_KEY: &str = "app_theme_mode";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

impl fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ThemeMode {
    type Err = AbilityError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            other => Err(AbilityError::invalid_config(format!(
                "unknown theme mode: {other}"
            ))),
        }
    }
}

/// Persisted light/dark preference, stored as the bare string `light`/`dark`.
pub struct ThemePreference<C> {
    store: C,
}

impl<C: SnapshotStore> ThemePreference<C> {
    pub fn new(store: C) -> Self {
        Self { store }
    }

    /// Stored mode, falling back to light when unset or unreadable.
    pub async fn load(&self) -> ThemeMode {
        match self.store.get(THEME_KEY).await {
            Ok(Some(bytes)) => match std::str::from_utf8(&bytes)
                .map_err(|err| AbilityError::Other(err.to_string()))
                .and_then(ThemeMode::from_str)
            {
                Ok(mode) => mode,
                Err(err) => {
                    log::warn!("Ignoring stored theme mode: {err}");
                    ThemeMode::default()
                }
            },
            Ok(None) => ThemeMode::default(),
            Err(err) => {
                log::warn!("Theme mode unreadable from {} store: {err}", self.store.name());
                ThemeMode::default()
            }
        }
    }

    pub async fn save(&self, mode: ThemeMode) -> Result<()> {
        self.store.set(THEME_KEY, mode.as_str().as_bytes()).await
    }

    pub async fn toggle(&self) -> Result<ThemeMode> {
        let mode = self.load().await.toggled();
        self.save(mode).await?;
        Ok(mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemorySnapshotStore;
    use std::sync::Arc;

    #[tokio::test]
    async fn defaults_to_light_and_persists_changes() {
        let store = Arc::new(MemorySnapshotStore::new());
        let prefs = ThemePreference::new(Arc::clone(&store));
        assert_eq!(prefs.load().await, ThemeMode::Light);

        prefs.save(ThemeMode::Dark).await.unwrap();
        assert_eq!(
            store.get(THEME_KEY).await.unwrap().as_deref(),
            Some(&b"dark"[..])
        );
        assert_eq!(ThemePreference::new(store).load().await, ThemeMode::Dark);
    }

    #[tokio::test]
    async fn toggle_flips_and_stores() {
        let prefs = ThemePreference::new(MemorySnapshotStore::new());
        assert_eq!(prefs.toggle().await.unwrap(), ThemeMode::Dark);
        assert_eq!(prefs.toggle().await.unwrap(), ThemeMode::Light);
        assert_eq!(prefs.load().await, ThemeMode::Light);
    }

    #[tokio::test]
    async fn garbage_value_falls_back_to_light() {
        let store = MemorySnapshotStore::new();
        store.set(THEME_KEY, b"sepia").await.unwrap();
        assert_eq!(ThemePreference::new(store).load().await, ThemeMode::Light);
    }
}

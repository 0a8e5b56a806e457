//! # Pokedex Abilities
//!
//! The "show more / show less" ability list backing the Pokédex browser.
//!
//! ## Flow
//!
//! ```text
//! Consumer ── request_grow / request_shrink ──┐
//!                                             ▼
//!                                      AbilityList
//!                     grow │                  │ every change
//!                          ▼                  ▼
//!                  AbilitySource        SnapshotStore
//!                  (GET cursor)         (pokemonAbilitiesData)
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use pokedex_abilities::{AbilityList, FileSnapshotStore, HttpAbilitySource, ListConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let list = AbilityList::new(
//!         HttpAbilitySource::new(),
//!         FileSnapshotStore::new(".pokedex/cache"),
//!         ListConfig::default(),
//!     )?;
//!     list.hydrate().await?;
//!     let view = list.request_grow().await;
//!
//!     for ability in &view.state.items {
//!         println!("{}", ability.name);
//!     }
//!     Ok(())
//! }
//! ```

mod accumulator;
mod cache;
mod config;
mod cursor;
mod error;
mod source;
mod theme;
mod types;
pub mod window;

pub use accumulator::{AbilityList, ListOperation};
pub use cache::{CacheBackend, CacheConfig, FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use config::{
    ListConfig, Settings, DEFAULT_API_BASE, DEFAULT_CACHE_KEY, DEFAULT_PAGE_SIZE, ENV_API_BASE,
    ENV_CACHE_BACKEND, ENV_CACHE_DIR, ENV_PAGE_SIZE,
};
pub use cursor::{parse_cursor, CursorPosition};
pub use error::{AbilityError, Result};
pub use source::{AbilitySource, HttpAbilitySource};
pub use theme::{ThemeMode, ThemePreference, THEME_KEY};
pub use types::{AbilityPage, AbilityRef, ListState, ListView, PageCursor};

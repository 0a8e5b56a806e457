use serde::{Deserialize, Serialize};

/// One entry of the remote ability listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityRef {
    /// URL-safe slug, unique across the listing (e.g. `stench`)
    pub name: String,
    /// Canonical locator of the ability detail resource
    pub url: String,
}

impl AbilityRef {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }
}

/// Locator of a neighbouring page. `None` means there is no such page.
pub type PageCursor = Option<String>;

/// Body of `GET <cursor-url>` on the ability listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbilityPage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u64>,
    pub next: PageCursor,
    pub previous: PageCursor,
    pub results: Vec<AbilityRef>,
}

/// The accumulated, windowed ability list.
///
/// Serialized form doubles as the cached snapshot:
/// `{"abilities": [...], "next": ..., "previous": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListState {
    #[serde(rename = "abilities")]
    pub items: Vec<AbilityRef>,
    pub next: PageCursor,
    pub previous: PageCursor,
}

impl ListState {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.next.is_some()
    }
}

/// What a consumer renders: the list plus the in-flight and error flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ListView {
    #[serde(flatten)]
    pub state: ListState,
    pub loading: bool,
    pub error: Option<String>,
}

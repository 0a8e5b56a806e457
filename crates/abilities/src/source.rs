use crate::{AbilityError, AbilityPage, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::sync::Arc;

/// Paginated listing of abilities, addressed by cursor URL.
#[async_trait]
pub trait AbilitySource: Send + Sync {
    async fn fetch_page(&self, cursor: &str) -> Result<AbilityPage>;
}

#[async_trait]
impl<T: AbilitySource + ?Sized> AbilitySource for Arc<T> {
    async fn fetch_page(&self, cursor: &str) -> Result<AbilityPage> {
        (**self).fetch_page(cursor).await
    }
}

/// `GET <cursor>` against the PokeAPI (or anything speaking its listing shape).
#[derive(Clone, Debug, Default)]
pub struct HttpAbilitySource {
    client: Client,
}

impl HttpAbilitySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AbilitySource for HttpAbilitySource {
    async fn fetch_page(&self, cursor: &str) -> Result<AbilityPage> {
        let url = reqwest::Url::parse(cursor)
            .map_err(|err| AbilityError::InvalidCursor(format!("{cursor}: {err}")))?;

        log::debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AbilityError::Status {
                status: status.as_u16(),
                url: cursor.to_string(),
            });
        }

        let body = response.bytes().await?;
        decode_page(cursor, &body)
    }
}

pub(crate) fn decode_page(cursor: &str, body: &[u8]) -> Result<AbilityPage> {
    serde_json::from_slice(body).map_err(|source| AbilityError::Decode {
        url: cursor.to_string(),
        source,
    })
}

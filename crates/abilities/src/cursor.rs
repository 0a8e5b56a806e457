use crate::{AbilityError, Result};
use serde::Serialize;

/// Offset/limit pair decoded from a listing cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CursorPosition {
    pub offset: usize,
    pub limit: usize,
}

impl CursorPosition {
    /// One past the last index the cursor's page would cover.
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.limit)
    }
}

/// Decode the `offset` and `limit` query parameters of a cursor URL.
///
/// A missing `offset` means the start of the listing; `limit` is required.
pub fn parse_cursor(cursor: &str) -> Result<CursorPosition> {
    let url = reqwest::Url::parse(cursor)
        .map_err(|err| AbilityError::InvalidCursor(format!("{cursor}: {err}")))?;

    let mut offset = None;
    let mut limit = None;
    for (key, value) in url.query_pairs() {
        let slot = match &*key {
            "offset" => &mut offset,
            "limit" => &mut limit,
            _ => continue,
        };
        let parsed = value.parse::<usize>().map_err(|err| {
            AbilityError::InvalidCursor(format!("{cursor}: {key}={value:?}: {err}"))
        })?;
        *slot = Some(parsed);
    }

    let limit =
        limit.ok_or_else(|| AbilityError::InvalidCursor(format!("{cursor}: missing limit")))?;
    Ok(CursorPosition {
        offset: offset.unwrap_or(0),
        limit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pokeapi_cursor() {
        let pos = parse_cursor("https://pokeapi.co/api/v2/ability/?offset=20&limit=10").unwrap();
        assert_eq!(pos, CursorPosition { offset: 20, limit: 10 });
        assert_eq!(pos.end(), 30);
    }

    #[test]
    fn parameter_order_does_not_matter() {
        let pos = parse_cursor("http://localhost/ability/?limit=10&offset=5").unwrap();
        assert_eq!(pos.offset, 5);
    }

    #[test]
    fn missing_offset_means_start() {
        let pos = parse_cursor("http://localhost/ability/?limit=10").unwrap();
        assert_eq!(pos.offset, 0);
    }

    #[test]
    fn rejects_missing_limit_and_garbage() {
        assert!(matches!(
            parse_cursor("http://localhost/ability/?offset=10"),
            Err(AbilityError::InvalidCursor(_))
        ));
        assert!(matches!(
            parse_cursor("http://localhost/ability/?offset=-1&limit=10"),
            Err(AbilityError::InvalidCursor(_))
        ));
        assert!(parse_cursor("offset=10&limit=10").is_err());
    }
}

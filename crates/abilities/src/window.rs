//! "Show less" arithmetic: how many entries a shrink retracts and which
//! cursors the shorter list points at afterwards. Pure functions, no I/O.

use crate::{ListConfig, ListState};

/// Entries removed when the list length is not a whole number of pages.
///
/// Fixed regardless of the configured page size.
pub const PARTIAL_PAGE_SHRINK: usize = 7;

/// Number of entries a shrink removes from a list of `len` entries, or `None`
/// when the list is already at or below one page.
pub fn shrink_amount(len: usize, page_size: usize) -> Option<usize> {
    if page_size == 0 || len <= page_size {
        return None;
    }
    let amount = if len % page_size != 0 {
        PARTIAL_PAGE_SHRINK
    } else {
        page_size
    };
    Some(amount.min(len))
}

/// The state a shrink produces, or `None` when shrinking is a no-op.
///
/// Cursors are derived from the remaining length, never fetched: `next`
/// points at the first entry no longer held, `previous` at the page two
/// pages back. At or below one page `next` is the canonical second page and
/// `previous` is cleared.
pub fn shrink_window(state: &ListState, config: &ListConfig) -> Option<ListState> {
    let page_size = config.page_size;
    let amount = shrink_amount(state.items.len(), page_size)?;
    let kept = state.items.len() - amount;

    let (next, previous) = if kept > page_size {
        (
            config.cursor_at(kept),
            Some(config.cursor_at(kept.saturating_sub(2 * page_size))),
        )
    } else {
        (config.cursor_at(page_size), None)
    };

    Some(ListState {
        items: state.items[..kept].to_vec(),
        next: Some(next),
        previous,
    })
}

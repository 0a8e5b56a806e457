use pokedex_abilities::{parse_cursor, CursorPosition, ListView, ThemeMode};
use serde::Serialize;
use std::fmt::Write as _;

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Ok,
    Error,
}

#[derive(Serialize)]
pub struct ListReport<'a> {
    pub status: Status,
    #[serde(flatten)]
    pub view: &'a ListView,
    pub next_position: Option<CursorPosition>,
    pub previous_position: Option<CursorPosition>,
}

impl<'a> ListReport<'a> {
    pub fn new(view: &'a ListView) -> Self {
        Self {
            status: if view.error.is_some() {
                Status::Error
            } else {
                Status::Ok
            },
            view,
            next_position: position(view.state.next.as_deref()),
            previous_position: position(view.state.previous.as_deref()),
        }
    }
}

#[derive(Serialize)]
pub struct ThemeReport {
    pub status: Status,
    pub theme: ThemeMode,
}

fn position(cursor: Option<&str>) -> Option<CursorPosition> {
    let cursor = cursor?;
    match parse_cursor(cursor) {
        Ok(pos) => Some(pos),
        Err(err) => {
            log::debug!("Not rendering cursor position: {err}");
            None
        }
    }
}

pub fn render_list(report: &ListReport<'_>) -> String {
    let state = &report.view.state;
    let mut out = String::new();
    for (idx, ability) in state.items.iter().enumerate() {
        let _ = writeln!(out, "{:>4}. {}", idx + 1, ability.name);
    }

    if state.is_empty() {
        out.push_str("no abilities loaded");
    } else {
        let _ = write!(out, "showing 1-{}", state.len());
    }
    match &report.next_position {
        Some(pos) => {
            let _ = write!(out, " | more from offset {}", pos.offset);
        }
        None if state.next.is_some() => out.push_str(" | more available"),
        None => out.push_str(" | end of list"),
    }
    if let Some(pos) = &report.previous_position {
        let _ = write!(out, " | previous page at offset {}", pos.offset);
    }
    if let Some(err) = &report.view.error {
        let _ = write!(out, "\nerror: {err}");
    }
    out
}

pub fn render_theme(report: &ThemeReport) -> String {
    format!("theme: {}", report.theme)
}

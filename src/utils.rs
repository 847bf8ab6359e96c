use ratatui::layout::{Constraint, Direction, Layout, Rect};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const NAV_HEIGHT: u16 = 3;
pub const FOOTER_HEIGHT: u16 = 3;

/// Screen areas: nav bar, page viewport, page scrollbar, footer.
pub struct ScreenAreas {
    pub nav: Rect,
    pub page: Rect,
    pub scrollbar: Rect,
    pub footer: Rect,
}

pub fn split_screen(area: Rect) -> ScreenAreas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(NAV_HEIGHT),
            Constraint::Min(1),
            Constraint::Length(FOOTER_HEIGHT),
        ])
        .split(area);
    let page = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(rows[1]);
    ScreenAreas {
        nav: rows[0],
        page: page[0],
        scrollbar: page[1],
        footer: rows[2],
    }
}

/// Word wrap by display width. Words wider than `width` are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if text.trim().is_empty() {
        return vec![String::new()];
    }
    textwrap::wrap(text, width.max(1))
        .into_iter()
        .map(|line| line.into_owned())
        .collect()
}

/// Columns `text` takes up on screen.
pub fn display_width(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

/// Cuts `text` to `width` columns, ending with an ellipsis when cut.
pub fn truncate(text: &str, width: usize) -> String {
    if display_width(text) <= width {
        return text.to_string();
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

/// Keeps the trailing part of `text` that fits in `width` columns.
pub fn tail(text: &str, width: usize) -> String {
    let mut used = 0;
    let mut start = text.len();
    for (i, c) in text.char_indices().rev() {
        let w = UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w > width {
            break;
        }
        used += w;
        start = i;
    }
    text[start..].to_string()
}

/// Pads `text` with spaces to exactly `width` columns (truncating first).
pub fn pad_to(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let used = display_width(&text);
    format!("{}{}", text, " ".repeat(width.saturating_sub(used)))
}

pub fn calculate_max_scroll(content_lines: usize, view_height: u16) -> u16 {
    let content = u16::try_from(content_lines).unwrap_or(u16::MAX);
    content.saturating_sub(view_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_on_word_boundaries() {
        let lines = wrap_text("each piece tells a story", 10);
        assert_eq!(lines, vec!["each piece", "tells a", "story"]);
    }

    #[test]
    fn splits_words_longer_than_the_width() {
        let lines = wrap_text("ok abcdefghij", 4);
        assert_eq!(lines, vec!["ok", "abcd", "efgh", "ij"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(wrap_text("   ", 8), vec![String::new()]);
    }

    #[test]
    fn truncates_with_ellipsis() {
        assert_eq!(truncate("Turquoise Tide", 9), "Turquois…");
        assert_eq!(truncate("Jade", 9), "Jade");
        assert_eq!(pad_to("Jade", 6), "Jade  ");
        assert_eq!(pad_to("Lapis Lazuli", 6).chars().count(), 6);
    }

    #[test]
    fn wide_characters_count_as_two_columns() {
        let lines = wrap_text("🎨🎨🎨🎨 ok", 4);
        assert!(lines.iter().all(|line| display_width(line) <= 4));
        assert_eq!(lines, vec!["🎨🎨", "🎨🎨", "ok"]);

        assert_eq!(display_width("Hi 👋"), 5);
        assert_eq!(truncate("🌟🌟🌟", 4), "🌟…");
        assert_eq!(display_width(&pad_to("😊 gallery", 6)), 6);
        assert_eq!(tail("ab🎨", 3), "b🎨");
        assert_eq!(tail("ab🎨", 1), "");
    }

    #[test]
    fn max_scroll_never_underflows() {
        assert_eq!(calculate_max_scroll(10, 40), 0);
        assert_eq!(calculate_max_scroll(100, 40), 60);
    }

    #[test]
    fn screen_split_keeps_nav_and_footer() {
        let areas = split_screen(Rect::new(0, 0, 80, 30));
        assert_eq!(areas.nav.height, NAV_HEIGHT);
        assert_eq!(areas.footer.height, FOOTER_HEIGHT);
        assert_eq!(areas.page.height, 24);
        assert_eq!(areas.page.width, 79);
        assert_eq!(areas.scrollbar.width, 1);
    }
}

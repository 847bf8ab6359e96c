use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    layout::{Constraint, Direction, Layout},
    text::{Span, Line},
};
use std::sync::{Arc, Mutex};
use once_cell::sync::Lazy;
use regex::Regex;
use crate::catalog::{MediaKind, Painting, format_price};
use crate::chat::{ChatMessage, ChatSession, Sender, SessionState, lock_session};
use crate::models::{AppState, CARD_HEIGHT, DetailModal, FocusArea, NAV_ITEMS};
use crate::theme::Theme;
use crate::tracker::{Section, SectionId};
use crate::utils::{display_width, pad_to, split_screen, tail, truncate, wrap_text};
use crate::viewport::Region;

const CARD_WIDTH: usize = 30;
const CARD_GAP: usize = 2;
const HERO_MIN_HEIGHT: u16 = 10;
const TEXT_WIDTH: usize = 76;
const CHAT_WIDTH: u16 = 48;
const CHAT_HEIGHT: u16 = 20;

// Dollar amounts and social handles in chat messages
static HIGHLIGHT_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\d+(?:,\d{3})*(?:\.\d{2})?|@[A-Za-z0-9_]+").unwrap());

/// The laid out page: every line of content plus the geometry the tracker
/// and the key handler need.
#[derive(Default)]
pub struct Page {
    pub lines: Vec<Line<'static>>,
    pub sections: Vec<Section>,
    pub card_tops: Vec<u16>,
}

impl Page {
    pub fn height(&self) -> u16 {
        u16::try_from(self.lines.len()).unwrap_or(u16::MAX)
    }

    pub fn anchors(&self) -> Vec<(SectionId, u16)> {
        self.sections
            .iter()
            .filter_map(|s| s.region.map(|r| (s.id.clone(), r.top as u16)))
            .collect()
    }

    fn push_section(&mut self, id: &str, lines: Vec<Line<'static>>) {
        let top = self.lines.len();
        let region = Region::new(top as f64, lines.len() as f64);
        self.lines.extend(lines);
        self.sections.push(Section::new(id, Some(region)));
    }
}

/// Lays out hero, gallery, about, contact and footer for the given width.
pub fn build_page(
    catalog: &[Painting],
    width: u16,
    viewport_height: u16,
    selected_card: usize,
    year: i32,
    theme: &Theme,
) -> Page {
    let width = width as usize;
    let mut page = Page::default();
    page.push_section("home", hero_lines(width, viewport_height, theme));

    let gallery_top = page.lines.len();
    let (gallery, card_tops) = gallery_lines(catalog, width, selected_card, theme);
    page.card_tops = card_tops
        .into_iter()
        .map(|top| u16::try_from(gallery_top + top).unwrap_or(u16::MAX))
        .collect();
    page.push_section("gallery", gallery);
    page.push_section("about", about_lines(width, theme));
    page.push_section("contact", contact_lines(width, theme));
    page.lines.extend(footer_lines(width, year, theme));
    page
}

fn centered(text: impl Into<String>, style: Style) -> Line<'static> {
    Line::styled(text.into(), style).centered()
}

fn center_in(text: &str, width: usize) -> String {
    let text = truncate(text, width);
    let left = width.saturating_sub(display_width(&text)) / 2;
    pad_to(&format!("{}{}", " ".repeat(left), text), width)
}

fn section_heading(title: &str, subtitle: &str, width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default(), centered(title, theme.heading)];
    for line in wrap_text(subtitle, width.saturating_sub(4)) {
        lines.push(centered(line, theme.subtitle));
    }
    lines.push(Line::default());
    lines
}

fn hero_lines(width: usize, viewport_height: u16, theme: &Theme) -> Vec<Line<'static>> {
    let height = viewport_height.max(HERO_MIN_HEIGHT) as usize;
    let mut content = Vec::new();
    for line in wrap_text("Unveil the Radiance of Gemstone Art", width.saturating_sub(4)) {
        content.push(centered(line, theme.heading));
    }
    content.push(Line::default());
    for line in wrap_text(
        "Exquisite handmade paintings crafted with natural precious stones.",
        width.saturating_sub(4),
    ) {
        content.push(centered(line, theme.subtitle));
    }
    content.push(Line::default());
    content.push(centered(" Explore Collection · press 2 ", theme.button));

    let top_pad = height.saturating_sub(content.len()) / 2;
    let mut lines = vec![Line::default(); top_pad];
    lines.extend(content);
    lines.resize(height.max(lines.len()), Line::default());
    lines
}

fn gallery_lines(
    catalog: &[Painting],
    width: usize,
    selected: usize,
    theme: &Theme,
) -> (Vec<Line<'static>>, Vec<usize>) {
    let mut lines = section_heading(
        "Our Exquisite Collection",
        "Discover the unique beauty of gemstone art.",
        width,
        theme,
    );
    if catalog.is_empty() {
        lines.push(centered("The collection is being restocked.", theme.subtitle));
        lines.push(Line::default());
        return (lines, Vec::new());
    }

    let card_width = CARD_WIDTH.min(width).max(5);
    let columns = ((width + CARD_GAP) / (card_width + CARD_GAP)).clamp(1, catalog.len());
    let grid_width = columns * card_width + (columns - 1) * CARD_GAP;
    let left_pad = width.saturating_sub(grid_width) / 2;

    let mut tops = Vec::with_capacity(catalog.len());
    for (row_index, row) in catalog.chunks(columns).enumerate() {
        let top = lines.len();
        let cards: Vec<Vec<Vec<Span<'static>>>> = row
            .iter()
            .enumerate()
            .map(|(i, painting)| {
                tops.push(top);
                card_lines(painting, card_width - 4, row_index * columns + i == selected, theme)
            })
            .collect();
        for line_index in 0..CARD_HEIGHT as usize {
            let mut spans = vec![Span::raw(" ".repeat(left_pad))];
            for (i, card) in cards.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::raw(" ".repeat(CARD_GAP)));
                }
                spans.extend(card[line_index].iter().cloned());
            }
            lines.push(Line::from(spans));
        }
        lines.push(Line::default());
    }
    (lines, tops)
}

/// One card, `CARD_HEIGHT` lines of exactly `inner + 4` columns each.
fn card_lines(painting: &Painting, inner: usize, selected: bool, theme: &Theme) -> Vec<Vec<Span<'static>>> {
    let border = if selected { theme.card_selected } else { theme.card_border };
    let edge = |content: Vec<Span<'static>>| {
        let mut spans = vec![Span::styled("│ ", border)];
        spans.extend(content);
        spans.push(Span::styled(" │", border));
        spans
    };
    let horizontal = "─".repeat(inner + 2);

    let price = truncate(&format_price(painting.price), inner);
    let mut used = display_width(&price);
    let mut price_spans = vec![Span::styled(price, theme.price)];
    if let Some(original) = painting.original_price.filter(|_| painting.has_discount()) {
        let was = format_price(original);
        if used + 1 + display_width(&was) <= inner {
            used += 1 + display_width(&was);
            price_spans.push(Span::raw(" "));
            price_spans.push(Span::styled(was, theme.price_struck));
        }
    }
    price_spans.push(Span::raw(" ".repeat(inner.saturating_sub(used))));

    let name_style = if selected { theme.card_selected } else { Style::default().fg(theme.text).add_modifier(Modifier::BOLD) };
    let button = if selected { "▶ View Details" } else { "View Details" };
    let button_style = if selected { theme.button } else { Style::default().fg(theme.accent_soft) };

    vec![
        vec![Span::styled(format!("┌{}┐", horizontal), border)],
        edge(vec![Span::styled(pad_to(&painting.name, inner), name_style)]),
        edge(vec![Span::styled(pad_to(&format!("by {}", painting.artist), inner), theme.subtitle)]),
        edge(vec![Span::styled(
            pad_to(&painting.materials.join(", "), inner),
            Style::default().fg(theme.text_secondary),
        )]),
        edge(price_spans),
        edge(vec![Span::styled(center_in(button, inner), button_style)]),
        vec![Span::styled(format!("└{}┘", horizontal), border)],
    ]
}

fn about_lines(width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = section_heading(
        "About Gemstone Art",
        "Where nature's beauty meets artistic vision.",
        width,
        theme,
    );
    let text_width = TEXT_WIDTH.min(width.saturating_sub(4));
    let paragraphs = [
        "Our gemstone paintings are meticulously crafted by skilled artisans, transforming natural precious and semi-precious stones into breathtaking works of art. Each piece tells a story, capturing the vibrant hues and intricate patterns found in the earth's treasures.",
        "We believe in creating not just decorations, but heirlooms that bring tranquility and elegance to any space. Explore our collection and find a piece that resonates with your soul.",
    ];
    for paragraph in paragraphs {
        for line in wrap_text(paragraph, text_width) {
            lines.push(centered(line, Style::default().fg(theme.text)));
        }
        lines.push(Line::default());
    }
    lines
}

fn contact_lines(width: usize, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = section_heading("Get In Touch", "We'd love to hear from you!", width, theme);
    let field_width = width.saturating_sub(16).clamp(8, 40);
    let field = |label: &str, placeholder: &str| {
        Line::from(vec![
            Span::styled(format!("{:>8}  ", label), Style::default().fg(theme.text_secondary)),
            Span::styled(format!("[ {} ]", pad_to(placeholder, field_width)), theme.card_border),
        ])
        .centered()
    };
    lines.push(field("Name", "Your Name"));
    lines.push(field("Email", "you@example.com"));
    lines.push(field("Message", "Your message or inquiry"));
    lines.push(field("", ""));
    lines.push(field("", ""));
    lines.push(Line::default());
    lines.push(centered(" Send Message ", theme.button));
    lines.push(Line::default());
    lines.push(centered(
        "Email: info@kiwiart.com · Phone: +1 (234) 567-890",
        Style::default().fg(theme.accent_soft),
    ));
    lines.push(Line::default());
    lines
}

fn footer_lines(width: usize, year: i32, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = vec![
        Line::styled("─".repeat(width), theme.card_border),
        Line::default(),
        centered("KiwiArt", theme.brand),
    ];
    for line in wrap_text(
        "Discover a world where natural beauty meets artistic brilliance. Each piece is a testament to the earth's treasures and human creativity.",
        TEXT_WIDTH.min(width.saturating_sub(4)),
    ) {
        lines.push(centered(line, Style::default().fg(theme.text_secondary)));
    }
    let links: Vec<&str> = NAV_ITEMS.iter().map(|item| item.name).collect();
    lines.push(Line::default());
    lines.push(centered(format!("Quick Links: {}", links.join(" · ")), theme.footer));
    lines.push(centered("Connect: Instagram · Facebook · TikTok", theme.footer));
    lines.push(Line::default());
    lines.push(centered(format!("© {} KiwiArt. All rights reserved.", year), theme.footer));
    lines.push(centered("Designed with ❤ by the KiwiArt team.", theme.footer));
    lines.push(Line::default());
    lines
}

/// Splits `text` into spans, highlighting prices and handles.
pub fn highlight_spans(text: &str, base: Style, theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = vec![];
    let mut last = 0;
    for m in HIGHLIGHT_REGEX.find_iter(text) {
        if m.start() > last {
            spans.push(Span::styled(text[last..m.start()].to_owned(), base));
        }
        spans.push(Span::styled(m.as_str().to_owned(), base.patch(theme.chat_highlight)));
        last = m.end();
    }
    if last < text.len() {
        spans.push(Span::styled(text[last..].to_owned(), base));
    }
    spans
}

pub fn chat_lines(messages: &[ChatMessage], width: usize, sending: bool, theme: &Theme) -> Vec<Line<'static>> {
    let bubble_width = (width * 3 / 4).max(10);
    let mut lines = Vec::new();
    for message in messages {
        let (label, style, alignment) = match message.sender {
            Sender::User => ("You", theme.chat_user, Alignment::Right),
            Sender::Agent => ("KiwiArt", theme.chat_agent, Alignment::Left),
        };
        for line in wrap_text(&message.text, bubble_width) {
            lines.push(Line::from(highlight_spans(&line, style, theme)).alignment(alignment));
        }
        lines.push(
            Line::styled(format!("{} · {}", label, message.timestamp.format("%H:%M")), theme.chat_meta)
                .alignment(alignment),
        );
        lines.push(Line::default());
    }
    if sending {
        lines.push(Line::styled("● ● ●", theme.chat_agent).alignment(Alignment::Left));
    }
    lines
}

/// Renders the whole screen.
pub fn render(
    f: &mut Frame,
    app: &AppState,
    page: &Page,
    active: &SectionId,
    catalog: &[Painting],
    session: &Arc<Mutex<ChatSession>>,
    theme: &Theme,
) {
    let areas = split_screen(f.area());

    render_nav(f, areas.nav, active, theme);

    let para = Paragraph::new(page.lines.clone()).scroll((app.scroll, 0));
    f.render_widget(para, areas.page);
    let mut sb = ScrollbarState::new(app.max_scroll as usize).position(app.scroll as usize);
    f.render_stateful_widget(
        Scrollbar::default().orientation(ScrollbarOrientation::VerticalRight),
        areas.scrollbar,
        &mut sb,
    );

    render_footer(f, areas.footer, app, theme);

    {
        let session = lock_session(session);
        if session.open {
            render_chat(f, areas.page, &session, app.focus == FocusArea::Chat, theme);
        } else {
            render_chat_button(f, areas.page, theme);
        }
    }

    if let Some(modal) = &app.modal {
        if let Some(painting) = catalog.get(modal.painting) {
            render_modal(f, painting, modal, theme);
        }
    }
}

fn render_nav(f: &mut Frame, area: Rect, active: &SectionId, theme: &Theme) {
    let block = Block::default().borders(Borders::BOTTOM).border_style(theme.card_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let mut spans = vec![Span::styled(" KiwiArt ", theme.brand), Span::raw("   ")];
    for (i, item) in NAV_ITEMS.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" · ", theme.card_border));
        }
        let style = if item.section == active.as_str() { theme.nav_active } else { theme.nav_idle };
        spans.push(Span::styled(format!("{} [{}]", item.name, i + 1), style));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), inner);
}

fn render_footer(f: &mut Frame, area: Rect, app: &AppState, theme: &Theme) {
    let text = match &app.status {
        Some(status) => status.clone(),
        None => match app.focus {
            FocusArea::Page => "↑/↓ or j/k Scroll | PgUp/PgDn | 1-4 Sections | Tab/Shift+Tab Select | <Enter> Details | ? Chat | q Quit".to_string(),
            FocusArea::Modal => "←/→ Media | c Copy details | Esc Close".to_string(),
            FocusArea::Chat => "Type a message | <Enter> Send | Esc Close chat".to_string(),
        },
    };
    let footer = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL))
        .style(theme.footer);
    f.render_widget(footer, area);
}

fn render_chat_button(f: &mut Frame, page: Rect, theme: &Theme) {
    if page.width < 12 || page.height < 3 {
        return;
    }
    let area = Rect {
        x: page.x + page.width - 12,
        y: page.y + page.height - 3,
        width: 12,
        height: 3,
    };
    f.render_widget(Clear, area);
    let button = Paragraph::new(" ? Chat ")
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_style(theme.popup_border))
        .style(theme.popup_title);
    f.render_widget(button, area);
}

fn render_chat(f: &mut Frame, page: Rect, session: &ChatSession, focused: bool, theme: &Theme) {
    let width = CHAT_WIDTH.min(page.width);
    let height = CHAT_HEIGHT.min(page.height);
    let area = Rect {
        x: page.x + page.width - width,
        y: page.y + page.height - height,
        width,
        height,
    };
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(" KiwiArt Assistant ", theme.popup_title))
        .title_bottom(Line::styled(" Ask me anything about our art! ✨ ", theme.chat_meta))
        .borders(Borders::ALL)
        .border_style(if focused { theme.card_selected } else { theme.popup_border });
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)])
        .split(inner);

    let lines = chat_lines(session.messages(), chunks[0].width as usize, session.is_sending(), theme);
    let scroll = u16::try_from(lines.len()).unwrap_or(u16::MAX).saturating_sub(chunks[0].height);
    f.render_widget(Paragraph::new(lines).scroll((scroll, 0)), chunks[0]);

    let input = if session.state() == SessionState::Sending {
        Line::styled("waiting for reply…", theme.chat_meta)
    } else if session.input().is_empty() && !focused {
        Line::styled("Ask something...", theme.chat_meta)
    } else {
        let visible = chunks[1].width.saturating_sub(3) as usize;
        let text = tail(session.input(), visible);
        Line::from(vec![
            Span::styled(text, Style::default().fg(theme.text)),
            Span::styled(if focused { "█" } else { "" }, Style::default().fg(theme.accent)),
        ])
    };
    let input_box = Paragraph::new(input).block(Block::default().borders(Borders::ALL).border_style(theme.card_border));
    f.render_widget(input_box, chunks[1]);
}

fn render_modal(f: &mut Frame, painting: &Painting, modal: &DetailModal, theme: &Theme) {
    let area = centered_rect(80, 85, f.area());
    f.render_widget(Clear, area);
    let block = Block::default()
        .title(Span::styled(format!(" {} ", painting.name), theme.popup_title))
        .title_bottom(Line::styled(" ←/→ media · c copy · Esc close ", theme.chat_meta))
        .borders(Borders::ALL)
        .style(theme.popup_border);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(inner);

    // Left: media strip and the current preview
    let media = painting.media();
    let mut left = vec![Line::styled("Media", theme.heading), Line::default()];
    for (i, item) in media.iter().enumerate() {
        let current = i == modal.media_index;
        let icon = match item.kind {
            MediaKind::Video => "▶",
            MediaKind::Image => "▣",
        };
        let style = if current { theme.card_selected } else { Style::default().fg(theme.text_secondary) };
        left.push(Line::styled(
            format!("{} {} {}", if current { "→" } else { " " }, icon, item.label),
            style,
        ));
    }
    if let Some(item) = media.get(modal.media_index) {
        left.push(Line::default());
        left.push(Line::styled("Now showing:", theme.subtitle));
        left.push(Line::styled(item.url.to_string(), Style::default().fg(theme.accent_soft)));
    }
    f.render_widget(Paragraph::new(left).wrap(Wrap { trim: false }), columns[0]);

    // Right: details and pricing
    let mut right = vec![
        Line::styled(painting.name.clone(), theme.heading),
        Line::styled(format!("by {}", painting.artist), theme.subtitle),
        Line::default(),
        Line::styled(painting.description.clone(), Style::default().fg(theme.text)),
        Line::default(),
        Line::styled("Details:", Style::default().fg(theme.text).add_modifier(Modifier::BOLD)),
        Line::from(vec![
            Span::styled("• Materials: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(painting.materials.join(", ")),
        ]),
        Line::from(vec![
            Span::styled("• Dimensions: ", Style::default().add_modifier(Modifier::BOLD)),
            Span::raw(painting.dimensions.clone()),
        ]),
        Line::default(),
    ];
    let mut price = Vec::new();
    if let Some(original) = painting.original_price.filter(|_| painting.has_discount()) {
        price.push(Span::styled(format_price(original), theme.price_struck));
        price.push(Span::raw("  "));
    }
    price.push(Span::styled(format_price(painting.price), theme.price));
    right.push(Line::from(price));
    right.push(Line::default());
    right.push(Line::styled(" Add to Cart ", theme.button));
    f.render_widget(
        Paragraph::new(right).wrap(Wrap { trim: false }).block(Block::default().borders(Borders::LEFT).border_style(theme.card_border)),
        columns[1],
    );
}

/// Centers a rectangle within another rectangle.
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vertical = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage((100-percent_y)/2), Constraint::Percentage(percent_y), Constraint::Percentage((100-percent_y)/2)]).split(r)[1];
    Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Percentage((100-percent_x)/2), Constraint::Percentage(percent_x), Constraint::Percentage((100-percent_x)/2)]).split(vertical)[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::builtin_catalog;
    use ratatui::{Terminal, backend::TestBackend};

    fn page(width: u16) -> Page {
        build_page(&builtin_catalog(), width, 24, 0, 2026, &Theme::default())
    }

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn sections_are_contiguous_and_in_nav_order() {
        let page = page(100);
        let ids: Vec<&str> = page.sections.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["home", "gallery", "about", "contact"]);
        let regions: Vec<Region> = page.sections.iter().filter_map(|s| s.region).collect();
        assert_eq!(regions[0], Region::new(0.0, 24.0));
        for pair in regions.windows(2) {
            assert_eq!(pair[0].bottom(), pair[1].top);
        }
        // the footer follows the last section
        assert!(page.height() as f64 > regions[3].bottom());
    }

    #[test]
    fn gallery_grid_follows_the_width() {
        let wide = page(100);
        let narrow = page(40);
        assert_eq!(wide.card_tops.len(), 6);
        assert_eq!(narrow.card_tops.len(), 6);
        // three columns at 100, one at 40
        assert_eq!(wide.card_tops[0], wide.card_tops[2]);
        assert_ne!(wide.card_tops[2], wide.card_tops[3]);
        assert!(narrow.card_tops.windows(2).all(|w| w[0] < w[1]));
        assert!(narrow.height() > wide.height());
    }

    #[test]
    fn card_rows_have_uniform_width() {
        let page = page(100);
        let top = page.card_tops[0] as usize;
        let widths: Vec<usize> = page.lines[top..top + CARD_HEIGHT as usize]
            .iter()
            .map(|line| display_width(&line_text(line)))
            .collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
        assert!(line_text(&page.lines[top + 1]).contains("Lapis Twilight"));
    }

    #[test]
    fn anchors_match_section_tops() {
        let page = page(80);
        let anchors = page.anchors();
        assert_eq!(anchors[0], (SectionId::from("home"), 0));
        assert_eq!(anchors[1].1, 24);
    }

    #[test]
    fn footer_carries_the_year() {
        let page = page(80);
        assert!(page.lines.iter().any(|l| line_text(l).contains("© 2026 KiwiArt")));
    }

    #[test]
    fn prices_and_handles_are_highlighted() {
        let theme = Theme::default();
        let spans = highlight_spans("From $850 to $1950, follow @kiwiart!", Style::default(), &theme);
        let highlighted: Vec<&str> = spans
            .iter()
            .filter(|s| s.style == Style::default().patch(theme.chat_highlight))
            .map(|s| s.content.as_ref())
            .collect();
        assert_eq!(highlighted, vec!["$850", "$1950", "@kiwiart"]);
        let joined: String = spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(joined, "From $850 to $1950, follow @kiwiart!");
    }

    #[test]
    fn chat_lines_align_by_sender() {
        let mut session = ChatSession::new("Welcome!");
        session.submit("price?").unwrap();
        let lines = chat_lines(session.messages(), 40, session.is_sending(), &Theme::default());
        assert_eq!(lines[0].alignment, Some(Alignment::Left));
        let user_line = lines.iter().find(|l| line_text(l) == "price?").unwrap();
        assert_eq!(user_line.alignment, Some(Alignment::Right));
        let typing = lines.last().unwrap();
        assert_eq!(line_text(typing), "● ● ●");
        assert_eq!(typing.alignment, Some(Alignment::Left));
    }

    #[test]
    fn chat_bubbles_fit_wide_characters() {
        let session = ChatSession::new("Hello! 👋 Welcome to KiwiArt 🎨🎨🎨🎨🎨🎨🎨🎨 gallery");
        let lines = chat_lines(session.messages(), 16, false, &Theme::default());
        let emoji_lines: Vec<&Line> = lines.iter().filter(|l| line_text(l).contains('🎨')).collect();
        assert!(emoji_lines.len() >= 2);
        assert!(emoji_lines.iter().all(|l| l.width() <= 12));
    }

    #[test]
    fn card_rows_stay_aligned_with_wide_names() {
        let mut catalog = builtin_catalog();
        catalog[0].name = "Lapis 🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟🌟".to_string();
        let page = build_page(&catalog, 100, 24, 0, 2026, &Theme::default());
        let top = page.card_tops[0] as usize;
        let widths: Vec<usize> = page.lines[top..top + CARD_HEIGHT as usize]
            .iter()
            .map(|line| line.width())
            .collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        terminal.backend().buffer().content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn renders_chat_window_and_modal() {
        let catalog = builtin_catalog();
        let theme = Theme::default();
        let page = build_page(&catalog, 79, 24, 0, 2026, &theme);
        let mut app = AppState::new(catalog.len());
        app.sync_layout(page.height(), 24, page.anchors(), page.card_tops.clone());
        let session = Arc::new(Mutex::new(ChatSession::new("Hi")));
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();

        terminal
            .draw(|f| render(f, &app, &page, &"gallery".into(), &catalog, &session, &theme))
            .unwrap();
        assert!(screen_text(&terminal).contains("? Chat"));

        lock_session(&session).open = true;
        terminal
            .draw(|f| render(f, &app, &page, &"gallery".into(), &catalog, &session, &theme))
            .unwrap();
        assert!(screen_text(&terminal).contains("KiwiArt Assistant"));

        lock_session(&session).open = false;
        app.open_modal(catalog[0].media().len(), catalog[0].main_media_index());
        terminal
            .draw(|f| render(f, &app, &page, &"gallery".into(), &catalog, &session, &theme))
            .unwrap();
        let text = screen_text(&terminal);
        assert!(text.contains("Add to Cart"));
        assert!(text.contains("Materials"));
    }

    #[test]
    fn chat_input_shows_the_pending_reply() {
        let catalog = builtin_catalog();
        let theme = Theme::default();
        let page = build_page(&catalog, 79, 24, 0, 2026, &theme);
        let mut app = AppState::new(catalog.len());
        app.sync_layout(page.height(), 24, page.anchors(), page.card_tops.clone());
        app.focus = FocusArea::Chat;
        let session = Arc::new(Mutex::new(ChatSession::new("Hi")));
        {
            let mut guard = lock_session(&session);
            guard.open = true;
            guard.submit("price?").unwrap();
        }
        let mut terminal = Terminal::new(TestBackend::new(80, 30)).unwrap();
        terminal
            .draw(|f| render(f, &app, &page, &"home".into(), &catalog, &session, &theme))
            .unwrap();
        assert!(screen_text(&terminal).contains("waiting for reply"));
    }
}

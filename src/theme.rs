use ratatui::style::{Color, Modifier, Style};

pub struct Theme {
    pub brand: Style,
    pub accent: Color,
    pub accent_soft: Color,
    pub text: Color,
    pub text_secondary: Color,

    // Specific components
    pub nav_active: Style,
    pub nav_idle: Style,
    pub heading: Style,
    pub subtitle: Style,
    pub card_border: Style,
    pub card_selected: Style,
    pub price: Style,
    pub price_struck: Style,
    pub button: Style,
    pub chat_user: Style,
    pub chat_agent: Style,
    pub chat_meta: Style,
    pub chat_highlight: Style,
    pub footer: Style,
    pub popup_title: Style,
    pub popup_border: Style,
}

impl Default for Theme {
    fn default() -> Self {
        let purple = Color::Rgb(147, 51, 234);
        let pink = Color::Rgb(236, 72, 153);
        Self {
            brand: Style::default().fg(purple).add_modifier(Modifier::BOLD),
            accent: purple,
            accent_soft: Color::Rgb(216, 180, 254),
            text: Color::White,
            text_secondary: Color::Gray,

            nav_active: Style::default().fg(purple).add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            nav_idle: Style::default().fg(Color::Gray),
            heading: Style::default().fg(pink).add_modifier(Modifier::BOLD),
            subtitle: Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            card_border: Style::default().fg(Color::DarkGray),
            card_selected: Style::default().fg(pink).add_modifier(Modifier::BOLD),
            price: Style::default().fg(purple).add_modifier(Modifier::BOLD),
            price_struck: Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT),
            button: Style::default().fg(Color::White).bg(purple).add_modifier(Modifier::BOLD),
            chat_user: Style::default().fg(Color::White).bg(purple),
            chat_agent: Style::default().fg(Color::Black).bg(Color::Gray),
            chat_meta: Style::default().fg(Color::DarkGray),
            chat_highlight: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            footer: Style::default().fg(Color::Gray).add_modifier(Modifier::DIM),
            popup_title: Style::default().fg(pink).add_modifier(Modifier::BOLD),
            popup_border: Style::default().fg(purple).bg(Color::Black),
        }
    }
}

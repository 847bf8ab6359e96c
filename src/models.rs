use crate::tracker::SectionId;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FocusArea {
    Page,
    Modal,
    Chat,
}

pub struct NavItem {
    pub name: &'static str,
    pub section: &'static str,
}

pub const NAV_ITEMS: [NavItem; 4] = [
    NavItem { name: "Home", section: "home" },
    NavItem { name: "Gallery", section: "gallery" },
    NavItem { name: "About", section: "about" },
    NavItem { name: "Contact", section: "contact" },
];

/// Lines taken by one gallery card.
pub const CARD_HEIGHT: u16 = 7;

pub struct DetailModal {
    pub painting: usize,
    pub media_index: usize,
    pub media_len: usize,
}

impl DetailModal {
    pub fn next_media(&mut self) {
        if self.media_index + 1 < self.media_len {
            self.media_index += 1;
        }
    }

    pub fn prev_media(&mut self) {
        self.media_index = self.media_index.saturating_sub(1);
    }
}

/// Everything the page view needs between frames.
pub struct AppState {
    pub scroll: u16,
    pub max_scroll: u16,
    pub viewport_height: u16,
    pub selected_card: usize,
    pub card_count: usize,
    pub card_tops: Vec<u16>,
    pub anchors: Vec<(SectionId, u16)>,
    pub modal: Option<DetailModal>,
    pub focus: FocusArea,
    pub status: Option<String>,
}

impl AppState {
    pub fn new(card_count: usize) -> Self {
        Self {
            scroll: 0,
            max_scroll: 0,
            viewport_height: 0,
            selected_card: 0,
            card_count,
            card_tops: Vec::new(),
            anchors: Vec::new(),
            modal: None,
            focus: FocusArea::Page,
            status: None,
        }
    }

    /// Takes the geometry of the freshly laid out page.
    pub fn sync_layout(&mut self, content_height: u16, viewport_height: u16, anchors: Vec<(SectionId, u16)>, card_tops: Vec<u16>) {
        self.viewport_height = viewport_height;
        self.max_scroll = content_height.saturating_sub(viewport_height);
        self.scroll = self.scroll.min(self.max_scroll);
        self.anchors = anchors;
        self.card_tops = card_tops;
    }

    pub fn scroll_by(&mut self, delta: i32) {
        let target = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll));
        self.scroll = target as u16;
    }

    pub fn scroll_to(&mut self, offset: u16) {
        self.scroll = offset.min(self.max_scroll);
    }

    /// Scrolls to the anchor of `section`. Returns false for unknown sections.
    pub fn jump_to(&mut self, section: &SectionId) -> bool {
        match self.anchors.iter().find(|(id, _)| id == section) {
            Some((_, top)) => {
                self.scroll_to(*top);
                true
            }
            None => false,
        }
    }

    pub fn select_card(&mut self, delta: isize) {
        if self.card_count == 0 {
            return;
        }
        let count = self.card_count as isize;
        self.selected_card = (self.selected_card as isize + delta).rem_euclid(count) as usize;
        self.reveal_selected_card();
    }

    fn reveal_selected_card(&mut self) {
        let Some(&top) = self.card_tops.get(self.selected_card) else {
            return;
        };
        let bottom = top + CARD_HEIGHT;
        if top < self.scroll {
            self.scroll_to(top);
        } else if bottom > self.scroll + self.viewport_height {
            self.scroll_to(bottom.saturating_sub(self.viewport_height));
        }
    }

    pub fn open_modal(&mut self, media_len: usize, main_media_index: usize) {
        if self.card_count == 0 {
            return;
        }
        self.modal = Some(DetailModal {
            painting: self.selected_card,
            media_index: main_media_index,
            media_len,
        });
        self.focus = FocusArea::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.focus = FocusArea::Page;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laid_out() -> AppState {
        let mut app = AppState::new(4);
        app.sync_layout(
            200,
            40,
            vec![("home".into(), 0), ("gallery".into(), 40), ("about".into(), 120), ("contact".into(), 150)],
            vec![45, 45, 53, 53],
        );
        app
    }

    #[test]
    fn scrolling_is_clamped() {
        let mut app = laid_out();
        app.scroll_by(-5);
        assert_eq!(app.scroll, 0);
        app.scroll_by(1000);
        assert_eq!(app.scroll, 160);
    }

    #[test]
    fn jumps_to_section_anchors() {
        let mut app = laid_out();
        assert!(app.jump_to(&"about".into()));
        assert_eq!(app.scroll, 120);
        assert!(app.jump_to(&"contact".into()));
        assert_eq!(app.scroll, 150);
        app.anchors.push(("footer".into(), 190));
        assert!(app.jump_to(&"footer".into()));
        assert_eq!(app.scroll, 160);
        assert!(!app.jump_to(&"shop".into()));
    }

    #[test]
    fn card_selection_wraps_and_scrolls_into_view() {
        let mut app = laid_out();
        app.select_card(-1);
        assert_eq!(app.selected_card, 3);
        // card at 53..60 must fit in a 40-row viewport
        assert_eq!(app.scroll, 20);
        app.scroll_to(100);
        app.select_card(1);
        assert_eq!(app.selected_card, 0);
        assert_eq!(app.scroll, 45);
    }

    #[test]
    fn shrinking_layout_clamps_scroll() {
        let mut app = laid_out();
        app.scroll_to(160);
        app.sync_layout(100, 40, Vec::new(), Vec::new());
        assert_eq!(app.scroll, 60);
    }

    #[test]
    fn modal_starts_on_the_main_media() {
        let mut app = laid_out();
        app.select_card(2);
        app.open_modal(3, 1);
        let modal = app.modal.as_mut().unwrap();
        assert_eq!(modal.painting, 2);
        assert_eq!(modal.media_index, 1);
        modal.next_media();
        modal.next_media();
        assert_eq!(modal.media_index, 2);
        assert_eq!(app.focus, FocusArea::Modal);
        app.close_modal();
        assert!(app.modal.is_none());
        assert_eq!(app.focus, FocusArea::Page);
    }

    #[test]
    fn empty_gallery_never_opens_a_modal() {
        let mut app = AppState::new(0);
        app.select_card(1);
        app.open_modal(1, 0);
        assert!(app.modal.is_none());
    }
}

//! Active-section tracking for the navigation bar.
//!
//! The tracker keeps one active section id. Every batch of visibility records
//! is reduced against the previous value: the most visible intersecting
//! section wins, and scrolling back near the top of the page returns to home.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::viewport::{IntersectionObserver, Region, VisibilityEvent};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl SectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SectionId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    pub id: SectionId,
    /// `None` while the renderer has not laid the section out yet.
    pub region: Option<Region>,
}

impl Section {
    pub fn new(id: impl Into<SectionId>, region: Option<Region>) -> Self {
        Self { id: id.into(), region }
    }
}

/// Why a visibility record was discarded before reduction.
#[derive(Debug, Error, PartialEq)]
pub enum DroppedEvent {
    #[error("visibility record for unknown section `{0}`")]
    UnknownSection(SectionId),
    #[error("visibility ratio {ratio} for section `{id}` is outside [0, 1]")]
    RatioOutOfRange { id: SectionId, ratio: f64 },
}

/// Reduces one batch against the previous active section.
///
/// Near the top of the page a `previous` other than `home` is replaced by
/// `home`. Otherwise the first intersecting record with the greatest ratio
/// wins, and a batch without any intersecting record keeps `previous`.
pub fn select_active(
    previous: &SectionId,
    events: &[VisibilityEvent],
    scroll_top: f64,
    home: &SectionId,
    near_top: f64,
) -> SectionId {
    if scroll_top < near_top && previous != home {
        return home.clone();
    }
    most_visible(events).unwrap_or(previous).clone()
}

fn most_visible(events: &[VisibilityEvent]) -> Option<&SectionId> {
    let mut best: Option<&VisibilityEvent> = None;
    for event in events.iter().filter(|e| e.is_intersecting) {
        match best {
            Some(current) if event.intersection_ratio <= current.intersection_ratio => {}
            _ => best = Some(event),
        }
    }
    best.map(|e| &e.section_id)
}

pub struct SectionTracker {
    home: SectionId,
    near_top: f64,
    sections: Vec<Section>,
    active: SectionId,
    observer: Option<IntersectionObserver>,
}

impl SectionTracker {
    pub fn new(home: impl Into<SectionId>, near_top: f64) -> Self {
        let home = home.into();
        Self {
            sections: vec![Section::new(home.clone(), None)],
            active: home.clone(),
            home,
            near_top,
            observer: None,
        }
    }

    pub fn home(&self) -> &SectionId {
        &self.home
    }

    pub fn active(&self) -> &SectionId {
        &self.active
    }

    pub fn is_running(&self) -> bool {
        self.observer.is_some()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    /// Begins observation of `sections`. Calling `start` on a running tracker
    /// only registers the additional sections.
    pub fn start(&mut self, sections: impl IntoIterator<Item = Section>) {
        if self.observer.is_none() {
            debug!(home = %self.home, "section tracker started");
            self.observer = Some(IntersectionObserver::default());
            if !self.sections.iter().any(|s| s.id == self.home) {
                self.sections.push(Section::new(self.home.clone(), None));
            }
            // sections known before start get observed now
            for section in self.sections.clone() {
                self.observe(&section);
            }
        }
        for section in sections {
            self.register(section);
        }
    }

    /// Adds a section or replaces its region.
    pub fn register(&mut self, section: Section) {
        self.observe(&section);
        match self.sections.iter_mut().find(|s| s.id == section.id) {
            Some(existing) => existing.region = section.region,
            None => {
                debug!(section = %section.id, "section registered");
                self.sections.push(section);
            }
        }
    }

    /// Removes a section. Home cannot be removed; if the active section goes
    /// away the tracker falls back to home.
    pub fn unregister(&mut self, id: &SectionId) -> bool {
        if id == &self.home {
            warn!(section = %id, "refusing to unregister the home section");
            return false;
        }
        let before = self.sections.len();
        self.sections.retain(|s| &s.id != id);
        if let Some(observer) = self.observer.as_mut() {
            observer.unobserve(id);
        }
        if &self.active == id {
            self.active = self.home.clone();
        }
        self.sections.len() != before
    }

    /// Releases the observer and the registry. The last active value stays
    /// readable; later updates are ignored until the next `start`.
    pub fn stop(&mut self) {
        if let Some(mut observer) = self.observer.take() {
            observer.disconnect();
            debug!("section tracker stopped");
        }
        self.sections.clear();
    }

    /// Applies one batch of visibility records.
    pub fn update(&mut self, events: &[VisibilityEvent], scroll_top: f64) -> &SectionId {
        if !self.is_running() {
            debug!("ignoring visibility batch on a stopped tracker");
            return &self.active;
        }
        let valid: Vec<VisibilityEvent> = events
            .iter()
            .filter(|event| match self.validate(event) {
                Ok(()) => true,
                Err(reason) => {
                    warn!("{reason}");
                    false
                }
            })
            .cloned()
            .collect();

        let next = select_active(&self.active, &valid, scroll_top, &self.home, self.near_top);
        if next != self.active {
            debug!(from = %self.active, to = %next, scroll_top, "active section changed");
            self.active = next;
        }
        &self.active
    }

    /// Drains the observer and reduces the records, if any.
    pub fn poll(&mut self, scroll_top: f64, viewport_height: f64) -> &SectionId {
        let records = match self.observer.as_mut() {
            Some(observer) => observer.take_records(scroll_top, viewport_height),
            None => return &self.active,
        };
        if records.is_empty() {
            return &self.active;
        }
        self.update(&records, scroll_top)
    }

    fn validate(&self, event: &VisibilityEvent) -> Result<(), DroppedEvent> {
        if !self.sections.iter().any(|s| s.id == event.section_id) {
            return Err(DroppedEvent::UnknownSection(event.section_id.clone()));
        }
        let ratio = event.intersection_ratio;
        if !(0.0..=1.0).contains(&ratio) {
            return Err(DroppedEvent::RatioOutOfRange {
                id: event.section_id.clone(),
                ratio,
            });
        }
        Ok(())
    }

    fn observe(&mut self, section: &Section) {
        let Some(observer) = self.observer.as_mut() else {
            return;
        };
        match section.region {
            Some(region) => observer.observe(section.id.clone(), region),
            None => observer.unobserve(&section.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NEAR_TOP: f64 = 100.0;

    fn ev(id: &str, intersecting: bool, ratio: f64) -> VisibilityEvent {
        VisibilityEvent::new(id, intersecting, ratio)
    }

    fn running_tracker() -> SectionTracker {
        let mut tracker = SectionTracker::new("home", NEAR_TOP);
        tracker.start(
            ["home", "gallery", "about", "contact"]
                .into_iter()
                .map(|id| Section::new(id, None)),
        );
        tracker
    }

    #[test]
    fn picks_the_most_visible_intersecting_section() {
        let mut tracker = running_tracker();
        let events = [
            ev("gallery", true, 0.3),
            ev("about", true, 0.9),
            ev("contact", false, 0.0),
        ];
        assert_eq!(tracker.update(&events, 500.0).as_str(), "about");
    }

    #[test]
    fn non_intersecting_records_never_win() {
        let mut tracker = running_tracker();
        let events = [ev("gallery", true, 0.2), ev("about", false, 1.0)];
        assert_eq!(tracker.update(&events, 500.0).as_str(), "gallery");
    }

    #[test]
    fn first_record_wins_a_tie() {
        let mut tracker = running_tracker();
        let events = [
            ev("contact", true, 0.5),
            ev("gallery", true, 0.5),
            ev("about", true, 0.25),
        ];
        assert_eq!(tracker.update(&events, 500.0).as_str(), "contact");
    }

    #[test]
    fn batch_without_intersections_keeps_previous() {
        let mut tracker = running_tracker();
        tracker.update(&[ev("about", true, 0.6)], 500.0);
        let events = [ev("gallery", false, 0.0), ev("contact", false, 0.0)];
        assert_eq!(tracker.update(&events, 500.0).as_str(), "about");
        assert_eq!(tracker.update(&[], 500.0).as_str(), "about");
    }

    #[test]
    fn near_top_forces_home_over_the_candidate() {
        let mut tracker = running_tracker();
        tracker.update(&[ev("contact", true, 1.0)], 800.0);
        assert_eq!(tracker.active().as_str(), "contact");
        let events = [ev("gallery", true, 1.0)];
        assert_eq!(tracker.update(&events, 99.0).as_str(), "home");
    }

    #[test]
    fn near_top_lets_the_candidate_win_once_home_is_active() {
        let home = SectionId::from("home");
        let events = [ev("gallery", true, 1.0)];
        assert_eq!(select_active(&home, &events, 50.0, &home, 100.0).as_str(), "gallery");

        let mut tracker = running_tracker();
        assert_eq!(tracker.update(&events, 50.0).as_str(), "gallery");
        // leaving gallery near the top goes back home first
        assert_eq!(tracker.update(&events, 50.0).as_str(), "home");
    }

    #[test]
    fn repeated_updates_are_idempotent() {
        let home = SectionId::from("home");
        let about = SectionId::from("about");
        let events = [ev("gallery", true, 0.75), ev("home", true, 0.25)];
        for previous in [&home, &about] {
            let first = select_active(previous, &events, 40.0, &home, 100.0);
            let second = select_active(previous, &events, 40.0, &home, 100.0);
            assert_eq!(first, second);
        }

        let mut tracker = running_tracker();
        let events = [ev("gallery", true, 0.75)];
        let first = tracker.update(&events, 400.0).clone();
        let second = tracker.update(&events, 400.0).clone();
        assert_eq!(first.as_str(), "gallery");
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_records_are_dropped() {
        let mut tracker = running_tracker();
        let events = [
            ev("shop", true, 1.0),
            ev("about", true, 1.5),
            ev("contact", true, f64::NAN),
            ev("gallery", true, 0.1),
        ];
        assert_eq!(tracker.update(&events, 500.0).as_str(), "gallery");
    }

    #[test]
    fn validate_reports_the_drop_reason() {
        let tracker = running_tracker();
        assert_eq!(
            tracker.validate(&ev("shop", true, 0.5)),
            Err(DroppedEvent::UnknownSection("shop".into()))
        );
        assert!(matches!(
            tracker.validate(&ev("about", true, -0.1)),
            Err(DroppedEvent::RatioOutOfRange { .. })
        ));
        assert_eq!(tracker.validate(&ev("about", true, 0.0)), Ok(()));
    }

    #[test]
    fn late_sections_can_be_registered() {
        let mut tracker = running_tracker();
        assert_eq!(tracker.update(&[ev("press", true, 1.0)], 500.0).as_str(), "home");
        tracker.register(Section::new("press", Some(Region::new(900.0, 50.0))));
        assert_eq!(tracker.update(&[ev("press", true, 1.0)], 500.0).as_str(), "press");
    }

    #[test]
    fn unregistering_the_active_section_falls_back_to_home() {
        let mut tracker = running_tracker();
        tracker.update(&[ev("contact", true, 1.0)], 900.0);
        assert!(tracker.unregister(&"contact".into()));
        assert_eq!(tracker.active().as_str(), "home");
        assert!(!tracker.unregister(&"home".into()));
    }

    #[test]
    fn stopped_tracker_ignores_batches() {
        let mut tracker = running_tracker();
        tracker.update(&[ev("about", true, 1.0)], 500.0);
        tracker.stop();
        assert!(!tracker.is_running());
        assert!(tracker.sections().is_empty());
        assert_eq!(tracker.update(&[ev("gallery", true, 1.0)], 500.0).as_str(), "about");
        assert_eq!(tracker.poll(500.0, 100.0).as_str(), "about");
    }

    #[test]
    fn poll_follows_the_scroll_position() {
        let mut tracker = SectionTracker::new("home", 10.0);
        tracker.start([
            Section::new("home", Some(Region::new(0.0, 40.0))),
            Section::new("gallery", Some(Region::new(40.0, 60.0))),
            Section::new("about", None),
        ]);
        assert_eq!(tracker.poll(0.0, 40.0).as_str(), "home");
        // root is [49, 81]: gallery fully covers it, home is out of view
        assert_eq!(tracker.poll(45.0, 40.0).as_str(), "gallery");
        // nothing crosses a threshold, the active value is kept
        assert_eq!(tracker.poll(46.0, 40.0).as_str(), "gallery");
        assert_eq!(tracker.poll(0.0, 40.0).as_str(), "home");
    }

    #[test]
    fn select_active_is_a_pure_reduction() {
        let home = SectionId::from("home");
        let previous = SectionId::from("about");
        let events = [ev("gallery", true, 0.4), ev("contact", true, 0.6)];
        assert_eq!(select_active(&previous, &events, 300.0, &home, 100.0).as_str(), "contact");
        assert_eq!(select_active(&previous, &[], 300.0, &home, 100.0), previous);
        assert_eq!(select_active(&previous, &events, 0.0, &home, 100.0), home);
        assert_eq!(select_active(&home, &events, 0.0, &home, 100.0).as_str(), "contact");
    }
}

//! Viewport observation: turns section regions and a scroll offset into
//! visibility records, emitted only when a section crosses a threshold.

use tracing::trace;

use crate::tracker::SectionId;

/// Visibility levels at which a record is produced.
pub const DEFAULT_THRESHOLDS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Fraction of the viewport height trimmed from its top and bottom edge.
pub const DEFAULT_ROOT_MARGIN: f64 = 0.10;

/// Vertical extent of a section in page coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Region {
    pub top: f64,
    pub height: f64,
}

impl Region {
    pub fn new(top: f64, height: f64) -> Self {
        Self { top, height }
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VisibilityEvent {
    pub section_id: SectionId,
    pub is_intersecting: bool,
    pub intersection_ratio: f64,
}

impl VisibilityEvent {
    pub fn new(section_id: impl Into<SectionId>, is_intersecting: bool, intersection_ratio: f64) -> Self {
        Self {
            section_id: section_id.into(),
            is_intersecting,
            intersection_ratio,
        }
    }
}

struct Target {
    id: SectionId,
    region: Region,
    // (intersecting, threshold bucket) from the last emitted record
    last: Option<(bool, usize)>,
}

pub struct IntersectionObserver {
    thresholds: Vec<f64>,
    root_margin: f64,
    targets: Vec<Target>,
}

impl Default for IntersectionObserver {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLDS.to_vec(), DEFAULT_ROOT_MARGIN)
    }
}

impl IntersectionObserver {
    pub fn new(thresholds: Vec<f64>, root_margin: f64) -> Self {
        Self {
            thresholds,
            root_margin,
            targets: Vec::new(),
        }
    }

    /// Starts watching `id`, or replaces its region if already watched.
    /// A replaced region always yields a fresh record on the next pass.
    pub fn observe(&mut self, id: SectionId, region: Region) {
        if let Some(target) = self.targets.iter_mut().find(|t| t.id == id) {
            if target.region != region {
                target.region = region;
                target.last = None;
            }
            return;
        }
        self.targets.push(Target { id, region, last: None });
    }

    pub fn unobserve(&mut self, id: &SectionId) {
        self.targets.retain(|t| &t.id != id);
    }

    pub fn disconnect(&mut self) {
        self.targets.clear();
    }

    #[cfg(test)]
    pub fn is_observing(&self, id: &SectionId) -> bool {
        self.targets.iter().any(|t| &t.id == id)
    }

    /// Measures every target against the viewport and returns the records for
    /// targets whose intersecting flag or threshold bucket changed, in
    /// observation order.
    pub fn take_records(&mut self, scroll_top: f64, viewport_height: f64) -> Vec<VisibilityEvent> {
        let margin = viewport_height * self.root_margin;
        let root_top = scroll_top + margin;
        let root_bottom = scroll_top + viewport_height - margin;

        let mut records = Vec::new();
        for target in &mut self.targets {
            // zero-height regions have no measurable ratio
            if target.region.height <= 0.0 {
                continue;
            }
            let overlap = target.region.bottom().min(root_bottom) - target.region.top.max(root_top);
            let is_intersecting = overlap > 0.0;
            let ratio = if is_intersecting {
                (overlap / target.region.height).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let bucket = self.thresholds.iter().filter(|t| ratio >= **t).count();
            let state = (is_intersecting, bucket);
            if target.last == Some(state) {
                continue;
            }
            target.last = Some(state);
            trace!(section = %target.id, is_intersecting, ratio, "visibility record");
            records.push(VisibilityEvent::new(target.id.clone(), is_intersecting, ratio));
        }
        records
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observer() -> IntersectionObserver {
        let mut observer = IntersectionObserver::default();
        observer.observe("home".into(), Region::new(0.0, 100.0));
        observer.observe("gallery".into(), Region::new(100.0, 200.0));
        observer
    }

    #[test]
    fn first_pass_reports_every_target() {
        let mut observer = observer();
        let records = observer.take_records(0.0, 100.0);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].section_id.as_str(), "home");
        assert!(records[0].is_intersecting);
        // root is [10, 90], so 80 of 100 rows are inside
        assert!((records[0].intersection_ratio - 0.8).abs() < 1e-9);
        assert!(!records[1].is_intersecting);
    }

    #[test]
    fn no_record_without_threshold_crossing() {
        let mut observer = observer();
        observer.take_records(0.0, 100.0);
        // root moves to [11, 91]: home stays at 0.8, gallery still outside
        assert!(observer.take_records(1.0, 100.0).is_empty());
    }

    #[test]
    fn crossing_a_threshold_emits_only_that_target() {
        let mut observer = observer();
        observer.take_records(0.0, 100.0);
        let records = observer.take_records(50.0, 100.0);
        // home: [60,100] of [0,100] -> 0.4; gallery: [100,140] of 200 -> 0.2
        assert_eq!(records.len(), 2);
        assert!((records[0].intersection_ratio - 0.4).abs() < 1e-9);
        assert!(records[1].is_intersecting);
        assert!((records[1].intersection_ratio - 0.2).abs() < 1e-9);
    }

    #[test]
    fn replacing_a_region_forces_a_record() {
        let mut observer = observer();
        observer.take_records(0.0, 100.0);
        observer.observe("gallery".into(), Region::new(80.0, 200.0));
        let records = observer.take_records(0.0, 100.0);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].section_id.as_str(), "gallery");
        assert!(records[0].is_intersecting);
    }

    #[test]
    fn zero_height_regions_are_skipped() {
        let mut observer = IntersectionObserver::default();
        observer.observe("about".into(), Region::new(10.0, 0.0));
        assert!(observer.take_records(0.0, 100.0).is_empty());
    }

    #[test]
    fn disconnect_releases_targets() {
        let mut observer = observer();
        observer.disconnect();
        assert!(!observer.is_observing(&"home".into()));
        assert!(observer.take_records(0.0, 100.0).is_empty());
    }
}

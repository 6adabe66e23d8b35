//! Contact detection with a minimum-overlap threshold, and the hit
//! eligibility tracker that sits beside it.
//!
//! Two bodies are in contact only when their intersection is at least
//! `threshold` wide *and* tall. Grazing corners and edge touches are not
//! contact.

use std::time::Duration;

use bevy::prelude::*;

use crate::components::Body;
use crate::geometry::Rect;

/// True if `a` and `b` intersect and the intersection is at least
/// `min_overlap` in both dimensions.
pub fn overlap_contact(a: &Rect, b: &Rect, min_overlap: f32) -> bool {
    a.intersection(b)
        .is_some_and(|i| i.width >= min_overlap && i.height >= min_overlap)
}

/// Overlap threshold, scaled to the bodies involved.
///
/// `min_overlap` applies to bodies of `reference_size`. Smaller bodies get a
/// proportionally smaller threshold, never larger than the smaller body
/// itself, so contact stays reachable whatever the footprints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ContactRule {
    pub min_overlap: f32,
    pub reference_size: f32,
}

impl Default for ContactRule {
    fn default() -> Self {
        Self {
            min_overlap: 30.0,
            reference_size: 60.0,
        }
    }
}

impl ContactRule {
    pub fn threshold_for(&self, a: &Body, b: &Body) -> f32 {
        let smaller = a.size.min(b.size);
        (self.min_overlap * smaller / self.reference_size).min(smaller)
    }

    pub fn detect(&self, a: &Body, b: &Body) -> bool {
        overlap_contact(&a.bounds(), &b.bounds(), self.threshold_for(a, b))
    }
}

// ---------------------------------------------------------------------------
// Hit eligibility
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Vitality {
    Unhurt,
    /// Hit once; further contact is ignored until the immunity window ends.
    Wounded { since: Duration },
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Contact during immunity, or after the target is already down.
    Ignored,
    Wounded,
    Downed,
}

/// Escalates contacts into hits: the first wounds, the next one only counts
/// once `immunity` has passed since the wounding hit.
///
/// Timestamps are game-clock durations supplied by the caller.
#[derive(Component, Debug, Clone)]
pub struct HitTracker {
    immunity: Duration,
    vitality: Vitality,
}

impl HitTracker {
    pub fn new(immunity: Duration) -> Self {
        Self {
            immunity,
            vitality: Vitality::Unhurt,
        }
    }

    pub fn vitality(&self) -> Vitality {
        self.vitality
    }

    pub fn is_down(&self) -> bool {
        self.vitality == Vitality::Down
    }

    pub fn can_be_hit(&self, now: Duration) -> bool {
        match self.vitality {
            Vitality::Unhurt => true,
            Vitality::Wounded { since } => now.saturating_sub(since) >= self.immunity,
            Vitality::Down => false,
        }
    }

    pub fn register_contact(&mut self, now: Duration) -> HitOutcome {
        if !self.can_be_hit(now) {
            return HitOutcome::Ignored;
        }
        match self.vitality {
            Vitality::Unhurt => {
                self.vitality = Vitality::Wounded { since: now };
                HitOutcome::Wounded
            }
            _ => {
                self.vitality = Vitality::Down;
                HitOutcome::Downed
            }
        }
    }

    pub fn reset(&mut self) {
        self.vitality = Vitality::Unhurt;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn body(x: f32, y: f32, size: f32) -> Body {
        Body::new(Vec2::new(x, y), size, 0.0)
    }

    #[test]
    fn overlap_one_short_of_threshold_is_not_contact() {
        let rule = ContactRule::default();
        let a = body(0.0, 0.0, 60.0);
        // Intersection 29 wide, 40 tall
        assert!(!rule.detect(&a, &body(31.0, 20.0, 60.0)));
        // Intersection 40 wide, 29 tall
        assert!(!rule.detect(&a, &body(20.0, 31.0, 60.0)));
    }

    #[test]
    fn overlap_at_threshold_is_contact() {
        let rule = ContactRule::default();
        let a = body(0.0, 0.0, 60.0);
        // Intersection 30 wide, 40 tall
        assert!(rule.detect(&a, &body(30.0, 20.0, 60.0)));
        // Exactly 30 by 30
        assert!(rule.detect(&a, &body(30.0, 30.0, 60.0)));
    }

    #[test]
    fn grazing_corner_is_not_contact() {
        let rule = ContactRule::default();
        assert!(!rule.detect(&body(0.0, 0.0, 60.0), &body(58.0, 58.0, 60.0)));
    }

    #[test]
    fn disjoint_and_touching_bodies_are_not_contact() {
        let a = Rect::new(0.0, 0.0, 60.0, 60.0);
        assert!(!overlap_contact(&a, &Rect::new(100.0, 0.0, 60.0, 60.0), 0.0));
        assert!(!overlap_contact(&a, &Rect::new(60.0, 0.0, 60.0, 60.0), 0.0));
    }

    #[test]
    fn detection_is_symmetric() {
        let rule = ContactRule::default();
        let a = body(0.0, 0.0, 60.0);
        let b = body(25.0, 10.0, 60.0);
        assert_eq!(rule.detect(&a, &b), rule.detect(&b, &a));
    }

    #[test]
    fn threshold_scales_with_smaller_body() {
        let rule = ContactRule::default();
        let small = body(0.0, 0.0, 20.0);
        let large = body(0.0, 0.0, 60.0);
        assert_eq!(rule.threshold_for(&large, &large), 30.0);
        assert_eq!(rule.threshold_for(&small, &large), 10.0);
        // A small pursuer fully inside a large target is contact
        assert!(rule.detect(&body(20.0, 20.0, 20.0), &large));
    }

    #[test]
    fn threshold_never_exceeds_smaller_body() {
        let rule = ContactRule {
            min_overlap: 90.0,
            reference_size: 60.0,
        };
        let a = body(0.0, 0.0, 20.0);
        assert_eq!(rule.threshold_for(&a, &a), 20.0);
        assert!(rule.detect(&a, &a));
    }

    #[test]
    fn first_contact_wounds() {
        let mut tracker = HitTracker::new(Duration::from_secs(5));
        assert_eq!(
            tracker.register_contact(Duration::from_secs(1)),
            HitOutcome::Wounded
        );
        assert_eq!(
            tracker.vitality(),
            Vitality::Wounded {
                since: Duration::from_secs(1)
            }
        );
    }

    #[test]
    fn contact_during_immunity_is_ignored() {
        let mut tracker = HitTracker::new(Duration::from_secs(5));
        tracker.register_contact(Duration::from_secs(1));
        assert!(!tracker.can_be_hit(Duration::from_millis(5_999)));
        assert_eq!(
            tracker.register_contact(Duration::from_millis(5_999)),
            HitOutcome::Ignored
        );
        assert!(!tracker.is_down());
    }

    #[test]
    fn contact_after_immunity_downs() {
        let mut tracker = HitTracker::new(Duration::from_secs(5));
        tracker.register_contact(Duration::from_secs(1));
        assert_eq!(
            tracker.register_contact(Duration::from_secs(6)),
            HitOutcome::Downed
        );
        assert!(tracker.is_down());
        // Down is terminal until reset
        assert_eq!(
            tracker.register_contact(Duration::from_secs(60)),
            HitOutcome::Ignored
        );
        tracker.reset();
        assert_eq!(tracker.vitality(), Vitality::Unhurt);
    }
}

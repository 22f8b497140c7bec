// src/survey/mod.rs

//! Accumulates the mission's site->item record. Each visit reduces a frame's
//! detections to one winning label; the map keeps exactly one observation per
//! site, in visit order, and answers the reverse question "which site holds
//! label X" by a forward scan. No history is retained.

// Dependencies
use log::{debug, info};

use crate::perception::Detection;
use crate::perception::vocabulary::UNKNOWN_ITEM;

/// Identifier of a survey site (ordinal in the tour).
pub type SiteId = u32;

/// The chosen label and strength for one site.
#[derive(Debug, Clone, PartialEq)]
pub struct SiteObservation {
    /// Winning label, or the unknown sentinel for an empty frame.
    pub label: String,
    /// Strength of the winning detection; 0 for the unknown sentinel.
    pub strength: f32,
}

impl SiteObservation {
    /// The observation recorded when a frame held no detections.
    pub fn unknown() -> Self {
        SiteObservation {
            label: UNKNOWN_ITEM.to_string(),
            strength: 0.0,
        }
    }
}

/// Site -> observation record built up over the mission.
///
/// Entries keep the order sites were first recorded (visit order);
/// re-recording a site replaces its observation in place.
#[derive(Debug, Clone, Default)]
pub struct SiteMap {
    entries: Vec<(SiteId, SiteObservation)>,
}

impl SiteMap {
    /// Creates an empty map.
    pub fn new() -> Self {
        SiteMap::default()
    }

    /// Reduces `detections` to a single winning observation and records it
    /// for `site`, overwriting any prior entry for the same site.
    ///
    /// The winner is the maximum-strength detection; ties keep the first one
    /// encountered. An empty sequence yields the unknown sentinel with
    /// strength 0, which is recorded as well.
    pub fn record_observation(&mut self, site: SiteId, detections: &[Detection]) -> SiteObservation {
        let winner = match detections.first() {
            None => SiteObservation::unknown(),
            Some(first) => {
                let mut best = first;
                for candidate in &detections[1..] {
                    if candidate.strength > best.strength {
                        best = candidate;
                    }
                }
                SiteObservation {
                    label: best.label.clone(),
                    strength: best.strength,
                }
            }
        };

        info!(
            "site {} observation: {} (strength {})",
            site, winner.label, winner.strength
        );
        match self.entries.iter_mut().find(|(id, _)| *id == site) {
            Some((_, existing)) => {
                debug!("site {} re-recorded, replacing {}", site, existing.label);
                *existing = winner.clone();
            }
            None => self.entries.push((site, winner.clone())),
        }
        winner
    }

    /// First site (in visit order) whose recorded label equals `label`
    /// exactly. `None` is the normal "not found" outcome, including on an
    /// empty map.
    pub fn find_site_for_label(&self, label: &str) -> Option<SiteId> {
        self.entries
            .iter()
            .find(|(_, obs)| obs.label == label)
            .map(|(site, _)| *site)
    }

    /// The recorded observation for `site`, if any.
    pub fn get(&self, site: SiteId) -> Option<&SiteObservation> {
        self.entries
            .iter()
            .find(|(id, _)| *id == site)
            .map(|(_, obs)| obs)
    }

    /// Entries in visit order.
    pub fn iter(&self) -> impl Iterator<Item = &(SiteId, SiteObservation)> + '_ {
        self.entries.iter()
    }

    /// Number of recorded sites.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn det(label: &str, strength: f32) -> Detection {
        Detection::new(label, strength)
    }

    #[test]
    fn empty_detections_record_the_unknown_sentinel() {
        let mut map = SiteMap::new();
        let obs = map.record_observation(1, &[]);
        assert_eq!(obs, SiteObservation::unknown());
        assert_eq!(map.get(1), Some(&SiteObservation::unknown()));
    }

    #[test]
    fn max_strength_wins_with_first_seen_tie_break() {
        let mut map = SiteMap::new();
        let obs = map.record_observation(1, &[det("a", 3.0), det("b", 5.0), det("c", 5.0)]);
        assert_eq!(obs.label, "b");
        assert_eq!(obs.strength, 5.0);
    }

    #[rstest]
    #[case(&[("coin", 2.0)], "coin", 2.0)]
    #[case(&[("coin", 2.0), ("key", 2.0)], "coin", 2.0)]
    #[case(&[("coin", 1.0), ("key", 4.0), ("shell", 3.0)], "key", 4.0)]
    fn reduction_cases(
        #[case] input: &[(&str, f32)],
        #[case] label: &str,
        #[case] strength: f32,
    ) {
        let detections: Vec<Detection> = input.iter().map(|(l, s)| det(l, *s)).collect();
        let mut map = SiteMap::new();
        let obs = map.record_observation(7, &detections);
        assert_eq!(obs.label, label);
        assert_eq!(obs.strength, strength);
    }

    #[test]
    fn re_recording_a_site_is_last_write_wins() {
        let mut map = SiteMap::new();
        map.record_observation(1, &[det("coin", 3.0)]);
        map.record_observation(1, &[det("key", 1.0)]);

        assert_eq!(map.find_site_for_label("coin"), None);
        assert_eq!(map.find_site_for_label("key"), Some(1));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn find_on_empty_map_is_not_found() {
        assert_eq!(SiteMap::new().find_site_for_label("coin"), None);
    }

    #[test]
    fn find_matches_exactly_and_case_sensitively() {
        let mut map = SiteMap::new();
        map.record_observation(2, &[det("coral", 1.0)]);
        assert_eq!(map.find_site_for_label("Coral"), None);
        assert_eq!(map.find_site_for_label("coral"), Some(2));
    }

    #[test]
    fn duplicate_labels_resolve_to_first_visited_site() {
        let mut map = SiteMap::new();
        map.record_observation(3, &[det("shell", 1.0)]);
        map.record_observation(1, &[det("shell", 2.0)]);
        // Site 3 was visited first, so it wins the reverse lookup.
        assert_eq!(map.find_site_for_label("shell"), Some(3));
    }

    #[test]
    fn recording_is_idempotent_for_identical_input() {
        let detections = [det("fossil", 4.0)];
        let mut map = SiteMap::new();
        let first = map.record_observation(2, &detections);
        let second = map.record_observation(2, &detections);
        assert_eq!(first, second);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get(2), Some(&first));
    }

    #[test]
    fn tour_scenario_resolves_the_clued_site() {
        let mut map = SiteMap::new();
        map.record_observation(1, &[det("coral", 3.0)]);
        map.record_observation(2, &[det("crystal", 2.0)]);
        map.record_observation(3, &[det("key", 5.0)]);
        map.record_observation(4, &[det("coin", 1.0)]);

        assert_eq!(map.find_site_for_label("crystal"), Some(2));
    }
}

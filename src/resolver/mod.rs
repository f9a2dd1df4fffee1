//! Coordinate resolver — the core of Waymark.
//!
//! Maps `(location name, tile)` to a pixel on the overview map image using
//! the calibration anchor table. Single-anchor locations are precise
//! regions; multi-anchor locations interpolate between a lower and upper
//! bound anchor picked in distance order (see [`bounds`]).
//!
//! Every failure mode is recovered locally: unknown locations resolve to
//! the zero sentinel, a missing bound falls back to the nearest anchor,
//! and a degenerate frame short-circuits instead of dividing by zero. The
//! only state that mutates across calls is the session alert cache.

mod bounds;

use bevy::prelude::*;
use std::collections::HashSet;

use crate::shared::{AnchorTable, MapPoint, TilePoint};
use bounds::{fallback_bound, interpolate_axis, order_by_distance, select_bounds};

/// Throttle key for resolver diagnostics. Each distinct key warns at most
/// once per session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResolveAlert {
    /// Queried location has no calibration entry (or an empty one).
    UnknownLocation(String),
    /// Bound scan found no qualifying anchor on one side; keyed by the
    /// query tile so distinct problem spots each warn once.
    MissingBound { tile_x: i32, tile_y: i32 },
}

/// Owns the calibration table and the session-scoped alert cache.
///
/// The table is populated once by the calibration plugin and never
/// mutated afterwards; `resolve` only writes to the alert cache.
#[derive(Resource, Debug, Default)]
pub struct MapResolver {
    pub anchors: AnchorTable,
    alerted: HashSet<ResolveAlert>,
}

impl MapResolver {
    pub fn new(anchors: AnchorTable) -> Self {
        Self {
            anchors,
            alerted: HashSet::new(),
        }
    }

    /// Whether the location has at least one calibration anchor. Callers
    /// use this to skip entities that cannot be placed.
    pub fn is_mapped(&self, location: &str) -> bool {
        self.anchors.get(location).is_some_and(|v| !v.is_empty())
    }

    /// Clears the alert throttle. Called at session start (day rollover)
    /// so recurring calibration gaps surface once per day, not once ever.
    pub fn reset_session(&mut self) {
        self.alerted.clear();
    }

    /// Number of distinct alert conditions raised this session.
    pub fn alert_count(&self) -> usize {
        self.alerted.len()
    }

    /// Resolve a location and optional tile to a pixel on the overview
    /// image.
    ///
    /// `None` for the tile means a pure per-location lookup (static icons)
    /// and always takes the precise branch. Unknown locations return
    /// [`MapPoint::ZERO`].
    pub fn resolve(&mut self, location: &str, tile: Option<TilePoint>) -> MapPoint {
        let Some(anchors) = self.anchors.get(location).filter(|v| !v.is_empty()) else {
            self.alert(
                ResolveAlert::UnknownLocation(location.to_string()),
                format!("Unknown location: {location}"),
            );
            return MapPoint::ZERO;
        };

        // Precise regions and tile-less lookups: single fixed pixel.
        let (anchors, tile) = match tile {
            Some(t) if anchors.len() > 1 => (anchors.clone(), t),
            _ => return anchors[0].map_point(),
        };

        let ordered = order_by_distance(&anchors, tile);
        let sel = select_bounds(&ordered, tile);
        let (mut lower, mut upper) = (sel.lower, sel.upper);

        // Not enough qualifying anchors for a proper frame: fall back to
        // the closest anchors such that lower != upper.
        if lower.is_none() {
            self.alert(
                ResolveAlert::MissingBound { tile_x: tile.x, tile_y: tile.y },
                format!(
                    "Null lower bound: no anchor ≤ ({}, {}) in {location}",
                    tile.x, tile.y
                ),
            );
            lower = Some(fallback_bound(&ordered, upper));
        }
        if upper.is_none() {
            self.alert(
                ResolveAlert::MissingBound { tile_x: tile.x, tile_y: tile.y },
                format!(
                    "Null upper bound: no anchor ≥ ({}, {}) in {location}",
                    tile.x, tile.y
                ),
            );
            upper = Some(fallback_bound(&ordered, lower));
        }

        // Both set above; multi-anchor branch guarantees ≥ 2 anchors.
        let (lower, upper) = (lower.unwrap(), upper.unwrap());

        MapPoint::new(
            interpolate_axis(tile.x, lower.tile_x, upper.tile_x, lower.map_x, upper.map_x),
            interpolate_axis(tile.y, lower.tile_y, upper.tile_y, lower.map_y, upper.map_y),
        )
    }

    fn alert(&mut self, key: ResolveAlert, message: String) {
        if self.alerted.insert(key) {
            warn!("[Waymark/Resolver] {message}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::MapAnchor;
    use std::collections::HashMap;

    fn resolver_with(location: &str, anchors: Vec<MapAnchor>) -> MapResolver {
        let mut table = HashMap::new();
        table.insert(location.to_string(), anchors);
        MapResolver::new(table)
    }

    fn diagonal_resolver() -> MapResolver {
        resolver_with(
            "Farm",
            vec![
                MapAnchor::new(0, 0, 0, 0),
                MapAnchor::new(10, 10, 100, 100),
            ],
        )
    }

    #[test]
    fn test_single_anchor_location_is_precise() {
        let mut r = resolver_with("Blacksmith", vec![MapAnchor::new(4, 9, 220, 57)]);
        let expected = MapPoint::new(220, 57);
        assert_eq!(r.resolve("Blacksmith", None), expected);
        assert_eq!(r.resolve("Blacksmith", Some(TilePoint::new(0, 0))), expected);
        assert_eq!(r.resolve("Blacksmith", Some(TilePoint::new(99, 1))), expected);
        assert_eq!(r.alert_count(), 0);
    }

    #[test]
    fn test_tileless_lookup_uses_first_anchor() {
        let mut r = diagonal_resolver();
        assert_eq!(r.resolve("Farm", None), MapPoint::ZERO);
    }

    #[test]
    fn test_monotonic_interpolation() {
        let mut r = diagonal_resolver();
        assert_eq!(r.resolve("Farm", Some(TilePoint::new(5, 5))), MapPoint::new(50, 50));
        assert_eq!(r.resolve("Farm", Some(TilePoint::new(0, 0))), MapPoint::ZERO);
        assert_eq!(
            r.resolve("Farm", Some(TilePoint::new(10, 10))),
            MapPoint::new(100, 100)
        );
    }

    #[test]
    fn test_exact_match_reproduces_anchors() {
        let anchors = vec![
            MapAnchor::new(2, 3, 20, 35),
            MapAnchor::new(30, 3, 160, 35),
            MapAnchor::new(2, 40, 20, 130),
            MapAnchor::new(30, 40, 160, 130),
        ];
        let mut r = resolver_with("Town", anchors.clone());
        for a in &anchors {
            assert_eq!(
                r.resolve("Town", Some(TilePoint::new(a.tile_x, a.tile_y))),
                a.map_point(),
                "anchor ({}, {}) should resolve to itself",
                a.tile_x,
                a.tile_y
            );
        }
    }

    #[test]
    fn test_unknown_location_returns_zero_and_alerts_once() {
        let mut r = diagonal_resolver();
        assert_eq!(r.resolve("NoSuchPlace", Some(TilePoint::new(3, 4))), MapPoint::ZERO);
        assert_eq!(r.resolve("NoSuchPlace", Some(TilePoint::new(3, 4))), MapPoint::ZERO);
        assert_eq!(r.resolve("NoSuchPlace", None), MapPoint::ZERO);
        assert_eq!(r.alert_count(), 1, "repeat queries share one alert key");
    }

    #[test]
    fn test_distinct_unknown_locations_alert_separately() {
        let mut r = diagonal_resolver();
        r.resolve("Nowhere", None);
        r.resolve("Elsewhere", None);
        assert_eq!(r.alert_count(), 2);
    }

    #[test]
    fn test_zero_anchor_location_treated_as_unknown() {
        let mut r = resolver_with("EmptyLot", vec![]);
        assert_eq!(r.resolve("EmptyLot", Some(TilePoint::new(1, 1))), MapPoint::ZERO);
        assert_eq!(r.alert_count(), 1);
        assert!(!r.is_mapped("EmptyLot"));
    }

    #[test]
    fn test_degenerate_axis_guard() {
        // Two anchors share tile_x: interpolating between them must not
        // divide by zero. X pins to the shared pixel, Y interpolates.
        let mut r = resolver_with(
            "Beach",
            vec![
                MapAnchor::new(6, 0, 80, 10),
                MapAnchor::new(6, 10, 80, 60),
            ],
        );
        let got = r.resolve("Beach", Some(TilePoint::new(6, 5)));
        assert_eq!(got.x, 80);
        assert_eq!(got.y, 35);
    }

    #[test]
    fn test_missing_upper_falls_back_to_nearest() {
        let mut r = diagonal_resolver();
        // (12,12) is past every anchor: no upper exists. Fallback pairs
        // the closest two anchors; the frame extrapolates past the edge.
        let got = r.resolve("Farm", Some(TilePoint::new(12, 12)));
        assert_eq!(got, MapPoint::new(120, 120));
        assert_eq!(r.alert_count(), 1);
    }

    #[test]
    fn test_missing_bound_alert_keyed_by_tile() {
        let mut r = diagonal_resolver();
        r.resolve("Farm", Some(TilePoint::new(12, 12)));
        r.resolve("Farm", Some(TilePoint::new(12, 12)));
        assert_eq!(r.alert_count(), 1);
        r.resolve("Farm", Some(TilePoint::new(13, 12)));
        assert_eq!(r.alert_count(), 2);
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut r = resolver_with(
            "Forest",
            vec![
                MapAnchor::new(0, 0, 10, 120),
                MapAnchor::new(25, 0, 70, 120),
                MapAnchor::new(0, 30, 10, 170),
                MapAnchor::new(25, 30, 70, 170),
            ],
        );
        let tile = Some(TilePoint::new(13, 17));
        let first = r.resolve("Forest", tile);
        for _ in 0..10 {
            assert_eq!(r.resolve("Forest", tile), first);
        }
    }

    #[test]
    fn test_reset_session_clears_throttle() {
        let mut r = diagonal_resolver();
        r.resolve("Nowhere", None);
        assert_eq!(r.alert_count(), 1);
        r.reset_session();
        assert_eq!(r.alert_count(), 0);
        r.resolve("Nowhere", None);
        assert_eq!(r.alert_count(), 1, "condition may warn again next session");
    }
}

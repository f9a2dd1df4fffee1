//! Bound selection for anchor interpolation.
//!
//! Given a query tile and a location's calibration anchors, pick a `lower`
//! anchor (tile coordinates ≤ the query on both axes) and an `upper` anchor
//! (≥ on both axes) to form the interpolation frame, scanning anchors in
//! order of distance from the query tile.

use crate::shared::{MapAnchor, TilePoint};

/// Anchors sorted by Euclidean distance from the query tile, ascending.
/// Ties keep table order, so a calibration table can bias which anchor
/// wins by listing it first.
pub(crate) fn order_by_distance<'a>(
    anchors: &'a [MapAnchor],
    tile: TilePoint,
) -> Vec<&'a MapAnchor> {
    let mut ordered: Vec<&MapAnchor> = anchors.iter().collect();
    ordered.sort_by_key(|a| {
        let dx = (a.tile_x - tile.x) as i64;
        let dy = (a.tile_y - tile.y) as i64;
        dx * dx + dy * dy
    });
    ordered
}

/// Result of the bound scan. Either side may be missing when no anchor
/// qualifies (query tile outside the calibrated frame).
#[derive(Debug, Default)]
pub(crate) struct BoundSelection<'a> {
    pub lower: Option<&'a MapAnchor>,
    pub upper: Option<&'a MapAnchor>,
}

/// Scan distance-ordered anchors for the interpolation frame.
///
/// The first qualifying anchor on each side is taken, but while the chosen
/// pair is axis-aligned (shares a tile X or tile Y) the scan keeps going
/// and may reassign either side: an aligned pair would collapse one axis
/// of the frame, so a farther anchor that opens the frame up is preferred.
pub(crate) fn select_bounds<'a>(
    ordered: &[&'a MapAnchor],
    tile: TilePoint,
) -> BoundSelection<'a> {
    let mut lower: Option<&MapAnchor> = None;
    let mut upper: Option<&MapAnchor> = None;
    let mut axis_aligned = false;

    for &anchor in ordered {
        if let (Some(lo), Some(up)) = (lower, upper) {
            if lo.tile_x == up.tile_x || lo.tile_y == up.tile_y {
                axis_aligned = true;
            } else {
                break;
            }
        }

        if (lower.is_none() || axis_aligned)
            && tile.x >= anchor.tile_x
            && tile.y >= anchor.tile_y
        {
            lower = Some(anchor);
            continue;
        }

        if (upper.is_none() || axis_aligned)
            && tile.x <= anchor.tile_x
            && tile.y <= anchor.tile_y
        {
            upper = Some(anchor);
        }
    }

    BoundSelection { lower, upper }
}

/// Fallback when one side of the frame is missing: the overall-closest
/// anchor, or the second-closest when the closest is already taken by the
/// other side. Callers guarantee at least two anchors.
pub(crate) fn fallback_bound<'a>(
    ordered: &[&'a MapAnchor],
    other: Option<&'a MapAnchor>,
) -> &'a MapAnchor {
    match other {
        Some(taken) if std::ptr::eq(taken, ordered[0]) => ordered[1],
        _ => ordered[0],
    }
}

/// Linear interpolation on one axis, truncated to an integer pixel.
///
/// A frame degenerate on this axis (equal lower/upper tile) would divide
/// by zero; both anchors then agree on the pixel, so return it directly.
pub(crate) fn interpolate_axis(
    tile: i32,
    lower_tile: i32,
    upper_tile: i32,
    lower_px: i32,
    upper_px: i32,
) -> i32 {
    if upper_tile == lower_tile {
        return lower_px;
    }
    let t = (tile - lower_tile) as f64 / (upper_tile - lower_tile) as f64;
    (lower_px as f64 + t * (upper_px - lower_px) as f64) as i32
}

//! Calibration anchor data for every mapped location.
//!
//! Anchors pair a tile in a location with a pixel on the 300×180 overview
//! image. Outdoor areas carry a corner frame for interpolation; interiors
//! are precise regions with a single pixel. Values were read off the map
//! art by walking a character to each corner tile.

use crate::shared::{AnchorTable, MapAnchor};

fn add(table: &mut AnchorTable, name: &str, anchors: Vec<MapAnchor>) {
    table.insert(name.to_string(), anchors);
}

pub fn populate_anchors(table: &mut AnchorTable) {
    // ── Outdoor regions: corner frames ────────────────────────────────────

    // Farm: 80×65 tiles, top-left quadrant of the map.
    add(table, "Farm", vec![
        MapAnchor::new(0, 0, 18, 14),
        MapAnchor::new(79, 0, 110, 14),
        MapAnchor::new(0, 64, 18, 92),
        MapAnchor::new(79, 64, 110, 92),
    ]);

    // Town: 60×50 tiles, map center.
    add(table, "Town", vec![
        MapAnchor::new(0, 0, 122, 24),
        MapAnchor::new(59, 0, 258, 24),
        MapAnchor::new(0, 49, 122, 100),
        MapAnchor::new(59, 49, 258, 100),
    ]);

    // Beach: 40×30 tiles, bottom-right shoreline.
    add(table, "Beach", vec![
        MapAnchor::new(0, 0, 190, 112),
        MapAnchor::new(39, 0, 282, 112),
        MapAnchor::new(0, 29, 190, 166),
        MapAnchor::new(39, 29, 282, 166),
    ]);

    // Forest: 50×40 tiles, south of the farm. The river splits the art,
    // so an extra mid-frame anchor keeps the trail bend honest.
    add(table, "Forest", vec![
        MapAnchor::new(0, 0, 14, 98),
        MapAnchor::new(49, 0, 112, 98),
        MapAnchor::new(24, 20, 62, 134),
        MapAnchor::new(0, 39, 14, 170),
        MapAnchor::new(49, 39, 112, 170),
    ]);

    // ── Interiors and small rooms: precise regions ────────────────────────

    add(table, "FarmHouse", vec![MapAnchor::new(0, 0, 64, 20)]);
    add(table, "Greenhouse", vec![MapAnchor::new(0, 0, 42, 26)]);
    add(table, "MineEntrance", vec![MapAnchor::new(0, 0, 252, 18)]);
    add(table, "Mine", vec![MapAnchor::new(0, 0, 258, 10)]);
    add(table, "GeneralStore", vec![MapAnchor::new(0, 0, 200, 46)]);
    add(table, "AnimalShop", vec![MapAnchor::new(0, 0, 160, 66)]);
    add(table, "Blacksmith", vec![MapAnchor::new(0, 0, 228, 62)]);
}

//! Data layer — populates the calibration table at startup.
//!
//! Runs in OnEnter(MapState::Loading), fills the resolver's anchor table
//! from the hard-coded calibration data, then advances to
//! MapState::Active. No other module seeds the table; everything past
//! Loading can treat it as read-only.

mod anchors;

use bevy::prelude::*;

use crate::resolver::MapResolver;
use crate::shared::*;

pub use anchors::populate_anchors;

pub struct CalibrationPlugin;

impl Plugin for CalibrationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(MapState::Loading), load_calibration);
    }
}

/// Single system that populates the anchor table and activates the map.
fn load_calibration(
    mut resolver: ResMut<MapResolver>,
    mut next_state: ResMut<NextState<MapState>>,
) {
    populate_anchors(&mut resolver.anchors);

    let anchor_count: usize = resolver.anchors.values().map(|v| v.len()).sum();
    info!(
        "[Waymark/Data] Calibration loaded: {} anchors across {} locations.",
        anchor_count,
        resolver.anchors.len()
    );

    next_state.set(MapState::Active);
}

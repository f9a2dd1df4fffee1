//! Per-tick marker bookkeeping — turns tracked-entity inputs into
//! [`EntityMarker`] output for the render layer: resolved pixel position,
//! draw order, visibility, and jump smoothing.

use bevy::prelude::*;

use crate::farm::{farm_building_point, resolve_world_position};
use crate::resolver::MapResolver;
use crate::shared::*;

pub struct MarkerPlugin;

impl Plugin for MarkerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            (sync_player_context, update_markers)
                .chain()
                .in_set(WaymarkSet::Markers),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Visibility & layering rules
// ─────────────────────────────────────────────────────────────────────────────

/// Whether an immersion option hides this villager. Hidden villagers are
/// still drawn (dimmed, on a lower layer) when `show_hidden` is on.
pub fn compute_hidden(config: &WaymarkConfig, entity: &TrackedEntity, same_location: bool) -> bool {
    (config.immersion == ImmersionMode::TalkedToOnly && !entity.talked_today)
        || (config.immersion == ImmersionMode::NotTalkedToOnly && entity.talked_today)
        || (config.only_same_location && !same_location)
        || (config.by_heart_level
            && !(config.heart_level_min..=config.heart_level_max).contains(&entity.hearts))
}

/// Draw order. Layers 4-7 are outdoor markers, 0-3 indoor, so outdoor
/// markers always draw over indoor ones. Within each band: hidden below
/// standard, quest/birthday flagged above their peers.
pub fn marker_layer(outdoors: bool, hidden: bool, flagged: bool) -> i32 {
    let mut layer = if outdoors { 6 } else { 2 };
    if hidden {
        layer -= 2;
    }
    if flagged {
        layer += 1;
    }
    layer
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Mirrors the player's current location into [`PlayerContext`] so the
/// marker pass can do same-location checks against a resource.
pub fn sync_player_context(
    query: Query<(&TrackedEntity, &WorldPlacement)>,
    mut ctx: ResMut<PlayerContext>,
) {
    for (entity, placement) in &query {
        if entity.is_player {
            ctx.location = placement.effective_name().to_string();
        }
    }
}

/// Recomputes every tracked entity's marker from its current placement.
///
/// Entities that cannot be placed (unknown location) or are filtered out
/// (blacklist, hidden without `show_hidden`) get `visible = false` and
/// are skipped by the render layer; everything else keeps resolving, so
/// one bad entity never takes the whole overlay down.
pub fn update_markers(
    mut resolver: ResMut<MapResolver>,
    registry: Res<FarmBuildingRegistry>,
    config: Res<WaymarkConfig>,
    ctx: Res<PlayerContext>,
    mut query: Query<(&TrackedEntity, &WorldPlacement, &TilePosition, &mut EntityMarker)>,
) {
    for (entity, placement, tile, mut marker) in query.iter_mut() {
        let name = placement.effective_name().to_string();

        let placeable =
            resolver.is_mapped(&name) || farm_building_point(&registry, placement).is_some();
        if !placeable {
            // Logs the unknown-location alert, throttled per name.
            resolver.resolve(&name, None);
            marker.visible = false;
            continue;
        }

        let hidden =
            !entity.is_player && compute_hidden(&config, entity, name == ctx.location);
        marker.hidden = hidden;

        let blacklisted = config.blacklist.iter().any(|n| n == &entity.name);
        if blacklisted || (hidden && !config.show_hidden) {
            marker.position = MapPoint::ZERO;
            marker.visible = false;
            continue;
        }

        let pixel =
            resolve_world_position(&mut resolver, &registry, placement, Some(tile.tile()));
        // Center the marker head crop on the resolved pixel.
        let position = MapPoint::new(pixel.x - MARKER_CENTER_X, pixel.y - MARKER_CENTER_Y);

        marker.layer = marker_layer(
            placement.outdoors,
            hidden,
            entity.has_quest || entity.is_birthday,
        );

        // Location changes land a tick before tile positions do. A large
        // jump without a location change means stale tile data: hold the
        // draw for a few ticks instead of flashing the wrong spot.
        if marker.prev_location == name
            && marker.prev_position.distance_to(position) > JUMP_THRESHOLD
        {
            marker.draw_delay = DRAW_DELAY;
        } else {
            marker.draw_delay = marker.draw_delay.saturating_sub(1);
        }

        marker.position = position;
        marker.prev_position = position;
        marker.prev_location = name;
        marker.visible = true;
    }
}

//! Shared components, resources, events, and states for Waymark.
//!
//! This is the type contract. Every domain module imports from here.
//! No domain imports from any other domain directly.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ═══════════════════════════════════════════════════════════════════════
// PLUGIN STATE — calibration lifecycle
// ═══════════════════════════════════════════════════════════════════════

/// The plugin starts in `Loading`, populates the anchor table, then
/// advances to `Active`. Marker systems only run while `Active`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum MapState {
    #[default]
    Loading,
    Active,
}

// ═══════════════════════════════════════════════════════════════════════
// GEOMETRY
// ═══════════════════════════════════════════════════════════════════════

/// A pixel position in the coordinate space of the overview map image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MapPoint {
    pub x: i32,
    pub y: i32,
}

impl MapPoint {
    pub const ZERO: MapPoint = MapPoint { x: 0, y: 0 };

    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn distance_to(self, other: MapPoint) -> f32 {
        let dx = (self.x - other.x) as f32;
        let dy = (self.y - other.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }
}

/// An integer grid position within a location's internal tile space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePoint {
    pub x: i32,
    pub y: i32,
}

impl TilePoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CALIBRATION
// ═══════════════════════════════════════════════════════════════════════

/// One known correspondence between a tile in some location and a pixel
/// on the overview map image.
///
/// A location with a single anchor is a *precise region*: every tile in it
/// maps to that one pixel (small interiors, shop rooms). A location with
/// several anchors gets piecewise-linear interpolation between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapAnchor {
    pub tile_x: i32,
    pub tile_y: i32,
    pub map_x: i32,
    pub map_y: i32,
}

impl MapAnchor {
    pub fn new(tile_x: i32, tile_y: i32, map_x: i32, map_y: i32) -> Self {
        Self { tile_x, tile_y, map_x, map_y }
    }

    pub fn map_point(&self) -> MapPoint {
        MapPoint::new(self.map_x, self.map_y)
    }
}

/// Location name → ordered calibration anchors. Read-only after the
/// calibration plugin populates it.
pub type AnchorTable = HashMap<String, Vec<MapAnchor>>;

// ═══════════════════════════════════════════════════════════════════════
// FARM BUILDINGS
// ═══════════════════════════════════════════════════════════════════════

/// A building currently placed on the farm, as reported by the host when
/// construction changes the farm layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedBuilding {
    /// Unique interior location name, e.g. "Barn1". Buildings without a
    /// resolved interior are skipped during registry rebuild.
    pub interior_name: Option<String>,
    /// Building type, e.g. "Barn". Several same-typed buildings can
    /// coexist (multiple cabins), so lookup goes through `interior_name`.
    pub type_name: String,
    /// Tile of the building's door on the farm grid.
    pub tile: TilePoint,
}

/// Unique interior name → (building type, pixel position on the farm).
/// Rebuilt wholesale on buildings-changed / day-start / view-resize;
/// never incrementally updated.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmBuildingRegistry {
    pub buildings: HashMap<String, (String, MapPoint)>,
}

/// One-time story milestones that unlock map regions. The host flips
/// these; Waymark only reads them.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct StoryFlags {
    /// Greenhouse is drawn once the pantry bundle set is complete.
    pub pantry_complete: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// TRACKED ENTITIES — host-supplied inputs
// ═══════════════════════════════════════════════════════════════════════

/// Identity and business-rule flags for an entity shown on the map.
/// Quest/birthday/talked state is the host's domain; Waymark only
/// consumes the booleans for layering and visibility.
#[derive(Component, Debug, Clone)]
pub struct TrackedEntity {
    pub name: String,
    pub is_player: bool,
    pub has_quest: bool,
    pub is_birthday: bool,
    pub talked_today: bool,
    /// Friendship hearts with the player (0 for the player itself).
    pub hearts: u8,
}

impl TrackedEntity {
    pub fn villager(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_player: false,
            has_quest: false,
            is_birthday: false,
            talked_today: false,
            hearts: 0,
        }
    }

    pub fn player(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_player: true,
            has_quest: false,
            is_birthday: false,
            talked_today: false,
            hearts: 0,
        }
    }
}

/// Where an entity currently stands in the world, from the host's point
/// of view.
#[derive(Component, Debug, Clone, Default)]
pub struct WorldPlacement {
    /// Current location name. `None` right after day rollover, before the
    /// host has placed the entity.
    pub location: Option<String>,
    /// Fallback location used when `location` is `None`.
    pub default_location: String,
    /// Unique interior name when the entity is inside a named farm
    /// building ("Barn1", "Cabin2", ...).
    pub unique_area: Option<String>,
    /// True for the farm and every sub-region nested inside it.
    pub on_farm: bool,
    pub outdoors: bool,
}

impl WorldPlacement {
    /// Input normalization: an entity with no known current location is
    /// treated as standing in its default location.
    pub fn effective_name(&self) -> &str {
        self.location.as_deref().unwrap_or(&self.default_location)
    }
}

/// Tile position within the current location.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct TilePosition {
    pub x: i32,
    pub y: i32,
}

impl TilePosition {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn tile(&self) -> TilePoint {
        TilePoint::new(self.x, self.y)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// MARKERS — rendering-facing output
// ═══════════════════════════════════════════════════════════════════════

/// The computed marker for one tracked entity. The render layer reads
/// `position`/`layer`/`visible`; everything else is bookkeeping between
/// ticks.
#[derive(Component, Debug, Clone, Default)]
pub struct EntityMarker {
    /// Top-left pixel of the marker sprite on the overview image.
    pub position: MapPoint,
    /// Position from the previous tick, for movement-delta smoothing.
    pub prev_position: MapPoint,
    /// Location name from the previous tick.
    pub prev_location: String,
    /// Draw order. Higher draws in front. 0-3 indoors, 4-7 outdoors.
    pub layer: i32,
    /// Hidden by an immersion option (still drawn when `show_hidden`).
    pub hidden: bool,
    /// False when the entity cannot be placed (unknown location,
    /// blacklisted) — the render layer skips it entirely.
    pub visible: bool,
    /// Ticks to hold drawing after a large pixel jump within the same
    /// location, so stale tile data doesn't flash at the wrong spot.
    pub draw_delay: u8,
}

/// Current location of the player, mirrored into a resource so the marker
/// pass can do same-location checks without a second entity lookup.
#[derive(Resource, Debug, Clone, Default)]
pub struct PlayerContext {
    pub location: String,
}

// ═══════════════════════════════════════════════════════════════════════
// VIEW
// ═══════════════════════════════════════════════════════════════════════

/// Placement of the overview image on screen. Resolver output is in image
/// space; the render layer adds `origin` when drawing.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct MapView {
    pub origin: MapPoint,
}

impl MapView {
    /// Top-left origin for centering the zoomed map image on a screen of
    /// the given size.
    pub fn recenter(&mut self, screen_width: f32, screen_height: f32, pixel_zoom: f32) {
        let w = MAP_WIDTH as f32 * pixel_zoom;
        let h = MAP_HEIGHT as f32 * pixel_zoom;
        self.origin = MapPoint::new(
            ((screen_width - w) / 2.0) as i32,
            ((screen_height - h) / 2.0) as i32,
        );
    }
}

// ═══════════════════════════════════════════════════════════════════════
// CONFIG
// ═══════════════════════════════════════════════════════════════════════

/// Which villagers count as hidden on the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImmersionMode {
    /// Everyone shows.
    #[default]
    All,
    /// Only villagers the player has talked to today.
    TalkedToOnly,
    /// Only villagers the player has NOT talked to today.
    NotTalkedToOnly,
}

/// User-facing map options. The host loads and persists these (RON or
/// JSON); Waymark only reads the resource.
#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaymarkConfig {
    pub only_same_location: bool,
    pub show_hidden: bool,
    pub immersion: ImmersionMode,
    pub by_heart_level: bool,
    pub heart_level_min: u8,
    pub heart_level_max: u8,
    /// Villager names never drawn on the map.
    pub blacklist: Vec<String>,
    pub pixel_zoom: f32,
}

impl Default for WaymarkConfig {
    fn default() -> Self {
        Self {
            only_same_location: false,
            show_hidden: false,
            immersion: ImmersionMode::All,
            by_heart_level: false,
            heart_level_min: 0,
            heart_level_max: 10,
            blacklist: Vec::new(),
            pixel_zoom: 3.0,
        }
    }
}

impl WaymarkConfig {
    pub fn from_ron_str(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    pub fn from_json_str(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — host → plugin triggers
// ═══════════════════════════════════════════════════════════════════════

/// The set of placed buildings changed (construction, removal, unlock).
/// Carries the full current list; the registry is rebuilt from scratch.
#[derive(Event, Debug, Clone)]
pub struct BuildingsChangedEvent {
    /// Location whose buildings changed. Only "Farm" triggers a rebuild.
    pub location: String,
    pub buildings: Vec<PlacedBuilding>,
}

/// A new in-game day began. Resets session-scoped alert throttling and
/// refreshes the building registry.
#[derive(Event, Debug, Clone)]
pub struct DayStartedEvent;

/// The game window was resized. Recenters the map view and forces a
/// marker refresh.
#[derive(Event, Debug, Clone)]
pub struct ViewResizedEvent {
    pub width: f32,
    pub height: f32,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// Overview map image size, before pixel zoom.
pub const MAP_WIDTH: i32 = 300;
pub const MAP_HEIGHT: i32 = 180;

/// Marker head crop is 32×30 at draw scale; markers are centered by
/// shifting half of that off the resolved pixel.
pub const MARKER_CENTER_X: i32 = 16;
pub const MARKER_CENTER_Y: i32 = 15;

/// Ticks a marker holds its old position after a large jump. Location
/// changes land a tick before tile positions do, so a marker would
/// otherwise flash at the wrong spot when an entity walks through a door.
pub const DRAW_DELAY: u8 = 3;

/// Pixel distance treated as a jump rather than ordinary movement.
pub const JUMP_THRESHOLD: f32 = 15.0;

/// Barn icons sit lower than the door tile; shift them down to line the
/// icon up with the structure's footprint.
pub const BARN_ICON_DROP: i32 = 3;

/// The greenhouse icon is anchored by its center; shift the precise
/// anchor up-left by half the icon footprint at draw scale.
pub const GREENHOUSE_ICON_OFFSET_X: i32 = 6;
pub const GREENHOUSE_ICON_OFFSET_Y: i32 = 9;

/// Well-known location names.
pub const FARM_LOCATION: &str = "Farm";
pub const FARMHOUSE_LOCATION: &str = "FarmHouse";
pub const GREENHOUSE_LOCATION: &str = "Greenhouse";

/// Building-type fragments with special handling.
pub const BARN_TYPE: &str = "Barn";
pub const CABIN_TYPE: &str = "Cabin";

// ═══════════════════════════════════════════════════════════════════════
// SYSTEM SETS
// ═══════════════════════════════════════════════════════════════════════

/// Tick ordering: the building registry must be rebuilt before any marker
/// resolution that depends on it.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaymarkSet {
    Rebuild,
    Markers,
}

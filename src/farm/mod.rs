//! Farm building adjustment — sub-regions of the farm (named buildings,
//! the greenhouse) get their map pixel from the farm's own calibration
//! rather than per-location interpolation, because buildings move when
//! the player reconstructs the farm layout.

use bevy::prelude::*;

use crate::resolver::MapResolver;
use crate::shared::*;

pub struct FarmPlugin;

impl Plugin for FarmPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmLayout>();
        app.add_systems(
            Update,
            (handle_day_started, handle_buildings_changed, handle_view_resized)
                .in_set(WaymarkSet::Rebuild),
        );
    }
}

/// Last buildings list received from the host, kept so day-start and
/// view-resize triggers can rebuild without a fresh notification.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmLayout {
    pub buildings: Vec<PlacedBuilding>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry rebuild
// ─────────────────────────────────────────────────────────────────────────────

/// Recompute the farm building registry from scratch.
///
/// Each placed building's door tile is resolved against the "Farm"
/// anchors, then nudged by a per-type icon offset. Buildings with no
/// interior name are skipped. The greenhouse has no placed building; it
/// joins the registry at its precise anchor once the pantry milestone is
/// set.
pub fn rebuild_registry(
    resolver: &mut MapResolver,
    registry: &mut FarmBuildingRegistry,
    buildings: &[PlacedBuilding],
    story: &StoryFlags,
) {
    registry.buildings.clear();

    for building in buildings {
        let Some(interior) = &building.interior_name else {
            continue;
        };
        if interior.is_empty() {
            continue;
        }

        let mut point = resolver.resolve(FARM_LOCATION, Some(building.tile));
        if building.type_name.contains(BARN_TYPE) {
            point.y += BARN_ICON_DROP;
        }

        registry
            .buildings
            .insert(interior.clone(), (building.type_name.clone(), point));
    }

    if story.pantry_complete {
        let mut point = resolver.resolve(GREENHOUSE_LOCATION, None);
        point.x -= GREENHOUSE_ICON_OFFSET_X;
        point.y -= GREENHOUSE_ICON_OFFSET_Y;
        registry.buildings.insert(
            GREENHOUSE_LOCATION.to_string(),
            (GREENHOUSE_LOCATION.to_string(), point),
        );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Farm-aware resolution
// ─────────────────────────────────────────────────────────────────────────────

/// Registry pixel for an entity standing inside a farm sub-region, if its
/// placement matches a registered building.
///
/// The farmhouse is part of the farm but has its own calibration, so it
/// never takes this path. A registry hit counts when the building type
/// equals the location name (how hosts usually name building interiors),
/// when the unique name itself is used as the location name, or on a
/// generic cabin-type match (several cabins share one location name).
pub fn farm_building_point(
    registry: &FarmBuildingRegistry,
    placement: &WorldPlacement,
) -> Option<MapPoint> {
    let name = placement.effective_name();
    if !placement.on_farm || name == FARMHOUSE_LOCATION {
        return None;
    }
    let unique = placement.unique_area.as_ref()?;
    let (kind, point) = registry.buildings.get(unique)?;
    (kind == name || unique == name || kind.contains(CABIN_TYPE)).then_some(*point)
}

/// Map an entity's placement and tile to an overview-map pixel: farm
/// sub-region precedence first, general per-location resolution
/// otherwise. Negative tiles are host garbage and resolve to the zero
/// sentinel.
pub fn resolve_world_position(
    resolver: &mut MapResolver,
    registry: &FarmBuildingRegistry,
    placement: &WorldPlacement,
    tile: Option<TilePoint>,
) -> MapPoint {
    if let Some(t) = tile {
        if t.x < 0 || t.y < 0 {
            return MapPoint::ZERO;
        }
    }

    if let Some(point) = farm_building_point(registry, placement) {
        return point;
    }

    resolver.resolve(placement.effective_name(), tile)
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Listens to [`BuildingsChangedEvent`]. Only farm changes matter; the
/// new list replaces the cached layout and the registry is rebuilt.
pub fn handle_buildings_changed(
    mut events: EventReader<BuildingsChangedEvent>,
    mut layout: ResMut<FarmLayout>,
    mut resolver: ResMut<MapResolver>,
    mut registry: ResMut<FarmBuildingRegistry>,
    story: Res<StoryFlags>,
) {
    for ev in events.read() {
        if ev.location != FARM_LOCATION {
            continue;
        }
        layout.buildings = ev.buildings.clone();
        rebuild_registry(&mut resolver, &mut registry, &layout.buildings, &story);
        info!(
            "[Waymark/Farm] Registry rebuilt: {} buildings.",
            registry.buildings.len()
        );
    }
}

/// Day rollover: reset the resolver's alert throttle and refresh the
/// registry (the greenhouse milestone may have flipped overnight).
pub fn handle_day_started(
    mut events: EventReader<DayStartedEvent>,
    layout: Res<FarmLayout>,
    mut resolver: ResMut<MapResolver>,
    mut registry: ResMut<FarmBuildingRegistry>,
    story: Res<StoryFlags>,
) {
    for _ev in events.read() {
        resolver.reset_session();
        rebuild_registry(&mut resolver, &mut registry, &layout.buildings, &story);
    }
}

/// Window resize: recenter the map view and rebuild so building pixels
/// are fresh for the forced marker pass.
pub fn handle_view_resized(
    mut events: EventReader<ViewResizedEvent>,
    mut view: ResMut<MapView>,
    config: Res<WaymarkConfig>,
    layout: Res<FarmLayout>,
    mut resolver: ResMut<MapResolver>,
    mut registry: ResMut<FarmBuildingRegistry>,
    story: Res<StoryFlags>,
) {
    for ev in events.read() {
        view.recenter(ev.width, ev.height, config.pixel_zoom);
        rebuild_registry(&mut resolver, &mut registry, &layout.buildings, &story);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::populate_anchors;

    fn test_resolver() -> MapResolver {
        let mut resolver = MapResolver::default();
        populate_anchors(&mut resolver.anchors);
        resolver
    }

    fn barn(interior: &str, x: i32, y: i32) -> PlacedBuilding {
        PlacedBuilding {
            interior_name: Some(interior.to_string()),
            type_name: "Barn".to_string(),
            tile: TilePoint::new(x, y),
        }
    }

    fn placement_in(name: &str, unique: Option<&str>) -> WorldPlacement {
        WorldPlacement {
            location: Some(name.to_string()),
            default_location: name.to_string(),
            unique_area: unique.map(str::to_string),
            on_farm: true,
            outdoors: false,
        }
    }

    #[test]
    fn test_rebuild_registers_buildings_with_barn_drop() {
        let mut resolver = test_resolver();
        let mut registry = FarmBuildingRegistry::default();
        let buildings = vec![barn("Barn1", 20, 10)];

        rebuild_registry(&mut resolver, &mut registry, &buildings, &StoryFlags::default());

        let (kind, point) = registry.buildings.get("Barn1").expect("Barn1 registered");
        assert_eq!(kind, "Barn");
        let base = resolver.resolve(FARM_LOCATION, Some(TilePoint::new(20, 10)));
        assert_eq!(point.x, base.x);
        assert_eq!(point.y, base.y + BARN_ICON_DROP);
    }

    #[test]
    fn test_rebuild_skips_buildings_without_interior() {
        let mut resolver = test_resolver();
        let mut registry = FarmBuildingRegistry::default();
        let buildings = vec![
            PlacedBuilding {
                interior_name: None,
                type_name: "Silo".to_string(),
                tile: TilePoint::new(5, 5),
            },
            barn("Barn1", 20, 10),
        ];

        rebuild_registry(&mut resolver, &mut registry, &buildings, &StoryFlags::default());
        assert_eq!(registry.buildings.len(), 1);
    }

    #[test]
    fn test_rebuild_is_wholesale_not_incremental() {
        let mut resolver = test_resolver();
        let mut registry = FarmBuildingRegistry::default();

        rebuild_registry(
            &mut resolver,
            &mut registry,
            &[barn("Barn1", 20, 10)],
            &StoryFlags::default(),
        );
        rebuild_registry(
            &mut resolver,
            &mut registry,
            &[barn("Barn2", 40, 30)],
            &StoryFlags::default(),
        );

        assert!(!registry.buildings.contains_key("Barn1"), "demolished barn dropped");
        assert!(registry.buildings.contains_key("Barn2"));
    }

    #[test]
    fn test_greenhouse_gated_on_pantry_milestone() {
        let mut resolver = test_resolver();
        let mut registry = FarmBuildingRegistry::default();

        rebuild_registry(&mut resolver, &mut registry, &[], &StoryFlags::default());
        assert!(!registry.buildings.contains_key(GREENHOUSE_LOCATION));

        let story = StoryFlags { pantry_complete: true };
        rebuild_registry(&mut resolver, &mut registry, &[], &story);

        let (_, point) = registry.buildings.get(GREENHOUSE_LOCATION).expect("greenhouse");
        let anchor = resolver.resolve(GREENHOUSE_LOCATION, None);
        assert_eq!(point.x, anchor.x - GREENHOUSE_ICON_OFFSET_X);
        assert_eq!(point.y, anchor.y - GREENHOUSE_ICON_OFFSET_Y);
    }

    #[test]
    fn test_farm_sub_region_precedence() {
        let mut resolver = test_resolver();
        let mut registry = FarmBuildingRegistry::default();
        registry.buildings.insert(
            "Barn1".to_string(),
            ("Barn".to_string(), MapPoint::new(120, 80)),
        );

        // Entity inside the barn: registry pixel wins, interior tile ignored.
        let inside = placement_in("Barn1", Some("Barn1"));
        for tile in [TilePoint::new(1, 1), TilePoint::new(9, 4)] {
            assert_eq!(
                resolve_world_position(&mut resolver, &registry, &inside, Some(tile)),
                MapPoint::new(120, 80)
            );
        }

        // Same tiles in the open farm location interpolate instead.
        let on_farm = WorldPlacement {
            location: Some(FARM_LOCATION.to_string()),
            default_location: FARM_LOCATION.to_string(),
            unique_area: None,
            on_farm: true,
            outdoors: true,
        };
        let open = resolve_world_position(
            &mut resolver,
            &registry,
            &on_farm,
            Some(TilePoint::new(9, 4)),
        );
        assert_ne!(open, MapPoint::new(120, 80));
    }

    #[test]
    fn test_building_type_matches_location_name() {
        let registry = {
            let mut r = FarmBuildingRegistry::default();
            r.buildings
                .insert("Barn2".to_string(), ("Barn".to_string(), MapPoint::new(90, 70)));
            r
        };
        // Host reports the interior's location name as the building type.
        let placement = placement_in("Barn", Some("Barn2"));
        assert_eq!(
            farm_building_point(&registry, &placement),
            Some(MapPoint::new(90, 70))
        );
    }

    #[test]
    fn test_cabin_type_matches_any_location_name() {
        let registry = {
            let mut r = FarmBuildingRegistry::default();
            r.buildings.insert(
                "Cabin3".to_string(),
                ("Log Cabin".to_string(), MapPoint::new(60, 50)),
            );
            r
        };
        // Cabin interiors don't carry the type as their location name.
        let placement = placement_in("FarmHand House", Some("Cabin3"));
        assert_eq!(
            farm_building_point(&registry, &placement),
            Some(MapPoint::new(60, 50))
        );
    }

    #[test]
    fn test_farmhouse_never_uses_registry() {
        let registry = {
            let mut r = FarmBuildingRegistry::default();
            r.buildings.insert(
                FARMHOUSE_LOCATION.to_string(),
                ("FarmHouse".to_string(), MapPoint::new(1, 1)),
            );
            r
        };
        let placement = placement_in(FARMHOUSE_LOCATION, Some(FARMHOUSE_LOCATION));
        assert_eq!(farm_building_point(&registry, &placement), None);
    }

    #[test]
    fn test_negative_tile_resolves_to_sentinel() {
        let mut resolver = test_resolver();
        let registry = FarmBuildingRegistry::default();
        let placement = WorldPlacement {
            location: Some("Town".to_string()),
            default_location: "Town".to_string(),
            ..Default::default()
        };
        assert_eq!(
            resolve_world_position(
                &mut resolver,
                &registry,
                &placement,
                Some(TilePoint::new(-1, -1))
            ),
            MapPoint::ZERO
        );
    }

    #[test]
    fn test_default_location_substituted_when_unplaced() {
        let mut resolver = test_resolver();
        let registry = FarmBuildingRegistry::default();
        let placement = WorldPlacement {
            location: None,
            default_location: "Blacksmith".to_string(),
            ..Default::default()
        };
        let expected = resolver.resolve("Blacksmith", None);
        assert_eq!(
            resolve_world_position(&mut resolver, &registry, &placement, None),
            expected
        );
    }
}

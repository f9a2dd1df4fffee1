//! Waymark — overview-map marker plugin for a farming-sim host.
//!
//! Given a calibration table pairing game tiles with pixels on a static
//! 300×180 overview image, Waymark computes a map pixel for every tracked
//! entity (villagers, the player) each tick, including farm buildings
//! that move when the player rebuilds the farm layout. The host supplies
//! entity placements and triggers (day start, buildings changed, window
//! resize); the host's render layer consumes the resulting
//! [`shared::EntityMarker`] components.

pub mod data;
pub mod farm;
pub mod markers;
pub mod resolver;
pub mod shared;

use bevy::prelude::*;

use shared::*;

pub use resolver::{MapResolver, ResolveAlert};

pub struct WaymarkPlugin;

impl Plugin for WaymarkPlugin {
    fn build(&self, app: &mut App) {
        // Plugin state
        app.init_state::<MapState>();

        // Shared resources
        app.init_resource::<MapResolver>()
            .init_resource::<FarmBuildingRegistry>()
            .init_resource::<StoryFlags>()
            .init_resource::<PlayerContext>()
            .init_resource::<MapView>()
            .init_resource::<WaymarkConfig>();

        // Host-facing events
        app.add_event::<BuildingsChangedEvent>()
            .add_event::<DayStartedEvent>()
            .add_event::<ViewResizedEvent>();

        // Registry rebuilds run before marker resolution within a tick.
        app.configure_sets(
            Update,
            (WaymarkSet::Rebuild, WaymarkSet::Markers)
                .chain()
                .run_if(in_state(MapState::Active)),
        );

        // Domain plugins
        app.add_plugins(data::CalibrationPlugin)
            .add_plugins(farm::FarmPlugin)
            .add_plugins(markers::MarkerPlugin);
    }
}

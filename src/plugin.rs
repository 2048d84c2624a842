//! Bevy integration that keeps a [`FlowFields`] resource in step with the loaded area.
use bevy::{log, prelude::*};

use crate::prelude::*;

/// Adds the [`AreaChanged`] and [`AreaCleared`] events and the systems that swap the
/// [`FlowFields`] resource when the area changes.
///
/// ```rust,no_run
/// use bevy::prelude::*;
/// use bevy_flowcache::prelude::*;
///
/// fn main() {
///     App::new()
///         .add_plugins(FlowFieldPlugin::default())
///         .add_systems(Startup, load_area)
///         .run();
/// }
///
/// fn load_area(mut events: EventWriter<AreaChanged>) {
///     events.write(AreaChanged::new(vec![0x11; 64 * 32], 32));
/// }
/// ```
#[derive(Default)]
pub struct FlowFieldPlugin {
    pub settings: FlowCacheSettings,
}

impl FlowFieldPlugin {
    pub fn with_settings(settings: FlowCacheSettings) -> Self {
        FlowFieldPlugin { settings }
    }
}

impl Plugin for FlowFieldPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(FlowFieldSettings(self.settings.clone()))
            .add_event::<AreaChanged>()
            .add_event::<AreaCleared>()
            .add_systems(
                PreUpdate,
                (clear_area, change_area).chain().in_set(FlowFieldSet),
            );
    }
}

#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct FlowFieldSet;

/// Settings every new [`FlowFields`] cache is created with.
#[derive(Resource, Clone, Default)]
pub struct FlowFieldSettings(pub FlowCacheSettings);

/// The flow field cache of the current area.
#[derive(Resource)]
pub struct FlowFields(pub FlowFieldCache);

impl std::ops::Deref for FlowFields {
    type Target = FlowFieldCache;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// A new area was loaded. Carries its nibble-packed walkability data.
#[derive(Event, Debug, Clone)]
pub struct AreaChanged {
    pub walkable: Vec<u8>,
    pub bytes_per_row: i32,
}

impl AreaChanged {
    pub fn new(walkable: Vec<u8>, bytes_per_row: i32) -> Self {
        AreaChanged {
            walkable,
            bytes_per_row,
        }
    }
}

/// The current area was left without entering a new one.
#[derive(Event, Debug, Clone, Default)]
pub struct AreaCleared;

fn clear_area(
    mut commands: Commands,
    mut events: EventReader<AreaCleared>,
    current: Option<Res<FlowFields>>,
) {
    if events.read().last().is_none() {
        return;
    }

    if let Some(current) = current {
        current.cancel_all();
        commands.remove_resource::<FlowFields>();
    }
}

fn change_area(
    mut commands: Commands,
    mut events: EventReader<AreaChanged>,
    current: Option<Res<FlowFields>>,
    settings: Res<FlowFieldSettings>,
) {
    // Only the most recent area matters
    let Some(area) = events.read().last() else {
        return;
    };

    if let Some(current) = current {
        current.cancel_all();
    }

    let grid = WalkableGrid::from_packed(&area.walkable, area.bytes_per_row);
    match FlowFieldCache::new(grid, settings.0.clone()) {
        Ok(cache) => commands.insert_resource(FlowFields(cache)),
        Err(err) => {
            log::error!("Could not create flow field cache for the new area: {}", err);
            commands.remove_resource::<FlowFields>();
        }
    }
}

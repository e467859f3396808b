//! State marker components.
//!
//! These components mirror [`SurfaceProbes::surface_state`](crate::detection::SurfaceProbes::surface_state)
//! so gameplay code can filter queries by contact state. They are added and
//! removed by the motor each physics tick and are mutually exclusive.

use bevy::prelude::*;

use crate::detection::SurfaceState;

/// Marker component indicating the character is grounded.
///
/// # Example
///
/// ```rust
/// use bevy::prelude::*;
/// use character_motor::prelude::*;
///
/// // Grounded is a marker component - just use it in queries
/// fn check_grounded(grounded: Option<&Grounded>) -> bool {
///     grounded.is_some()
/// }
/// ```
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Grounded;

/// Marker component indicating the character is pressed against a side
/// surface.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct OnSurface;

/// Marker component indicating the character is airborne.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
#[reflect(Component)]
pub struct Airborne;

/// Which marker a state maps to.
pub(crate) fn marker_flags(state: SurfaceState) -> (bool, bool, bool) {
    (
        state == SurfaceState::Grounded,
        state == SurfaceState::OnSurface,
        state == SurfaceState::Airborne,
    )
}

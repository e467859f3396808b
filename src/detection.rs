//! Surface probes and classification.
//!
//! A character carries a fixed set of box probes, laid out in its local
//! space. Every physics tick each probe is rotated into world space and cast
//! by the backend; the hit normals are then classified into a single
//! [`SurfaceState`]. Probe 0 is always the ground probe.

use bevy::prelude::*;

use crate::collision::{CollisionData, ProbeCast};
use crate::error::ProbeConfigError;
use crate::substate::{Substate, SubstateAction, SubstateMachine};

/// Horizontal normal component above which a side probe counts as a surface.
pub const SIDE_SURFACE_THRESHOLD: f32 = 0.6;

/// Default surface collision layer (layer 8).
pub const DEFAULT_SURFACE_LAYERS: u32 = 1 << 8;

/// Tick-level contact classification, in priority order.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SurfaceState {
    /// The ground probe hit something facing up.
    Grounded,
    /// A side probe is pressed against a wall-like surface.
    OnSurface,
    /// Nothing supports the character.
    #[default]
    Airborne,
}

/// One box probe.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct SurfaceProbe {
    /// Cast direction in character-local space.
    pub offset: Vec3,
    /// Half-extents of the cast box.
    pub half_extents: Vec3,
    /// World-space cast direction from the last cast.
    pub last_direction: Vec3,
    /// Hit normal from the last cast, zero on a miss.
    pub normal: Vec3,
}

impl SurfaceProbe {
    /// Create a probe.
    pub fn new(offset: Vec3, half_extents: Vec3) -> Self {
        Self {
            offset,
            half_extents,
            ..default()
        }
    }

    /// Whether the last cast hit anything.
    #[inline]
    pub fn hit(&self) -> bool {
        self.normal != Vec3::ZERO
    }
}

/// Identity of the surface a probe last touched.
#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceContact {
    /// Probe that made the contact.
    pub probe: usize,
    /// Collider that was hit.
    pub entity: Entity,
}

/// Probe layout plus the classification it produced.
#[derive(Component, Reflect, Debug, Clone)]
#[reflect(Component)]
pub struct SurfaceProbes {
    probes: Vec<SurfaceProbe>,
    /// Collision layers probes may hit.
    pub surface_layers: u32,
    /// Maximum cast distance for every probe.
    pub cast_distance: f32,
    surface_state: SurfaceState,
    just_left_edge: bool,
    current_surface: Option<SurfaceContact>,
    last_surface: Option<SurfaceContact>,
}

impl SurfaceProbes {
    /// Build a probe set. The first probe is the ground probe.
    pub fn new(probes: Vec<SurfaceProbe>) -> Result<Self, ProbeConfigError> {
        if probes.is_empty() {
            return Err(ProbeConfigError::Empty);
        }
        Ok(Self::from_probes(probes))
    }

    /// Build a probe set from parallel offset and half-extent lists.
    pub fn from_parts(offsets: &[Vec3], half_extents: &[Vec3]) -> Result<Self, ProbeConfigError> {
        if offsets.len() != half_extents.len() {
            return Err(ProbeConfigError::LengthMismatch {
                offsets: offsets.len(),
                half_extents: half_extents.len(),
            });
        }
        Self::new(
            offsets
                .iter()
                .zip(half_extents)
                .map(|(offset, extents)| SurfaceProbe::new(*offset, *extents))
                .collect(),
        )
    }

    /// Standard layout for an upright capsule of `radius` and `height`:
    /// ground, left, right and forward probes.
    pub fn humanoid(radius: f32, height: f32) -> Self {
        let side = 0.3;
        let probes = vec![
            SurfaceProbe::new(Vec3::NEG_Y, Vec3::new(radius * 2.0, radius * 0.7, radius * 2.0)),
            SurfaceProbe::new(
                Vec3::NEG_X * 0.5,
                Vec3::new(radius * side, height * 0.6, radius * 2.0),
            ),
            SurfaceProbe::new(
                Vec3::X * 0.5,
                Vec3::new(radius * side, height * 0.6, radius * 2.0),
            ),
            SurfaceProbe::new(
                Vec3::NEG_Z * 0.5,
                Vec3::new(radius * 2.0, height * 0.6, radius * side),
            ),
        ];
        Self::from_probes(probes)
    }

    fn from_probes(probes: Vec<SurfaceProbe>) -> Self {
        Self {
            probes,
            surface_layers: DEFAULT_SURFACE_LAYERS,
            cast_distance: 1.0,
            surface_state: SurfaceState::Airborne,
            just_left_edge: false,
            current_surface: None,
            last_surface: None,
        }
    }

    /// Builder: set the surface layer mask.
    pub fn with_surface_layers(mut self, layers: u32) -> Self {
        self.surface_layers = layers;
        self
    }

    /// Builder: set the cast distance.
    pub fn with_cast_distance(mut self, distance: f32) -> Self {
        self.cast_distance = distance;
        self
    }

    /// The probes, ground probe first.
    #[inline]
    pub fn probes(&self) -> &[SurfaceProbe] {
        &self.probes
    }

    /// Number of probes.
    #[inline]
    pub fn len(&self) -> usize {
        self.probes.len()
    }

    /// Whether the set has no probes. Only possible for sets not built by `new`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probes.is_empty()
    }

    /// The ground probe. `None` only for a set built without [`new`](Self::new),
    /// e.g. through reflection.
    #[inline]
    pub fn ground(&self) -> Option<&SurfaceProbe> {
        self.probes.first()
    }

    /// Current classification.
    #[inline]
    pub fn surface_state(&self) -> SurfaceState {
        self.surface_state
    }

    /// Override the classification. Used by behavior layers and tests.
    pub fn set_surface_state(&mut self, state: SurfaceState) {
        self.surface_state = state;
    }

    /// True on the tick the character walked off a ledge.
    #[inline]
    pub fn just_left_edge(&self) -> bool {
        self.just_left_edge
    }

    /// Override the edge flag.
    pub fn set_just_left_edge(&mut self, just_left_edge: bool) {
        self.just_left_edge = just_left_edge;
    }

    /// Most recent surface touched.
    pub fn current_surface(&self) -> Option<SurfaceContact> {
        self.current_surface
    }

    /// Surface touched before [`current_surface`](Self::current_surface).
    pub fn last_surface(&self) -> Option<SurfaceContact> {
        self.last_surface
    }

    /// Cast every probe from `position` with the character at `rotation`.
    ///
    /// `cast` performs the world query for one probe. Misses record a zero
    /// normal.
    pub fn cast(
        &mut self,
        position: Vec3,
        rotation: Quat,
        mut cast: impl FnMut(&ProbeCast) -> Option<CollisionData>,
    ) {
        for index in 0..self.probes.len() {
            let probe = self.probes[index];
            let request = ProbeCast {
                probe: index,
                origin: position,
                half_extents: probe.half_extents,
                direction: rotation * probe.offset,
                rotation,
                max_distance: self.cast_distance,
                layer_mask: self.surface_layers,
            };
            let hit = cast(&request);

            let slot = &mut self.probes[index];
            slot.last_direction = request.direction;
            slot.normal = hit.map(|h| h.normal).unwrap_or(Vec3::ZERO);

            if let Some(entity) = hit.and_then(|h| h.entity) {
                self.record_contact(SurfaceContact {
                    probe: index,
                    entity,
                });
            }
        }
    }

    /// Record probe normals directly, in probe order. Extra normals are
    /// ignored and missing ones count as misses.
    pub fn set_normals(&mut self, normals: &[Vec3]) {
        for (index, probe) in self.probes.iter_mut().enumerate() {
            probe.normal = normals.get(index).copied().unwrap_or(Vec3::ZERO);
        }
    }

    fn record_contact(&mut self, contact: SurfaceContact) {
        match self.current_surface {
            Some(current) if current.entity == contact.entity => {
                self.current_surface = Some(contact);
            }
            previous => {
                self.last_surface = previous;
                self.current_surface = Some(contact);
            }
        }
    }
}

/// Classify the last probe results. Ground beats side surfaces beats air.
pub fn classify(probes: &SurfaceProbes) -> SurfaceState {
    if probes.ground().is_some_and(|ground| ground.normal.y > 0.0) {
        SurfaceState::Grounded
    } else if probes.probes().iter().skip(1).any(|probe| {
        probe.normal.x.abs() > SIDE_SURFACE_THRESHOLD
            || probe.normal.z.abs() > SIDE_SURFACE_THRESHOLD
    }) {
        SurfaceState::OnSurface
    } else {
        SurfaceState::Airborne
    }
}

/// Substates of the surface registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceSubstate {
    /// Nothing special.
    Void,
    /// The character just walked off a ledge.
    JustWalkedOffLedge,
}

impl Substate for SurfaceSubstate {
    const VOID: Self = SurfaceSubstate::Void;
}

/// Surface registry, driven by the classifier.
pub type SurfaceSubstates = SubstateMachine<SurfaceSubstate, ()>;

fn void(_: &mut SurfaceSubstates, _: &mut ()) {}

fn just_walked_off_ledge(substates: &mut SurfaceSubstates, _: &mut ()) {
    substates.hold_one_tick();
}

/// Build the surface registry with its standard substates.
pub fn surface_substates() -> SurfaceSubstates {
    SurfaceSubstates::from_states([
        (SurfaceSubstate::Void, void as SubstateAction<SurfaceSubstate, ()>),
        (SurfaceSubstate::JustWalkedOffLedge, just_walked_off_ledge),
    ])
}

/// Apply this tick's classification.
///
/// Entering the air from a supported state runs `JustWalkedOffLedge`, which
/// holds the registry for one tick; staying airborne resets it to `Void`.
/// `just_left_edge` is only set while descending, so jumps never count.
pub fn update_surface_state(
    probes: &mut SurfaceProbes,
    substates: &mut SurfaceSubstates,
    vertical_speed: f32,
) -> SurfaceState {
    let previous = probes.surface_state;
    let next = classify(probes);

    if next == SurfaceState::Airborne {
        if previous != SurfaceState::Airborne {
            substates.run(SurfaceSubstate::JustWalkedOffLedge, &mut ());
        } else {
            substates.switch_to(SurfaceSubstate::Void);
        }
        probes.just_left_edge =
            substates.current() == SurfaceSubstate::JustWalkedOffLedge && vertical_speed <= 0.0;
    } else {
        probes.just_left_edge = false;
    }

    if next != previous {
        debug!("surface state {previous:?} -> {next:?}");
    }
    probes.surface_state = next;
    next
}

#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the garage brewery engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches.

use std::{fmt, time::Duration};

use glam::Vec3;
use serde::{Deserialize, Serialize};

mod footprint;
mod interaction;

pub use footprint::{rotate_offsets, rotated_centroid, CellOffset, Facing, FootprintPlan};
pub use interaction::{
    BrewStage, Interactable, InteractionContext, InteractionOutcome, StationKind, StationSpec,
    Wallet,
};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to the garage brewery.";

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Rebuilds the garage floor with the provided dimensions, discarding all spatial content.
    ConfigureGarage {
        /// Number of cell columns.
        width: u32,
        /// Number of cell rows.
        height: u32,
        /// Side length of a single cell measured in world units.
        tile_size: f32,
        /// World-space position of cell `(0, 0)`.
        origin: Vec3,
    },
    /// Grows the floor on each side while keeping existing world positions valid.
    ExpandGarage {
        /// Columns appended on the east edge.
        right: u32,
        /// Columns prepended on the west edge.
        left: u32,
        /// Rows appended on the north edge.
        up: u32,
        /// Rows prepended on the south edge.
        down: u32,
    },
    /// Removes every machine, roaming agent, occupancy mark and registration.
    ClearGarage,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player turn toward or step in the provided direction.
    MovePlayer {
        /// Direction the player pressed.
        direction: Direction,
    },
    /// Requests placement of a machine at the provided anchor and facing.
    PlaceMachine {
        /// Catalog identifier of the machine definition.
        definition: DefinitionId,
        /// Cell the footprint offsets are translated from.
        anchor: CellCoord,
        /// Effective clockwise rotation of the footprint.
        facing: Facing,
    },
    /// Requests removal of a placed machine.
    RemoveMachine {
        /// Identifier of the machine targeted for removal.
        machine: MachineId,
    },
    /// Replaces every placed machine with the provided persisted records.
    RestoreLayout {
        /// Records replayed in order.
        records: Vec<PlacementRecord>,
    },
    /// Spawns a roaming agent on the provided cell.
    SpawnRoamer {
        /// Cell the agent appears on.
        cell: CellCoord,
    },
    /// Requests that a roaming agent walk one cell in the provided direction.
    StepRoamer {
        /// Agent attempting to move.
        agent: AgentId,
        /// Direction of travel.
        direction: Direction,
    },
    /// Removes a roaming agent from the floor.
    DespawnRoamer {
        /// Agent to remove.
        agent: AgentId,
    },
    /// Uses the highest-priority available interactable at a cell.
    Interact {
        /// Cell whose interactables are considered.
        cell: CellCoord,
        /// Actor performing the interaction.
        context: InteractionContext,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that the floor was rebuilt with new dimensions.
    GarageConfigured {
        /// Number of cell columns.
        width: u32,
        /// Number of cell rows.
        height: u32,
    },
    /// Confirms that the floor grew.
    GarageExpanded {
        /// Number of cell columns after growing.
        width: u32,
        /// Number of cell rows after growing.
        height: u32,
        /// Offset added to every pre-existing cell coordinate.
        shift: CellOffset,
    },
    /// Confirms that every piece of spatial content was removed.
    GarageCleared,
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that the player started turning toward a new direction.
    PlayerTurning {
        /// Direction the player will face.
        toward: Direction,
    },
    /// Reports that the player started walking between two cells.
    PlayerWalking {
        /// Cell the walk started from.
        from: CellCoord,
        /// Cell the walk ends on.
        to: CellCoord,
    },
    /// Reports that the player finished its current motion.
    PlayerSettled {
        /// Cell the player stands on.
        cell: CellCoord,
        /// Direction the player faces.
        facing: Direction,
    },
    /// Reports that a requested player step was refused.
    PlayerBlocked {
        /// Direction the player attempted.
        direction: Direction,
    },
    /// Confirms that a machine was placed.
    MachinePlaced {
        /// Identifier assigned to the machine.
        machine: MachineId,
        /// Catalog identifier of the machine definition.
        definition: DefinitionId,
        /// Anchor cell of the footprint.
        anchor: CellCoord,
        /// Effective facing of the footprint.
        facing: Facing,
    },
    /// Reports that a machine placement request was rejected.
    PlacementRejected {
        /// Catalog identifier requested for placement.
        definition: DefinitionId,
        /// Anchor cell provided in the request.
        anchor: CellCoord,
        /// Specific reason the placement failed.
        reason: PlacementError,
    },
    /// Confirms that a machine was removed.
    MachineRemoved {
        /// Identifier of the removed machine.
        machine: MachineId,
    },
    /// Reports that a machine removal request was rejected.
    RemovalRejected {
        /// Identifier targeted for removal.
        machine: MachineId,
        /// Specific reason the removal failed.
        reason: RemovalError,
    },
    /// Reports that a persisted record could not be replayed.
    RecordSkipped {
        /// Catalog identifier carried by the record.
        definition: DefinitionId,
        /// Anchor carried by the record.
        anchor: CellCoord,
        /// Specific reason the record was skipped.
        reason: RecordSkipReason,
    },
    /// Summarises a completed layout restore.
    LayoutRestored {
        /// Number of records that produced machines.
        restored: usize,
        /// Number of records that were skipped.
        skipped: usize,
    },
    /// Confirms that a roaming agent appeared.
    RoamerSpawned {
        /// Identifier assigned to the agent.
        agent: AgentId,
        /// Cell the agent occupies.
        cell: CellCoord,
    },
    /// Reports that a roaming agent's logical cell changed.
    RoamerCellChanged {
        /// Agent that moved.
        agent: AgentId,
        /// Cell the agent was registered on.
        from: CellCoord,
        /// Cell the agent is now registered on.
        to: CellCoord,
    },
    /// Confirms that a roaming agent left the floor.
    RoamerDespawned {
        /// Agent that was removed.
        agent: AgentId,
    },
    /// Reports the outcome of a successful interaction.
    Interacted {
        /// Cell the interaction targeted.
        cell: CellCoord,
        /// Interactable that handled the request.
        interactable: InteractableId,
        /// Side effect requested by the interactable.
        outcome: InteractionOutcome,
    },
    /// Reports that no interactable at the cell accepted the actor.
    NothingToInteract {
        /// Cell the interaction targeted.
        cell: CellCoord,
    },
}

/// Cardinal directions available to agents on the floor.
///
/// North points toward increasing `y`, east toward increasing `x`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Toward increasing `y`.
    North,
    /// Toward increasing `x`.
    East,
    /// Toward decreasing `y`.
    South,
    /// Toward decreasing `x`.
    West,
}

impl Direction {
    /// All directions in clockwise order starting from north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Unit step taken when moving one cell in this direction.
    #[must_use]
    pub const fn unit_offset(self) -> CellOffset {
        match self {
            Self::North => CellOffset::new(0, 1),
            Self::East => CellOffset::new(1, 0),
            Self::South => CellOffset::new(0, -1),
            Self::West => CellOffset::new(-1, 0),
        }
    }

    /// Clockwise quarter turns from north.
    #[must_use]
    pub const fn facing(self) -> Facing {
        match self {
            Self::North => Facing::from_steps(0),
            Self::East => Facing::from_steps(1),
            Self::South => Facing::from_steps(2),
            Self::West => Facing::from_steps(3),
        }
    }

    /// Direction reached by turning clockwise from north by `facing`.
    #[must_use]
    pub const fn from_facing(facing: Facing) -> Self {
        Self::ALL[facing.steps() as usize]
    }
}

/// Identifier of a machine definition in the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DefinitionId(String);

impl DefinitionId {
    /// Creates a new definition identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrowed string form of the identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DefinitionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier assigned to a placed machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MachineId(u32);

impl MachineId {
    /// Creates a new machine identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a roaming agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Opaque handle of a registered interactable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InteractableId(u32);

impl InteractableId {
    /// Creates a new interactable handle with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the handle.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Location of a single floor cell.
///
/// Signed so that rotated offsets and out-of-bounds candidates stay representable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    x: i32,
    y: i32,
}

impl CellCoord {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Cell displaced by the provided offset.
    ///
    /// Coordinates saturate at the `i32` range. No floor reaches `i32::MAX`
    /// columns, so a saturated cell is always outside.
    #[must_use]
    pub const fn offset(self, offset: CellOffset) -> Self {
        Self {
            x: self.x.saturating_add(offset.x()),
            y: self.y.saturating_add(offset.y()),
        }
    }

    /// Neighbouring cell in the provided direction.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        self.offset(direction.unit_offset())
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.x
            .abs_diff(other.x)
            .saturating_add(self.y.abs_diff(other.y))
    }
}

/// Catalog entry describing a placeable machine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MachineDefinition {
    /// Unique catalog identifier.
    pub id: DefinitionId,
    /// Human-readable name.
    pub name: String,
    /// Price debited when the machine is placed.
    pub cost: u64,
    /// Offsets that block the floor, relative to the anchor in canonical facing.
    pub occupied: Vec<CellOffset>,
    /// Offsets from which the machine is interactable, relative to the anchor.
    #[serde(default)]
    pub affected: Vec<CellOffset>,
    /// Render-only vertical offset of the machine model.
    #[serde(default)]
    pub vertical_offset: f32,
    /// Interactable components spawned with the machine.
    #[serde(default)]
    pub stations: Vec<StationSpec>,
}

/// Persisted description of a placed machine, sufficient to rebuild it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementRecord {
    /// Catalog identifier of the machine definition.
    pub definition: DefinitionId,
    /// Anchor cell of the footprint.
    pub anchor: CellCoord,
    /// Effective facing of the footprint.
    pub facing: Facing,
    /// Render-only vertical offset.
    #[serde(default)]
    pub vertical_offset: f32,
}

/// Reasons a machine placement request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested definition does not exist in the catalog.
    UnknownDefinition,
    /// The footprint extends beyond the floor bounds.
    OutOfBounds,
    /// The footprint overlaps an occupied cell.
    Occupied,
    /// The wallet cannot cover the machine's cost.
    InsufficientFunds,
}

/// Reasons a machine removal request may be rejected by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RemovalError {
    /// No machine with the provided identifier exists.
    MissingMachine,
}

/// Reasons a persisted record was skipped during a layout restore.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordSkipReason {
    /// The record references a definition missing from the catalog.
    UnknownDefinition,
    /// The record's footprint no longer fits on the floor.
    InvalidFootprint(PlacementError),
}

/// Immutable representation of the player's pose used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentPose {
    /// Cell the agent stands on.
    pub cell: CellCoord,
    /// Direction the agent faces.
    pub facing: Direction,
    /// Indicates whether a move or turn is still interpolating.
    pub busy: bool,
}

impl AgentPose {
    /// Cell directly in front of the agent.
    #[must_use]
    pub const fn facing_cell(&self) -> CellCoord {
        self.cell.step(self.facing)
    }
}

/// Immutable representation of a single roaming agent used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoamerSnapshot {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Logical cell derived from the agent's continuous position.
    pub cell: CellCoord,
    /// Indicates whether a step is still interpolating.
    pub moving: bool,
}

/// Read-only snapshot describing all roaming agents on the floor.
#[derive(Clone, Debug, Default)]
pub struct RoamerView {
    snapshots: Vec<RoamerSnapshot>,
}

impl RoamerView {
    /// Creates a new roamer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<RoamerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &RoamerSnapshot> {
        self.snapshots.iter()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<RoamerSnapshot> {
        self.snapshots
    }
}

/// Immutable representation of a placed machine used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct MachineSnapshot {
    /// Identifier allocated to the machine by the world.
    pub id: MachineId,
    /// Catalog identifier of the machine definition.
    pub definition: DefinitionId,
    /// Anchor cell of the footprint.
    pub anchor: CellCoord,
    /// Effective facing of the footprint.
    pub facing: Facing,
    /// Cells blocked by the machine.
    pub occupied: Vec<CellCoord>,
    /// Cells the machine's interactables are registered on.
    pub affected: Vec<CellCoord>,
    /// Render-only vertical offset.
    pub vertical_offset: f32,
}

impl MachineSnapshot {
    /// Persisted record describing the machine.
    #[must_use]
    pub fn record(&self) -> PlacementRecord {
        PlacementRecord {
            definition: self.definition.clone(),
            anchor: self.anchor,
            facing: self.facing,
            vertical_offset: self.vertical_offset,
        }
    }
}

//! Rotation-aware footprint geometry shared by previews, commits and load replay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::{CellCoord, PlacementError};

/// Integer displacement from a machine's anchor cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellOffset {
    x: i32,
    y: i32,
}

impl CellOffset {
    /// Creates a new offset from its components.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal displacement.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical displacement; positive values point north.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Rotates the offset a single 90° step clockwise: `(x, y) -> (y, -x)`.
    #[must_use]
    pub const fn rotate_clockwise(self) -> Self {
        Self {
            x: self.y,
            y: self.x.saturating_neg(),
        }
    }

    /// Rotates the offset clockwise by the provided facing.
    #[must_use]
    pub fn rotated(self, facing: Facing) -> Self {
        let mut rotated = self;
        for _ in 0..facing.steps() {
            rotated = rotated.rotate_clockwise();
        }
        rotated
    }
}

/// Clockwise quarter-turn count relative to a shape's canonical orientation.
///
/// Always normalised into `0..=3`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub struct Facing(u8);

impl Facing {
    /// Canonical, unrotated orientation.
    pub const IDENTITY: Self = Self(0);

    /// Builds a facing from any number of clockwise steps, negative values included.
    #[must_use]
    pub const fn from_steps(steps: i32) -> Self {
        Self(steps.rem_euclid(4) as u8)
    }

    /// Number of clockwise quarter turns in `0..=3`.
    #[must_use]
    pub const fn steps(&self) -> u8 {
        self.0
    }

    /// Sums two facings modulo four.
    #[must_use]
    pub const fn compose(self, other: Facing) -> Self {
        Self((self.0 + other.0) % 4)
    }
}

impl From<i32> for Facing {
    fn from(steps: i32) -> Self {
        Self::from_steps(steps)
    }
}

impl From<Facing> for i32 {
    fn from(facing: Facing) -> Self {
        i32::from(facing.0)
    }
}

/// Rotates every offset by `facing` and translates the result by `anchor`.
///
/// Output order follows the input order.
#[must_use]
pub fn rotate_offsets(offsets: &[CellOffset], anchor: CellCoord, facing: Facing) -> Vec<CellCoord> {
    offsets
        .iter()
        .map(|offset| anchor.offset(offset.rotated(facing)))
        .collect()
}

/// Arithmetic mean of the rotated offsets, used to centre multi-cell visuals on the anchor.
#[must_use]
pub fn rotated_centroid(offsets: &[CellOffset], facing: Facing) -> Vec2 {
    if offsets.is_empty() {
        return Vec2::ZERO;
    }

    let sum = offsets
        .iter()
        .map(|offset| offset.rotated(facing))
        .fold(Vec2::ZERO, |acc, offset| {
            acc + Vec2::new(offset.x() as f32, offset.y() as f32)
        });
    sum / offsets.len() as f32
}

/// Resolved footprint of a machine definition at a concrete anchor and facing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FootprintPlan {
    /// Anchor cell the offsets were translated from.
    pub anchor: CellCoord,
    /// Effective facing applied to the offsets.
    pub facing: Facing,
    /// Cells the machine would block.
    pub occupied: Vec<CellCoord>,
    /// Cells from which the machine would become interactable.
    pub affected: Vec<CellCoord>,
    /// Footprint cells lying outside the floor bounds.
    pub out_of_bounds: Vec<CellCoord>,
    /// Footprint cells already occupied by something else.
    pub blocked: Vec<CellCoord>,
}

impl FootprintPlan {
    /// Reports whether every footprint cell is inside and free.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.out_of_bounds.is_empty() && self.blocked.is_empty()
    }

    /// Iterates every footprint cell that prevents placement.
    pub fn invalid(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.out_of_bounds.iter().chain(self.blocked.iter()).copied()
    }

    /// Reason a commit of this plan would be rejected, if any.
    ///
    /// Bounds violations win over occupancy when both are present.
    #[must_use]
    pub fn rejection(&self) -> Option<PlacementError> {
        if !self.out_of_bounds.is_empty() {
            Some(PlacementError::OutOfBounds)
        } else if !self.blocked.is_empty() {
            Some(PlacementError::Occupied)
        } else {
            None
        }
    }

    /// Cells that receive interactable registrations once committed.
    ///
    /// Falls back to the anchor when the definition declares no affected offsets.
    #[must_use]
    pub fn interaction_cells(&self) -> Vec<CellCoord> {
        if self.affected.is_empty() {
            vec![self.anchor]
        } else {
            self.affected.clone()
        }
    }
}

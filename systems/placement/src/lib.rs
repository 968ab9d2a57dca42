#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement-mode system that previews machine footprints and emits placement commands.

use std::collections::BTreeMap;

use brewhouse_core::{
    AgentPose, CellCoord, Command, DefinitionId, Event, Facing, FootprintPlan, PlacementError,
};

/// Visual treatment requested for a floor tile while previewing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TileTint {
    /// Footprint cell that is inside the floor and free.
    ValidFootprint,
    /// Footprint cell that is outside the floor or already occupied.
    InvalidFootprint,
    /// Cell from which the machine would become usable.
    Affected,
}

/// Tile collaborator able to receive preview highlights.
pub trait TileSurface {
    /// Removes every tint applied so far.
    fn clear_tints(&mut self);

    /// Applies `tint` to the tile at `cell`.
    fn tint(&mut self, cell: CellCoord, tint: TileTint);
}

/// Declarative placement preview describing a potential machine construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlacementPreview {
    /// Catalog identifier of the equipped machine.
    pub definition: DefinitionId,
    /// Resolved footprint at the agent's facing cell.
    pub plan: FootprintPlan,
}

impl PlacementPreview {
    /// Anchor cell the preview was computed for.
    #[must_use]
    pub fn anchor(&self) -> CellCoord {
        self.plan.anchor
    }

    /// Effective facing the preview was computed for.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.plan.facing
    }

    /// Indicates whether the preview represents a valid placement location.
    #[must_use]
    pub fn placeable(&self) -> bool {
        self.plan.is_valid()
    }

    /// Tint of every highlighted cell.
    ///
    /// Footprint tints win over the affected tint where the two sets overlap.
    #[must_use]
    pub fn tints(&self) -> BTreeMap<CellCoord, TileTint> {
        let mut tints: BTreeMap<CellCoord, TileTint> = self
            .plan
            .affected
            .iter()
            .map(|cell| (*cell, TileTint::Affected))
            .collect();
        for cell in &self.plan.occupied {
            let _ = tints.insert(*cell, TileTint::ValidFootprint);
        }
        for cell in self.plan.invalid() {
            let _ = tints.insert(cell, TileTint::InvalidFootprint);
        }
        tints
    }

    /// Clears the surface and paints the preview onto it.
    pub fn paint<S>(&self, surface: &mut S)
    where
        S: TileSurface + ?Sized,
    {
        surface.clear_tints();
        for (cell, tint) in self.tints() {
            surface.tint(cell, tint);
        }
    }
}

/// Input snapshot distilled from adapter-provided frame input data.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PlacementInput {
    /// Machine the player picked from the catalog on this frame.
    pub equip: Option<DefinitionId>,
    /// Clockwise quarter turns added to the manual rotation on this frame.
    pub rotate: i32,
    /// Indicates whether the player confirmed the placement on this frame.
    pub confirm: bool,
    /// Indicates whether the player abandoned placement mode on this frame.
    pub cancel: bool,
}

/// Placement-mode system translating equip state, pose and input into commands.
///
/// Idle while nothing is equipped; previewing otherwise.
#[derive(Clone, Debug, Default)]
pub struct Placement {
    equipped: Option<DefinitionId>,
    rotation: Facing,
}

impl Placement {
    /// Creates an idle placement system.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            equipped: None,
            rotation: Facing::IDENTITY,
        }
    }

    /// Machine currently equipped for placement.
    #[must_use]
    pub fn equipped(&self) -> Option<&DefinitionId> {
        self.equipped.as_ref()
    }

    /// Manual rotation applied on top of the agent's facing.
    #[must_use]
    pub const fn rotation(&self) -> Facing {
        self.rotation
    }

    /// Facing used for both the footprint and the model rotation.
    #[must_use]
    pub const fn effective_facing(&self, pose: &AgentPose) -> Facing {
        pose.facing.facing().compose(self.rotation)
    }

    /// Computes the preview for the cell in front of the agent.
    ///
    /// The `plan` closure should mirror the world's `query::footprint_plan`
    /// helper so previews and commits resolve identical cells.
    pub fn preview<F>(&self, pose: &AgentPose, mut plan: F) -> Option<PlacementPreview>
    where
        F: FnMut(&DefinitionId, CellCoord, Facing) -> Option<FootprintPlan>,
    {
        let definition = self.equipped.as_ref()?;
        let plan = plan(definition, pose.facing_cell(), self.effective_facing(pose))?;
        Some(PlacementPreview {
            definition: definition.clone(),
            plan,
        })
    }

    /// Consumes world events and adapter-derived input to emit placement commands.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        input: &PlacementInput,
        pose: &AgentPose,
        plan: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(&DefinitionId, CellCoord, Facing) -> Option<FootprintPlan>,
    {
        for event in events {
            match event {
                Event::MachinePlaced { .. } => self.deselect(),
                Event::PlacementRejected {
                    reason: PlacementError::InsufficientFunds,
                    definition,
                    ..
                } => {
                    log::debug!("cannot afford `{definition}`, leaving placement mode");
                    self.deselect();
                }
                _ => {}
            }
        }

        if input.cancel {
            self.deselect();
            return;
        }

        if let Some(definition) = &input.equip {
            self.equipped = Some(definition.clone());
            self.rotation = Facing::IDENTITY;
        }

        if self.equipped.is_none() {
            return;
        }

        if input.rotate != 0 {
            self.rotation = self.rotation.compose(Facing::from_steps(input.rotate));
        }

        if !input.confirm || pose.busy {
            return;
        }

        let Some(preview) = self.preview(pose, plan) else {
            return;
        };
        if !preview.placeable() {
            log::debug!(
                "footprint of `{}` at {:?} is blocked",
                preview.definition,
                preview.anchor()
            );
            return;
        }

        out.push(Command::PlaceMachine {
            anchor: preview.anchor(),
            facing: preview.facing(),
            definition: preview.definition,
        });
    }

    fn deselect(&mut self) {
        self.equipped = None;
        self.rotation = Facing::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use brewhouse_core::Direction;

    use super::*;

    fn plan(
        occupied: &[CellCoord],
        affected: &[CellCoord],
        blocked: &[CellCoord],
    ) -> FootprintPlan {
        FootprintPlan {
            anchor: occupied[0],
            facing: Facing::IDENTITY,
            occupied: occupied.to_vec(),
            affected: affected.to_vec(),
            out_of_bounds: Vec::new(),
            blocked: blocked.to_vec(),
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        cleared: usize,
        tints: Vec<(CellCoord, TileTint)>,
    }

    impl TileSurface for RecordingSurface {
        fn clear_tints(&mut self) {
            self.cleared += 1;
            self.tints.clear();
        }

        fn tint(&mut self, cell: CellCoord, tint: TileTint) {
            self.tints.push((cell, tint));
        }
    }

    #[test]
    fn footprint_tint_wins_over_affected() {
        let preview = PlacementPreview {
            definition: DefinitionId::new("fermenter"),
            plan: plan(
                &[CellCoord::new(1, 1), CellCoord::new(2, 1)],
                &[CellCoord::new(2, 1), CellCoord::new(2, 0)],
                &[CellCoord::new(1, 1)],
            ),
        };

        let tints = preview.tints();
        assert_eq!(tints[&CellCoord::new(1, 1)], TileTint::InvalidFootprint);
        assert_eq!(tints[&CellCoord::new(2, 1)], TileTint::ValidFootprint);
        assert_eq!(tints[&CellCoord::new(2, 0)], TileTint::Affected);
        assert_eq!(tints.len(), 3);
        assert!(!preview.placeable());
    }

    #[test]
    fn paint_clears_before_tinting() {
        let preview = PlacementPreview {
            definition: DefinitionId::new("shelf"),
            plan: plan(&[CellCoord::new(0, 0)], &[], &[]),
        };
        let mut surface = RecordingSurface::default();
        surface.tint(CellCoord::new(9, 9), TileTint::Affected);

        preview.paint(&mut surface);

        assert_eq!(surface.cleared, 1);
        assert_eq!(
            surface.tints,
            vec![(CellCoord::new(0, 0), TileTint::ValidFootprint)]
        );
    }

    #[test]
    fn manual_rotation_composes_with_agent_facing() {
        let mut placement = Placement::new();
        let pose = AgentPose {
            cell: CellCoord::new(3, 3),
            facing: Direction::West,
            busy: false,
        };
        let mut commands = Vec::new();
        placement.handle(
            &[],
            &PlacementInput {
                equip: Some(DefinitionId::new("shelf")),
                rotate: 2,
                ..PlacementInput::default()
            },
            &pose,
            |_, _, _| None,
            &mut commands,
        );

        assert_eq!(placement.rotation(), Facing::from_steps(2));
        assert_eq!(placement.effective_facing(&pose), Facing::from_steps(1));
        assert!(commands.is_empty());
    }
}

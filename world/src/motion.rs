//! Frame-stepped interpolation of agents between cells and headings.

use std::time::Duration;

use glam::Vec3;

use brewhouse_core::{AgentId, CellCoord, Direction, InteractableId};

#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum MotionKind {
    Walk { from: Vec3, to: Vec3 },
    Turn { to: Direction },
}

/// Interpolation that always runs to completion once started.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Motion {
    kind: MotionKind,
    elapsed: Duration,
    duration: Duration,
}

impl Motion {
    pub(crate) const fn walk(from: Vec3, to: Vec3, duration: Duration) -> Self {
        Self {
            kind: MotionKind::Walk { from, to },
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub(crate) const fn turn(to: Direction, duration: Duration) -> Self {
        Self {
            kind: MotionKind::Turn { to },
            elapsed: Duration::ZERO,
            duration,
        }
    }

    pub(crate) const fn kind(&self) -> MotionKind {
        self.kind
    }

    /// Fraction of the motion completed, in `0.0..=1.0`.
    pub(crate) fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
    }

    /// Advances the motion, returning `true` once it has finished.
    pub(crate) fn advance(&mut self, dt: Duration) -> bool {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
        self.progress() >= 1.0
    }

    /// Interpolated position for walks.
    pub(crate) fn position(&self) -> Option<Vec3> {
        match self.kind {
            MotionKind::Walk { from, to } => Some(from.lerp(to, self.progress())),
            MotionKind::Turn { .. } => None,
        }
    }
}

/// Outcome of advancing an agent's motion by one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Settle {
    Idle,
    InProgress,
    Finished,
}

/// The player character moving cell by cell under direct control.
#[derive(Clone, Debug)]
pub(crate) struct Player {
    pub(crate) position: Vec3,
    pub(crate) facing: Direction,
    pub(crate) motion: Option<Motion>,
}

impl Player {
    pub(crate) const fn new(position: Vec3, facing: Direction) -> Self {
        Self {
            position,
            facing,
            motion: None,
        }
    }

    pub(crate) const fn is_busy(&self) -> bool {
        self.motion.is_some()
    }

    pub(crate) fn advance(&mut self, dt: Duration) -> Settle {
        let Some(motion) = self.motion.as_mut() else {
            return Settle::Idle;
        };

        let finished = motion.advance(dt);
        if let Some(position) = motion.position() {
            self.position = position;
        }
        if !finished {
            return Settle::InProgress;
        }

        if let MotionKind::Turn { to } = motion.kind() {
            self.facing = to;
        }
        self.motion = None;
        Settle::Finished
    }
}

/// Roaming agent whose logical cell follows its continuous position.
#[derive(Clone, Debug)]
pub(crate) struct Roamer {
    pub(crate) id: AgentId,
    pub(crate) position: Vec3,
    /// Cell the agent's interactable is registered on; `None` before first activation.
    pub(crate) registered_cell: Option<CellCoord>,
    pub(crate) interactable: InteractableId,
    pub(crate) motion: Option<Motion>,
}

impl Roamer {
    pub(crate) const fn new(id: AgentId, position: Vec3, interactable: InteractableId) -> Self {
        Self {
            id,
            position,
            registered_cell: None,
            interactable,
            motion: None,
        }
    }

    pub(crate) const fn is_moving(&self) -> bool {
        self.motion.is_some()
    }

    pub(crate) fn advance(&mut self, dt: Duration) -> Settle {
        let Some(motion) = self.motion.as_mut() else {
            return Settle::Idle;
        };

        let finished = motion.advance(dt);
        if let Some(position) = motion.position() {
            self.position = position;
        }
        if finished {
            self.motion = None;
            Settle::Finished
        } else {
            Settle::InProgress
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walk_interpolates_until_complete() {
        let mut motion = Motion::walk(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), Duration::from_secs(1));
        assert!(!motion.advance(Duration::from_millis(250)));
        assert_eq!(motion.position(), Some(Vec3::new(0.25, 0.0, 0.0)));
        assert!(!motion.advance(Duration::from_millis(500)));
        assert!(motion.advance(Duration::from_millis(500)));
        assert_eq!(motion.progress(), 1.0);
        assert_eq!(motion.position(), Some(Vec3::new(1.0, 0.0, 0.0)));
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut motion = Motion::turn(Direction::West, Duration::ZERO);
        assert_eq!(motion.progress(), 1.0);
        assert!(motion.advance(Duration::ZERO));
    }

    #[test]
    fn player_adopts_facing_when_turn_finishes() {
        let mut player = Player::new(Vec3::ZERO, Direction::North);
        player.motion = Some(Motion::turn(Direction::East, Duration::from_millis(100)));

        assert_eq!(player.advance(Duration::from_millis(60)), Settle::InProgress);
        assert_eq!(player.facing, Direction::North);
        assert!(player.is_busy());

        assert_eq!(player.advance(Duration::from_millis(60)), Settle::Finished);
        assert_eq!(player.facing, Direction::East);
        assert!(!player.is_busy());
        assert_eq!(player.advance(Duration::from_millis(60)), Settle::Idle);
    }
}

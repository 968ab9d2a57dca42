#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Seeded wandering system that steers idle roaming agents around the garage.

use brewhouse_core::{CellCoord, Command, Direction, Event, RoamerView};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Pure system that picks a random walkable neighbour for every idle roamer.
#[derive(Clone, Debug)]
pub struct Roaming {
    rng: ChaCha8Rng,
}

impl Roaming {
    /// Creates a new roaming system whose walk is fully determined by `seed`.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Consumes world events and the roamer view to emit step commands.
    ///
    /// Roamers are only steered on frames that advanced time. Agents still
    /// interpolating a step are left alone.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        roamers: &RoamerView,
        mut is_walkable: F,
        out: &mut Vec<Command>,
    ) where
        F: FnMut(CellCoord) -> bool,
    {
        let advanced = events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { dt } if !dt.is_zero()));
        if !advanced {
            return;
        }

        for roamer in roamers.iter().filter(|roamer| !roamer.moving) {
            let options: Vec<Direction> = Direction::ALL
                .into_iter()
                .filter(|direction| is_walkable(roamer.cell.step(*direction)))
                .collect();
            let Some(direction) = options.choose(&mut self.rng).copied() else {
                log::debug!("roamer {} is boxed in at {:?}", roamer.id.get(), roamer.cell);
                continue;
            };

            out.push(Command::StepRoamer {
                agent: roamer.id,
                direction,
            });
        }
    }
}

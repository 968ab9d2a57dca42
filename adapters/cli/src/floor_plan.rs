use std::collections::BTreeSet;

use brewhouse_core::CellCoord;
use brewhouse_world::{query, World};

const PLAYER: char = '@';
const ROAMER: char = 'm';
const FOOTPRINT: char = '#';
const AFFECTED: char = '+';
const FREE: char = '.';

/// Renders the garage floor as text, northmost row first.
pub(crate) fn render(world: &World) -> String {
    let layout = query::layout(world);
    let player = query::player_pose(world).cell;
    let roamers: BTreeSet<CellCoord> = query::roamer_view(world)
        .iter()
        .map(|roamer| roamer.cell)
        .collect();
    let affected: BTreeSet<CellCoord> = query::machine_view(world)
        .into_iter()
        .flat_map(|machine| machine.affected)
        .collect();

    let width = i32::try_from(layout.width()).unwrap_or(i32::MAX);
    let height = i32::try_from(layout.height()).unwrap_or(i32::MAX);
    let mut plan = String::new();
    for y in (0..height).rev() {
        for x in 0..width {
            let cell = CellCoord::new(x, y);
            let glyph = if cell == player {
                PLAYER
            } else if roamers.contains(&cell) {
                ROAMER
            } else if query::is_occupied(world, cell) {
                FOOTPRINT
            } else if affected.contains(&cell) {
                AFFECTED
            } else {
                FREE
            };
            plan.push(glyph);
        }
        plan.push('\n');
    }
    plan
}

//! Tracking of floor cells blocked by machine footprints.

use std::collections::BTreeSet;

use brewhouse_core::CellCoord;

use crate::layout::FloorLayout;

/// Set of occupied cells, always a subset of the inside cells.
#[derive(Clone, Debug, Default)]
pub(crate) struct OccupancySet {
    cells: BTreeSet<CellCoord>,
}

impl OccupancySet {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Marks or unmarks each cell. Cells outside the layout are skipped.
    ///
    /// Returns how many cells changed state.
    pub(crate) fn set_occupied<I>(
        &mut self,
        layout: &FloorLayout,
        cells: I,
        occupied: bool,
    ) -> usize
    where
        I: IntoIterator<Item = CellCoord>,
    {
        let mut changed = 0;
        for cell in cells {
            if !layout.is_inside(cell) {
                log::debug!("ignoring occupancy change for out-of-bounds cell {cell:?}");
                continue;
            }

            let toggled = if occupied {
                self.cells.insert(cell)
            } else {
                self.cells.remove(&cell)
            };
            if toggled {
                changed += 1;
            }
        }
        changed
    }

    pub(crate) fn is_occupied(&self, cell: CellCoord) -> bool {
        self.cells.contains(&cell)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CellCoord> + '_ {
        self.cells.iter().copied()
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn layout() -> FloorLayout {
        FloorLayout::new(10, 10, 1.0, Vec3::ZERO)
    }

    #[test]
    fn marking_then_unmarking_restores_free_state() {
        let layout = layout();
        let mut occupancy = OccupancySet::new();
        let cell = CellCoord::new(4, 2);

        assert_eq!(occupancy.set_occupied(&layout, [cell], true), 1);
        assert!(occupancy.is_occupied(cell));

        assert_eq!(occupancy.set_occupied(&layout, [cell], false), 1);
        assert!(!occupancy.is_occupied(cell));
    }

    #[test]
    fn repeated_marks_are_no_ops() {
        let layout = layout();
        let mut occupancy = OccupancySet::new();
        let cells = [CellCoord::new(1, 1), CellCoord::new(1, 2)];

        assert_eq!(occupancy.set_occupied(&layout, cells, true), 2);
        assert_eq!(occupancy.set_occupied(&layout, cells, true), 0);
        assert_eq!(occupancy.len(), 2);
        assert_eq!(occupancy.set_occupied(&layout, [CellCoord::new(8, 8)], false), 0);
    }

    #[test]
    fn out_of_bounds_cells_are_rejected() {
        let layout = layout();
        let mut occupancy = OccupancySet::new();
        let outside = [CellCoord::new(-1, 0), CellCoord::new(10, 3), CellCoord::new(2, 10)];

        assert_eq!(occupancy.set_occupied(&layout, outside, true), 0);
        for cell in outside {
            assert!(!occupancy.is_occupied(cell));
        }
        assert_eq!(occupancy.len(), 0);
    }

    #[test]
    fn clear_empties_the_set() {
        let layout = layout();
        let mut occupancy = OccupancySet::new();
        let _ = occupancy.set_occupied(&layout, layout.cells(), true);
        assert_eq!(occupancy.len(), 100);

        occupancy.clear();
        assert_eq!(occupancy.iter().count(), 0);
    }
}

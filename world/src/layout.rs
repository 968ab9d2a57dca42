//! Mapping between discrete floor cells and continuous world positions.

use glam::Vec3;

use brewhouse_core::{CellCoord, CellOffset};

/// Exclusive bound on column and row counts. Inside cells and expansion shifts
/// stay strictly below `i32::MAX`, where saturated coordinates end up.
const MAX_EXTENT: u32 = i32::MAX as u32;

/// Describes the rectangular cell layout of the garage floor.
#[derive(Clone, Debug, PartialEq)]
pub struct FloorLayout {
    width: u32,
    height: u32,
    tile_size: f32,
    origin: Vec3,
}

impl FloorLayout {
    /// Creates a new floor layout description.
    ///
    /// Dimensions are capped below `i32::MAX` cells.
    #[must_use]
    pub const fn new(width: u32, height: u32, tile_size: f32, origin: Vec3) -> Self {
        Self {
            width: clamp_extent(width),
            height: clamp_extent(height),
            tile_size,
            origin,
        }
    }

    /// Number of columns contained in the floor.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows contained in the floor.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Side length of a single square cell expressed in world units.
    #[must_use]
    pub const fn tile_size(&self) -> f32 {
        self.tile_size
    }

    /// World position of cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> Vec3 {
        self.origin
    }

    /// Reports whether the cell lies within the floor bounds.
    #[must_use]
    pub fn is_inside(&self, cell: CellCoord) -> bool {
        cell.x() >= 0
            && cell.y() >= 0
            && i64::from(cell.x()) < i64::from(self.width)
            && i64::from(cell.y()) < i64::from(self.height)
    }

    /// World position of the cell's centre. Grid `y` runs along world `z`.
    #[must_use]
    pub fn grid_to_world(&self, cell: CellCoord) -> Vec3 {
        self.origin
            + Vec3::new(
                cell.x() as f32 * self.tile_size,
                0.0,
                cell.y() as f32 * self.tile_size,
            )
    }

    /// Cell whose centre is nearest to the provided world position.
    #[must_use]
    pub fn world_to_grid(&self, position: Vec3) -> CellCoord {
        let local = (position - self.origin) / self.tile_size;
        CellCoord::new(local.x.round() as i32, local.z.round() as i32)
    }

    /// Iterates every inside cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let width = i32::try_from(self.width).unwrap_or(i32::MAX);
        let height = i32::try_from(self.height).unwrap_or(i32::MAX);
        (0..height).flat_map(move |y| (0..width).map(move |x| CellCoord::new(x, y)))
    }

    /// Grows the layout on each side.
    ///
    /// The origin moves by the prepended columns and rows so that every world
    /// position stays put; the returned offset maps old cells onto new ones.
    /// Growth stops at the dimension cap, prepended cells first.
    #[must_use]
    pub fn expanded(&self, right: u32, left: u32, up: u32, down: u32) -> (Self, CellOffset) {
        let (left, right) = grow_within_cap(self.width, left, right);
        let (down, up) = grow_within_cap(self.height, down, up);
        let shift_x = i32::try_from(left).unwrap_or(i32::MAX);
        let shift_y = i32::try_from(down).unwrap_or(i32::MAX);
        let origin = self.origin
            - Vec3::new(
                left as f32 * self.tile_size,
                0.0,
                down as f32 * self.tile_size,
            );
        let layout = Self {
            width: self.width + left + right,
            height: self.height + down + up,
            tile_size: self.tile_size,
            origin,
        };
        (layout, CellOffset::new(shift_x, shift_y))
    }
}

const fn clamp_extent(cells: u32) -> u32 {
    if cells > MAX_EXTENT - 1 {
        MAX_EXTENT - 1
    } else {
        cells
    }
}

/// Splits the room left under the cap between the prepended and appended sides.
fn grow_within_cap(current: u32, before: u32, after: u32) -> (u32, u32) {
    let room = (MAX_EXTENT - 1).saturating_sub(current);
    let before = before.min(room);
    let after = after.min(room - before);
    (before, after)
}

//! Row-wrapping grid geometry for composed collages

/// Placement of `count` equally sized tiles in rows of `row_capacity`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridLayout {
    count: usize,
    row_capacity: usize,
    tile_width: u32,
    tile_height: u32,
}

impl GridLayout {
    /// Create a layout; a zero row capacity is treated as one tile per row
    pub fn new(count: usize, row_capacity: usize, tile_width: u32, tile_height: u32) -> Self {
        Self {
            count,
            row_capacity: row_capacity.max(1),
            tile_width,
            tile_height,
        }
    }

    /// Number of tiles laid out
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Number of columns actually used
    pub fn columns(&self) -> usize {
        self.count.min(self.row_capacity)
    }

    /// Number of rows, rounding up a partial last row
    pub const fn rows(&self) -> usize {
        self.count.div_ceil(self.row_capacity)
    }

    /// Canvas (width, height) in pixels
    pub fn canvas_size(&self) -> (u32, u32) {
        (
            to_u32(self.columns()).saturating_mul(self.tile_width),
            to_u32(self.rows()).saturating_mul(self.tile_height),
        )
    }

    /// Top-left pixel of tile `index`
    pub fn position(&self, index: usize) -> (u32, u32) {
        let column = index % self.row_capacity;
        let row = index / self.row_capacity;
        (
            to_u32(column).saturating_mul(self.tile_width),
            to_u32(row).saturating_mul(self.tile_height),
        )
    }

    /// Positions of every tile in order
    pub fn positions(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        (0..self.count).map(|index| self.position(index))
    }
}

fn to_u32(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

//! Partial update addressing.
//!
//! A partial update still streams every cell of both halves. Cells inside the window
//! carry image bytes, everything else carries [`KEEP`]. The bounds below follow the
//! controller vendor's arithmetic to the letter: the window's last row and, for an even
//! right edge, its last byte column are exclusive, and the split tests are strict
//! (`> 300`, `< 300`).

use crate::display_constants::{HEIGHT, SEGMENT_BYTES};
use std::cmp::{max, min};
use std::ops::Range;

/// Byte the controller leaves untouched during a partial refresh
pub const KEEP: u8 = 0x11;

/// Packed byte column where the right half starts
const SPLIT: i32 = SEGMENT_BYTES as i32;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Half {
    /// Driven through the main chip select
    Left,
    /// Driven through the peripheral chip select
    Right,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Placement {
    LeftHalf,
    RightHalf,
    Spanning,
}

/// A rectangle in pixel coordinates, resolved to packed byte columns and rows.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PartialWindow {
    x_start: i32,
    x_end: i32,
    y_start: i32,
    y_end: i32,
    stride: i32,
    placement: Placement,
}

impl PartialWindow {
    pub fn new(x: u16, y: u16, width: u16, height: u16) -> Self {
        let right_edge = i32::from(x) + i32::from(width);
        let x_end = if right_edge % 2 == 0 {
            right_edge / 2 - 1
        } else {
            right_edge / 2
        };
        let y_end = i32::from(y) + i32::from(height) - 1;
        let x_start = i32::from(x) / 2;

        let placement = if x_start > SPLIT {
            Placement::RightHalf
        } else if x_end < SPLIT {
            Placement::LeftHalf
        } else {
            Placement::Spanning
        };

        PartialWindow {
            x_start,
            x_end,
            y_start: i32::from(y),
            y_end,
            stride: i32::from(width) / 2,
            placement,
        }
    }

    pub fn placement(&self) -> Placement {
        self.placement
    }

    /// Panel rows that carry image bytes
    pub fn rows(&self) -> Range<usize> {
        let first = max(self.y_start, 0);
        let end = max(min(self.y_end, HEIGHT as i32), first);
        first as usize..end as usize
    }

    /// Packed byte columns of `half` that carry image bytes, in that half's coordinates
    pub fn columns(&self, half: Half) -> Range<usize> {
        let (start, end) = match (self.placement, half) {
            (Placement::RightHalf, Half::Left) | (Placement::LeftHalf, Half::Right) => (0, 0),
            (Placement::RightHalf, Half::Right) => (self.x_start - SPLIT, self.x_end - SPLIT),
            (Placement::LeftHalf, Half::Left) => (self.x_start, self.x_end),
            (Placement::Spanning, Half::Left) => (self.x_start, SPLIT),
            (Placement::Spanning, Half::Right) => (0, self.x_end - SPLIT),
        };
        let start = start.clamp(0, SPLIT);
        let end = end.clamp(start, SPLIT);
        start as usize..end as usize
    }

    /// Index into the caller's window buffer for one cell, `None` when the cell is kept
    pub fn source_index(&self, half: Half, row: usize, column: usize) -> Option<usize> {
        if !self.rows().contains(&row) || !self.columns(half).contains(&column) {
            return None;
        }
        let row_offset = self.stride * (row as i32 - self.y_start);
        let column_offset = match (self.placement, half) {
            (Placement::RightHalf, _) => column as i32 - (self.x_start - SPLIT),
            (Placement::Spanning, Half::Right) => column as i32 + SPLIT - self.x_start,
            _ => column as i32 - self.x_start,
        };
        usize::try_from(row_offset + column_offset).ok()
    }

    /// Bytes the window buffer must hold for every cell to resolve
    pub fn required_len(&self) -> usize {
        let Some(last_row) = self.rows().last() else {
            return 0;
        };
        [Half::Left, Half::Right]
            .into_iter()
            .filter_map(|half| {
                let last_column = self.columns(half).last()?;
                self.source_index(half, last_row, last_column)
            })
            .max()
            .map_or(0, |index| index + 1)
    }

    /// Fill one segment row of `half`. `image` must hold at least [`Self::required_len`] bytes.
    pub fn fill_row(&self, half: Half, row: usize, image: &[u8], out: &mut [u8]) {
        for (column, cell) in out.iter_mut().enumerate() {
            *cell = match self.source_index(half, row, column) {
                Some(index) => image[index],
                None => KEEP,
            };
        }
    }
}

use serde::{Deserialize, Serialize};

use crate::*;

/// Fixed partition of a canvas into square cells.
///
/// Edge cells may extend past the canvas when its size is not a multiple of the cell size, so
/// that every canvas pixel belongs to some cell.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    width: f64,
    height: f64,
    cell_size: f64,
    columns: Coord,
    rows: Coord,
}

impl Grid {
    pub fn new(width: f64, height: f64, cell_size: f64) -> Result<Self> {
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            return Err(CardError::InvalidCanvasSize { width, height });
        }
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(CardError::InvalidCellSize(cell_size));
        }

        let columns = ceil_div(width, cell_size);
        let rows = ceil_div(height, cell_size);
        let too_large = CardError::GridTooLarge { columns, rows };
        let columns = Coord::try_from(columns).map_err(|_| too_large)?;
        let rows = Coord::try_from(rows).map_err(|_| too_large)?;
        checked_mult(columns, rows).ok_or(too_large)?;

        Ok(Self {
            width,
            height,
            cell_size,
            columns,
            rows,
        })
    }

    pub const fn size(&self) -> Coord2 {
        (self.columns, self.rows)
    }

    pub const fn columns(&self) -> Coord {
        self.columns
    }

    pub const fn rows(&self) -> Coord {
        self.rows
    }

    pub const fn cell_size(&self) -> f64 {
        self.cell_size
    }

    pub const fn canvas_size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub const fn cell_count(&self) -> CellCount {
        // checked at construction
        self.columns * self.rows
    }

    /// Resolves a canvas-local pointer position to the cell under it.
    ///
    /// Positions outside the canvas are clamped onto its border, so the maximum edge maps to the
    /// last column/row instead of one past it. Returns `None` only for non-finite input.
    pub fn cell_index_at(&self, x: f64, y: f64) -> Option<CellIndex> {
        if !(x.is_finite() && y.is_finite()) {
            return None;
        }
        let column = axis_cell(x, self.width, self.cell_size, self.columns);
        let row = axis_cell(y, self.height, self.cell_size, self.rows);
        Some(self.index_of((column, row)))
    }

    pub const fn index_of(&self, (column, row): Coord2) -> CellIndex {
        row * self.columns + column
    }

    pub fn coords_of(&self, index: CellIndex) -> Result<Coord2> {
        self.validate_index(index)?;
        Ok((index % self.columns, index / self.columns))
    }

    /// Canvas-space center of a cell, used to place its drawables.
    pub fn cell_center(&self, index: CellIndex) -> Result<(f64, f64)> {
        let (column, row) = self.coords_of(index)?;
        let half = self.cell_size / 2.0;
        Ok((
            f64::from(column) * self.cell_size + half,
            f64::from(row) * self.cell_size + half,
        ))
    }

    pub fn validate_index(&self, index: CellIndex) -> Result<CellIndex> {
        if index < self.cell_count() {
            Ok(index)
        } else {
            Err(CardError::IndexOutOfRange {
                index,
                cell_count: self.cell_count(),
            })
        }
    }
}

fn ceil_div(length: f64, cell_size: f64) -> u64 {
    let cells = length / cell_size;
    let whole = cells as u64;
    if (whole as f64) < cells {
        // saturates for huge ratios, reported as too large by the caller
        whole.saturating_add(1)
    } else {
        whole.max(1)
    }
}

fn axis_cell(position: f64, length: f64, cell_size: f64, cells: Coord) -> Coord {
    let position = position.clamp(0.0, length);
    let cell = (position / cell_size) as u64;
    cell.min(u64::from(cells - 1)) as Coord
}

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Reveal state of a single cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Covered,
    Revealed,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Covered
    }
}

/// Per-cell reveal state for a whole grid, addressed by row-major [`CellIndex`].
///
/// Holds plain state only; renderers keep their own drawables keyed by the same index.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellStore {
    cells: Array2<CellState>,
}

impl CellStore {
    pub fn new((columns, rows): Coord2) -> Self {
        Self {
            cells: Array2::default((rows as usize, columns as usize)),
        }
    }

    pub fn for_grid(grid: &Grid) -> Self {
        Self::new(grid.size())
    }

    pub fn len(&self) -> CellCount {
        // grids never hold more than CellCount::MAX cells
        self.cells.len() as CellCount
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Marks a cell revealed, returning whether it already was.
    pub fn mark_revealed(&mut self, index: CellIndex) -> Result<bool> {
        let cell = self.cell_mut(index)?;
        let was_revealed = cell.is_revealed();
        *cell = CellState::Revealed;
        Ok(was_revealed)
    }

    pub fn state(&self, index: CellIndex) -> Result<CellState> {
        self.cells
            .as_slice()
            .and_then(|cells| cells.get(index as usize))
            .copied()
            .ok_or(self.out_of_range(index))
    }

    pub fn is_revealed(&self, index: CellIndex) -> Result<bool> {
        self.state(index).map(CellState::is_revealed)
    }

    /// Cell states in index order.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, CellState)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, &state)| (index as CellIndex, state))
    }

    pub fn reset(&mut self) {
        self.cells.fill(CellState::Covered);
    }

    fn cell_mut(&mut self, index: CellIndex) -> Result<&mut CellState> {
        let err = self.out_of_range(index);
        self.cells
            .as_slice_mut()
            .and_then(|cells| cells.get_mut(index as usize))
            .ok_or(err)
    }

    fn out_of_range(&self, index: CellIndex) -> CardError {
        CardError::IndexOutOfRange {
            index,
            cell_count: self.len(),
        }
    }
}

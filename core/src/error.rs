use thiserror::Error;

use crate::{CellCount, CellIndex};

#[derive(Error, Debug, Copy, Clone, PartialEq)]
pub enum CardError {
    #[error("Canvas size must be positive and finite, got {width}x{height}")]
    InvalidCanvasSize { width: f64, height: f64 },
    #[error("Cell size must be positive and finite, got {0}")]
    InvalidCellSize(f64),
    #[error("Threshold fraction must be in (0, 1], got {0}")]
    InvalidThresholdFraction(f64),
    #[error("Low-resource threshold must be positive")]
    InvalidLowResourceThreshold,
    #[error("Grid of {columns}x{rows} cells is too large")]
    GridTooLarge { columns: u64, rows: u64 },
    #[error("Cell index {index} is out of range for {cell_count} cells")]
    IndexOutOfRange {
        index: CellIndex,
        cell_count: CellCount,
    },
}

impl CardError {
    /// Whether this error comes from setup and should abort construction.
    pub const fn is_configuration(&self) -> bool {
        !matches!(self, Self::IndexOutOfRange { .. })
    }
}

pub type Result<T> = core::result::Result<T, CardError>;

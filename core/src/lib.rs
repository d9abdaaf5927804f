#![no_std]

extern crate alloc;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

pub use cell::*;
pub use ease::*;
pub use error::*;
pub use grid::*;
pub use sequencer::*;
pub use session::*;
pub use tracker::*;
pub use types::*;

mod cell;
mod ease;
mod error;
mod grid;
mod sequencer;
mod session;
mod tracker;
mod types;

/// Kind of device the card is deployed on, decides which threshold applies.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DeviceClass {
    #[default]
    Standard,
    LowResource,
}

/// Which cover-art elements fade out during the first phase of the sequence.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FadePolicy {
    /// Every cover-art element fades, regardless of whether its cell was revealed.
    #[default]
    Uniform,
    /// Only cells that were never revealed fade; revealed dots hold until phase two.
    CoveredOnly,
}

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardConfig {
    pub canvas_width: f64,
    pub canvas_height: f64,
    pub cell_size: f64,
    /// Share of all cells that must be revealed before the sequence starts.
    pub threshold_fraction: f64,
    /// Fixed threshold used instead of the fraction on [`DeviceClass::LowResource`].
    pub low_resource_threshold: CellCount,
    pub device: DeviceClass,
    pub phase_one_ms: u32,
    pub phase_two_ms: u32,
    pub ease: Ease,
    pub fade_policy: FadePolicy,
}

impl CardConfig {
    pub const DEFAULT_CELL_SIZE: f64 = 12.0;
    pub const DEFAULT_THRESHOLD_FRACTION: f64 = 0.05;
    pub const DEFAULT_LOW_RESOURCE_THRESHOLD: CellCount = 30;
    pub const DEFAULT_PHASE_MS: u32 = 2500;

    pub fn new(canvas_width: f64, canvas_height: f64) -> Self {
        Self {
            canvas_width,
            canvas_height,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.grid().map(|_| ())
    }

    /// Builds the grid described by this config, checking every setup value on the way.
    pub fn grid(&self) -> Result<Grid> {
        let fraction = self.threshold_fraction;
        if !(fraction > 0.0 && fraction <= 1.0) {
            return Err(CardError::InvalidThresholdFraction(fraction));
        }
        if self.low_resource_threshold == 0 {
            return Err(CardError::InvalidLowResourceThreshold);
        }
        Grid::new(self.canvas_width, self.canvas_height, self.cell_size)
    }

    /// Revealed-cell count that has to be exceeded to start the sequence.
    ///
    /// Capped at `cell_count - 1` so that revealing every cell always crosses it.
    pub fn threshold_for(&self, cell_count: CellCount) -> CellCount {
        let requested = match self.device {
            DeviceClass::Standard => {
                // absorb representation error, 0.05 * 1760 must give 88
                let scaled = self.threshold_fraction * f64::from(cell_count) + 1e-9;
                (scaled as CellCount).max(1)
            }
            DeviceClass::LowResource => self.low_resource_threshold,
        };

        let reachable = cell_count.saturating_sub(1);
        if requested > reachable {
            log::warn!(
                "Threshold {} cannot be exceeded with {} cells, capped to {}",
                requested,
                cell_count,
                reachable
            );
            reachable
        } else {
            requested
        }
    }
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            canvas_width: 660.0,
            canvas_height: 384.0,
            cell_size: Self::DEFAULT_CELL_SIZE,
            threshold_fraction: Self::DEFAULT_THRESHOLD_FRACTION,
            low_resource_threshold: Self::DEFAULT_LOW_RESOURCE_THRESHOLD,
            device: DeviceClass::default(),
            phase_one_ms: Self::DEFAULT_PHASE_MS,
            phase_two_ms: Self::DEFAULT_PHASE_MS,
            ease: Ease::default(),
            fade_policy: FadePolicy::default(),
        }
    }
}

/// Outcome of recording a reveal
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    ThresholdCrossed,
}

impl RevealOutcome {
    /// Whether this outcome could have changed what is drawn
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Revealed => true,
            Self::ThresholdCrossed => true,
        }
    }
}

bitflags! {
    /// One-shot notifications raised towards the host while driving a session.
    #[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Signals: u8 {
        const THRESHOLD_CROSSED  = 1;
        const PHASE_ONE_COMPLETE = 1 << 1;
        const SEQUENCE_COMPLETE  = 1 << 2;
    }
}

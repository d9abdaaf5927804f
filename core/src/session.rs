use serde::{Deserialize, Serialize};

use crate::*;

/// Visual weights of the two representations a cell can be drawn with.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellWeight {
    pub covered: f64,
    pub revealed: f64,
}

/// Everything one card needs between setup and reset: the grid, the reveal tracker and the fade
/// sequencer, driven by pointer moves and frame ticks from the host.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealSession {
    config: CardConfig,
    grid: Grid,
    tracker: RevealTracker,
    sequencer: FadeSequencer,
}

impl RevealSession {
    pub fn new(config: CardConfig) -> Result<Self> {
        let grid = config.grid()?;
        let threshold = config.threshold_for(grid.cell_count());
        log::debug!(
            "session {}x{} cells, threshold {}",
            grid.columns(),
            grid.rows(),
            threshold
        );
        Ok(Self {
            config,
            grid,
            tracker: RevealTracker::new(CellStore::for_grid(&grid), threshold),
            sequencer: FadeSequencer::from_config(&config),
        })
    }

    pub fn config(&self) -> &CardConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tracker(&self) -> &RevealTracker {
        &self.tracker
    }

    pub fn threshold(&self) -> CellCount {
        self.tracker.threshold()
    }

    pub fn revealed_count(&self) -> CellCount {
        self.tracker.revealed_count()
    }

    pub fn is_sequence_triggered(&self) -> bool {
        self.tracker.is_triggered()
    }

    pub fn phase(&self) -> FadePhase {
        self.sequencer.phase()
    }

    /// Token to pass back into [`RevealSession::tick`] while the sequence runs.
    pub fn sequence_token(&self) -> Option<SequenceToken> {
        self.sequencer.token()
    }

    /// Reveals the cell under a canvas-local pointer position.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Signals {
        let Some(index) = self.grid.cell_index_at(x, y) else {
            log::trace!("ignoring pointer at ({}, {})", x, y);
            return Signals::empty();
        };

        match self.tracker.record_reveal(index) {
            Ok(RevealOutcome::ThresholdCrossed) => {
                self.sequencer.start();
                Signals::THRESHOLD_CROSSED
            }
            Ok(_) => Signals::empty(),
            Err(err) => {
                log::error!("dropping pointer at ({}, {}): {}", x, y, err);
                Signals::empty()
            }
        }
    }

    pub fn tick(&mut self, token: SequenceToken, delta_ms: f64) -> Signals {
        self.sequencer.advance(token, delta_ms)
    }

    pub fn reset(&mut self) {
        self.tracker.reset();
        self.sequencer.reset();
        log::debug!("session reset");
    }

    pub fn frame(&self) -> FadeFrame {
        self.sequencer.frame()
    }

    pub fn cell_weight(&self, index: CellIndex) -> Result<CellWeight> {
        let state = self.tracker.cells().state(index)?;
        Ok(Self::weight_of(state, &self.frame()))
    }

    /// Weights of every cell in index order, for one frame.
    pub fn cell_weights(&self) -> impl Iterator<Item = (CellIndex, CellWeight)> + '_ {
        let frame = self.frame();
        self.tracker
            .cells()
            .iter()
            .map(move |(index, state)| (index, Self::weight_of(state, &frame)))
    }

    fn weight_of(state: CellState, frame: &FadeFrame) -> CellWeight {
        match state {
            CellState::Covered => CellWeight {
                covered: frame.covered_weight,
                revealed: 0.0,
            },
            CellState::Revealed => CellWeight {
                covered: 0.0,
                revealed: frame.revealed_weight,
            },
        }
    }
}

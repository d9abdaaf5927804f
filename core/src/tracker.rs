use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrackerState {
    Collecting,
    Triggered,
}

impl TrackerState {
    pub const fn is_triggered(self) -> bool {
        matches!(self, Self::Triggered)
    }
}

impl Default for TrackerState {
    fn default() -> Self {
        Self::Collecting
    }
}

/// Counts distinct reveals and latches once the count exceeds the threshold.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RevealTracker {
    cells: CellStore,
    threshold: CellCount,
    revealed_count: CellCount,
    history: Vec<CellIndex>,
    state: TrackerState,
}

impl RevealTracker {
    pub fn new(cells: CellStore, threshold: CellCount) -> Self {
        Self {
            cells,
            threshold,
            revealed_count: 0,
            history: Vec::new(),
            state: Default::default(),
        }
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_triggered(&self) -> bool {
        self.state.is_triggered()
    }

    pub fn threshold(&self) -> CellCount {
        self.threshold
    }

    pub fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub fn cells(&self) -> &CellStore {
        &self.cells
    }

    /// Indices in the order they were first revealed.
    pub fn history(&self) -> &[CellIndex] {
        &self.history
    }

    pub fn record_reveal(&mut self, index: CellIndex) -> Result<RevealOutcome> {
        if self.cells.mark_revealed(index)? {
            return Ok(RevealOutcome::NoChange);
        }

        self.revealed_count += 1;
        self.history.push(index);
        log::trace!("cell {} revealed ({} total)", index, self.revealed_count);

        if !self.state.is_triggered() && self.revealed_count > self.threshold {
            self.state = TrackerState::Triggered;
            log::debug!(
                "threshold {} crossed after {} reveals",
                self.threshold,
                self.revealed_count
            );
            Ok(RevealOutcome::ThresholdCrossed)
        } else {
            Ok(RevealOutcome::Revealed)
        }
    }

    pub fn reset(&mut self) {
        self.cells.reset();
        self.revealed_count = 0;
        self.history.clear();
        self.state = TrackerState::Collecting;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(size: Coord2, threshold: CellCount) -> RevealTracker {
        RevealTracker::new(CellStore::new(size), threshold)
    }

    #[test]
    fn repeated_reveal_counts_once() {
        let mut tracker = tracker((4, 4), 9);

        assert_eq!(tracker.record_reveal(3), Ok(RevealOutcome::Revealed));
        assert_eq!(tracker.record_reveal(3), Ok(RevealOutcome::NoChange));
        assert_eq!(tracker.revealed_count(), 1);
        assert_eq!(tracker.history(), &[3]);
    }

    #[test]
    fn threshold_is_strictly_exceeded() {
        let mut tracker = tracker((4, 4), 9);

        for index in 0..9 {
            assert_eq!(tracker.record_reveal(index), Ok(RevealOutcome::Revealed));
        }
        assert_eq!(tracker.revealed_count(), 9);
        assert_eq!(tracker.state(), TrackerState::Collecting);

        assert_eq!(
            tracker.record_reveal(9),
            Ok(RevealOutcome::ThresholdCrossed)
        );
        assert_eq!(tracker.state(), TrackerState::Triggered);
    }

    #[test]
    fn triggered_state_is_latched() {
        let mut tracker = tracker((4, 4), 1);
        tracker.record_reveal(0).unwrap();
        assert_eq!(
            tracker.record_reveal(1),
            Ok(RevealOutcome::ThresholdCrossed)
        );

        assert_eq!(tracker.record_reveal(2), Ok(RevealOutcome::Revealed));
        assert_eq!(tracker.record_reveal(2), Ok(RevealOutcome::NoChange));
        assert!(tracker.is_triggered());
        assert_eq!(tracker.revealed_count(), 3);
        assert_eq!(tracker.cells().is_revealed(2), Ok(true));
    }

    #[test]
    fn out_of_range_leaves_count_untouched() {
        let mut tracker = tracker((2, 2), 1);

        assert!(matches!(
            tracker.record_reveal(4),
            Err(CardError::IndexOutOfRange { index: 4, .. })
        ));
        assert_eq!(tracker.revealed_count(), 0);
        assert!(tracker.history().is_empty());
    }

    #[test]
    fn reset_returns_to_collecting() {
        let mut tracker = tracker((2, 2), 0);
        assert_eq!(
            tracker.record_reveal(1),
            Ok(RevealOutcome::ThresholdCrossed)
        );

        tracker.reset();

        assert_eq!(tracker.state(), TrackerState::Collecting);
        assert_eq!(tracker.revealed_count(), 0);
        assert!(tracker.history().is_empty());
        assert_eq!(tracker.cells().is_revealed(1), Ok(false));
        assert_eq!(
            tracker.record_reveal(1),
            Ok(RevealOutcome::ThresholdCrossed)
        );
    }

    #[test]
    fn card_sized_grid_crosses_on_eighty_ninth_reveal() {
        let config = CardConfig::default();
        let grid = config.grid().unwrap();
        let mut tracker = RevealTracker::new(
            CellStore::for_grid(&grid),
            config.threshold_for(grid.cell_count()),
        );
        assert_eq!(tracker.threshold(), 88);

        for index in 0..88 {
            assert_ne!(
                tracker.record_reveal(index),
                Ok(RevealOutcome::ThresholdCrossed)
            );
        }
        assert_eq!(
            tracker.record_reveal(88),
            Ok(RevealOutcome::ThresholdCrossed)
        );
        for index in 89..200 {
            assert_eq!(tracker.record_reveal(index), Ok(RevealOutcome::Revealed));
        }
    }
}

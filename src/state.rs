use thiserror::Error;

use crate::color::ColorMap;
use crate::data::model::{Dataset, DatasetKind};

// ---------------------------------------------------------------------------
// Per-dataset slot
// ---------------------------------------------------------------------------

/// Load status of one dataset as shown to the user.
#[derive(Debug, Clone, PartialEq)]
pub enum SlotStatus {
    Empty,
    Loading,
    Loaded(usize),
    Failed(String),
}

/// One dataset plus where its loading stands.
///
/// A reload keeps the previous dataset visible until the new one arrives;
/// a failed reload keeps it too and records the error.
#[derive(Debug, Clone, Default)]
pub struct DatasetSlot {
    pub dataset: Option<Dataset>,
    pub pending: bool,
    pub error: Option<String>,
}

impl DatasetSlot {
    pub fn status(&self) -> SlotStatus {
        match (&self.dataset, &self.error) {
            (_, Some(msg)) => SlotStatus::Failed(msg.clone()),
            (Some(ds), None) => SlotStatus::Loaded(ds.len()),
            (None, None) if self.pending => SlotStatus::Loading,
            (None, None) => SlotStatus::Empty,
        }
    }

    /// Number of records currently held (0 when nothing is loaded).
    pub fn len(&self) -> usize {
        self.dataset.as_ref().map_or(0, Dataset::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Everything that can change [`ComponentState`].
#[derive(Debug, Clone)]
pub enum Event {
    LoadStarted(DatasetKind),
    Loaded(DatasetKind, Dataset),
    LoadFailed(DatasetKind, String),
    Select(usize),
    SetScaling(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("record {index} is out of range ({len} test records loaded)")]
pub struct IndexOutOfRange {
    pub index: usize,
    pub len: usize,
}

// ---------------------------------------------------------------------------
// Component state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
#[derive(Debug, Clone, Default)]
pub struct ComponentState {
    pub test: DatasetSlot,
    pub train: DatasetSlot,

    /// Position of the selected test record. Always `< test.len()` while the
    /// test set is non-empty; 0 otherwise.
    selected: usize,

    /// Colours for the labels of the current test set.
    pub color_map: ColorMap,

    /// Min-max scale the detail plot.
    pub minmax_scaling: bool,
}

impl ComponentState {
    fn slot_mut(&mut self, kind: DatasetKind) -> &mut DatasetSlot {
        match kind {
            DatasetKind::Test => &mut self.test,
            DatasetKind::Train => &mut self.train,
        }
    }

    /// The selected test record position, `None` while the test set is
    /// empty or not loaded.
    pub fn selected_index(&self) -> Option<usize> {
        (!self.test.is_empty()).then_some(self.selected)
    }

    /// Select a test record. Out-of-range positions are rejected and leave
    /// the current selection untouched.
    pub fn select_record(&mut self, index: usize) -> Result<usize, IndexOutOfRange> {
        let len = self.test.len();
        if index >= len {
            return Err(IndexOutOfRange { index, len });
        }
        self.selected = index;
        Ok(index)
    }

    /// Apply one event.
    pub fn apply(&mut self, event: Event) -> Result<(), IndexOutOfRange> {
        match event {
            Event::LoadStarted(kind) => {
                let slot = self.slot_mut(kind);
                slot.pending = true;
                slot.error = None;
            }
            Event::Loaded(kind, dataset) => {
                if kind == DatasetKind::Test {
                    self.color_map = ColorMap::new(&dataset.labels);
                }
                let slot = self.slot_mut(kind);
                slot.dataset = Some(dataset);
                slot.pending = false;
                slot.error = None;
                if kind == DatasetKind::Test {
                    self.clamp_selection();
                }
            }
            Event::LoadFailed(kind, message) => {
                let slot = self.slot_mut(kind);
                slot.pending = false;
                slot.error = Some(message);
            }
            Event::Select(index) => {
                self.select_record(index)?;
            }
            Event::SetScaling(on) => self.minmax_scaling = on,
        }
        Ok(())
    }

    /// Keep the selection inside a replaced test set: past-the-end positions
    /// move to the last record, an empty set resets to 0.
    fn clamp_selection(&mut self) {
        self.selected = self.selected.min(self.test.len().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Record;

    fn dataset(n: usize) -> Dataset {
        Dataset::from_records(
            (0..n)
                .map(|i| Record::new(vec![i as f64], i as i64))
                .collect(),
        )
    }

    #[test]
    fn starts_empty_with_no_selection() {
        let state = ComponentState::default();
        assert_eq!(state.test.status(), SlotStatus::Empty);
        assert_eq!(state.train.status(), SlotStatus::Empty);
        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn first_record_is_selected_by_default() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(3))).unwrap();
        assert_eq!(state.selected_index(), Some(0));
        assert_eq!(state.color_map.len(), 3);
    }

    #[test]
    fn loads_are_independent() {
        let mut state = ComponentState::default();
        state.apply(Event::LoadStarted(DatasetKind::Test)).unwrap();
        state.apply(Event::LoadStarted(DatasetKind::Train)).unwrap();
        state.apply(Event::Loaded(DatasetKind::Train, dataset(5))).unwrap();

        assert_eq!(state.test.status(), SlotStatus::Loading);
        assert_eq!(state.train.status(), SlotStatus::Loaded(5));
        assert_eq!(state.selected_index(), None);
    }

    #[test]
    fn valid_selection_is_stored() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(4))).unwrap();
        assert_eq!(state.select_record(2), Ok(2));
        assert_eq!(state.selected_index(), Some(2));
    }

    #[test]
    fn out_of_range_selection_is_rejected() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(2))).unwrap();
        state.select_record(1).unwrap();

        let err = state.apply(Event::Select(5)).unwrap_err();
        assert_eq!(err, IndexOutOfRange { index: 5, len: 2 });
        assert_eq!(state.selected_index(), Some(1));
    }

    #[test]
    fn selection_before_load_is_rejected() {
        let mut state = ComponentState::default();
        assert_eq!(
            state.select_record(0),
            Err(IndexOutOfRange { index: 0, len: 0 })
        );
    }

    #[test]
    fn shrinking_reload_clamps_to_last_record() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(10))).unwrap();
        state.select_record(8).unwrap();

        state.apply(Event::Loaded(DatasetKind::Test, dataset(3))).unwrap();
        assert_eq!(state.selected_index(), Some(2));
    }

    #[test]
    fn growing_reload_keeps_selection() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(3))).unwrap();
        state.select_record(1).unwrap();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(6))).unwrap();
        assert_eq!(state.selected_index(), Some(1));
    }

    #[test]
    fn empty_reload_clears_selection() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(3))).unwrap();
        state.select_record(2).unwrap();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(0))).unwrap();
        assert_eq!(state.selected_index(), None);

        state.apply(Event::Loaded(DatasetKind::Test, dataset(2))).unwrap();
        assert_eq!(state.selected_index(), Some(0));
    }

    #[test]
    fn reload_replaces_instead_of_appending() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Train, dataset(4))).unwrap();
        state.apply(Event::Loaded(DatasetKind::Train, dataset(2))).unwrap();
        assert_eq!(state.train.len(), 2);
    }

    #[test]
    fn failed_load_is_recorded_and_cleared_by_next_start() {
        let mut state = ComponentState::default();
        state.apply(Event::LoadStarted(DatasetKind::Test)).unwrap();
        state
            .apply(Event::LoadFailed(DatasetKind::Test, "boom".into()))
            .unwrap();
        assert_eq!(state.test.status(), SlotStatus::Failed("boom".into()));
        assert!(!state.test.pending);

        state.apply(Event::LoadStarted(DatasetKind::Test)).unwrap();
        assert_eq!(state.test.status(), SlotStatus::Loading);
    }

    #[test]
    fn failed_reload_keeps_previous_records() {
        let mut state = ComponentState::default();
        state.apply(Event::Loaded(DatasetKind::Test, dataset(3))).unwrap();
        state.apply(Event::LoadStarted(DatasetKind::Test)).unwrap();
        assert_eq!(state.test.status(), SlotStatus::Loaded(3));

        state
            .apply(Event::LoadFailed(DatasetKind::Test, "gone".into()))
            .unwrap();
        assert_eq!(state.test.len(), 3);
        assert_eq!(state.selected_index(), Some(0));
    }
}

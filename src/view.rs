//! Pure derivation of what the window shows from [`ComponentState`].
//!
//! Nothing here touches egui; `ui::*` paints a [`View`] and reports clicks
//! back as events.

use crate::data::model::RecordLabel;
use crate::inference::{AnomalyModel, ModelOutput};
use crate::state::{ComponentState, DatasetSlot, SlotStatus};

/// Header information for one dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct SlotView {
    pub status: SlotStatus,
    /// A load is in flight (possibly replacing loaded data).
    pub pending: bool,
}

impl SlotView {
    fn of(slot: &DatasetSlot) -> Self {
        Self {
            status: slot.status(),
            pending: slot.pending,
        }
    }
}

/// One clickable tile in the record list.
#[derive(Debug, Clone, PartialEq)]
pub struct RowView<'a> {
    pub position: usize,
    pub label: &'a RecordLabel,
    pub active: bool,
}

/// The selected record.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailView<'a> {
    pub position: usize,
    pub label: &'a RecordLabel,
    pub signal: &'a [f64],
}

#[derive(Debug, Clone, PartialEq)]
pub struct View<'a> {
    pub test: SlotView,
    pub train: SlotView,
    pub rows: Vec<RowView<'a>>,
    pub detail: Option<DetailView<'a>>,
    /// Name of the attached model, if any.
    pub model_name: Option<&'a str>,
    /// Output for the selected record; needs both a model and a selection.
    pub model_output: Option<ModelOutput>,
}

pub fn render<'a>(state: &'a ComponentState, model: Option<&'a dyn AnomalyModel>) -> View<'a> {
    let selected = state.selected_index();
    let records = state
        .test
        .dataset
        .as_ref()
        .map(|ds| ds.records.as_slice())
        .unwrap_or_default();

    let rows = records
        .iter()
        .enumerate()
        .map(|(position, record)| RowView {
            position,
            label: &record.index,
            active: selected == Some(position),
        })
        .collect();

    let selected_record = selected.and_then(|i| records.get(i).map(|r| (i, r)));

    let detail = selected_record.map(|(position, record)| DetailView {
        position,
        label: &record.index,
        signal: &record.data,
    });

    let model_output = model
        .zip(selected_record)
        .map(|(model, (_, record))| model.evaluate(record, state.train.dataset.as_ref()));

    View {
        test: SlotView::of(&state.test),
        train: SlotView::of(&state.train),
        rows,
        detail,
        model_name: model.map(|m| m.name()),
        model_output,
    }
}

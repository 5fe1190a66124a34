use crate::data::model::DatasetKind;

pub mod panels;
pub mod plot;

/// What the user asked for during one frame. Panels only read the view and
/// push actions; the app turns them into state events and loads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Select(usize),
    Open(DatasetKind),
    Reload,
    SetScaling(bool),
}

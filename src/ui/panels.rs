use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use super::{plot, Action};
use crate::color::ColorMap;
use crate::data::model::DatasetKind;
use crate::state::SlotStatus;
use crate::view::{SlotView, View};

pub const APP_TITLE: &str = "Anomaly Playground";

/// Label legends longer than this are not shown (ids rather than classes).
const MAX_LEGEND_ENTRIES: usize = 12;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, view: &View, minmax_scaling: bool, actions: &mut Vec<Action>) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open test set…").clicked() {
                actions.push(Action::Open(DatasetKind::Test));
                ui.close_menu();
            }
            if ui.button("Open train set…").clicked() {
                actions.push(Action::Open(DatasetKind::Train));
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                actions.push(Action::Reload);
                ui.close_menu();
            }
        });

        ui.separator();
        slot_label(ui, "test", &view.test);
        ui.separator();
        slot_label(ui, "train", &view.train);
        ui.separator();

        if ui
            .selectable_label(minmax_scaling, "Min-Max Scaling")
            .clicked()
        {
            actions.push(Action::SetScaling(!minmax_scaling));
        }

        for (name, slot) in [("test", &view.test), ("train", &view.train)] {
            if let SlotStatus::Failed(msg) = &slot.status {
                let text = format!("Error loading {name} set: {msg}");
                ui.label(RichText::new(text).color(Color32::RED));
            }
        }
    });
}

fn slot_label(ui: &mut Ui, name: &str, slot: &SlotView) {
    let text = match &slot.status {
        SlotStatus::Empty => format!("{name}: not loaded"),
        SlotStatus::Loading => format!("{name}: loading"),
        SlotStatus::Loaded(n) => format!("{name}: {n} records"),
        SlotStatus::Failed(_) => format!("{name}: failed"),
    };
    ui.label(text);
    if slot.pending {
        ui.spinner();
    }
}

// ---------------------------------------------------------------------------
// Header
// ---------------------------------------------------------------------------

pub fn intro(ui: &mut Ui) {
    ui.add_space(6.0);
    ui.heading("Anomaly Detection");
    ui.add_space(4.0);
    ui.label(format!(
        "{APP_TITLE} is an interactive visualization tool for exploring deep learning \
         models applied to the task of anomaly detection (on non-time series data)."
    ));
    ui.add_space(8.0);
    ui.heading("ECG Dataset");
    ui.separator();
}

// ---------------------------------------------------------------------------
// Record list
// ---------------------------------------------------------------------------

/// One tile per test record; clicking a tile selects it.
pub fn record_list(ui: &mut Ui, view: &View, colors: &ColorMap, actions: &mut Vec<Action>) {
    ui.strong(format!("ECG {}", view.rows.len()));
    ui.add_space(4.0);

    match &view.test.status {
        SlotStatus::Empty => {
            ui.label("No test data loaded.");
            return;
        }
        SlotStatus::Loading => {
            ui.horizontal(|ui: &mut Ui| {
                ui.spinner();
                ui.label("Loading test data…");
            });
            return;
        }
        _ => {}
    }

    if !colors.is_empty() && colors.len() <= MAX_LEGEND_ENTRIES {
        ui.horizontal_wrapped(|ui: &mut Ui| {
            for (label, color) in colors.legend_entries() {
                ui.label(RichText::new(format!("■ {label}")).color(color));
            }
        });
        ui.add_space(4.0);
    }

    ScrollArea::vertical()
        .id_salt("record_list")
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for row in &view.rows {
                    let text = RichText::new(format!("{:>3}", row.position))
                        .monospace()
                        .color(colors.color_for(row.label));
                    let response = ui
                        .selectable_label(row.active, text)
                        .on_hover_text(format!("index {}", row.label));
                    if response.clicked() {
                        actions.push(Action::Select(row.position));
                    }
                }
            });
        });
}

// ---------------------------------------------------------------------------
// Model / Model Output
// ---------------------------------------------------------------------------

pub fn model_panel(ui: &mut Ui, view: &View) {
    ui.strong("Model");
    ui.add_space(4.0);
    match view.model_name {
        Some(name) => {
            ui.label(name);
        }
        None => {
            ui.weak("No model attached.");
        }
    }
}

pub fn output_panel(ui: &mut Ui, view: &View, colors: &ColorMap, minmax_scaling: bool) {
    ui.strong("Model Output");
    ui.add_space(4.0);

    let Some(detail) = &view.detail else {
        return;
    };

    ui.label(RichText::new(detail.label.to_string()).strong().size(18.0));
    ui.label(format!(
        "record #{} · {} samples",
        detail.position,
        detail.signal.len()
    ));

    if let Some(out) = &view.model_output {
        let verdict = if out.is_anomaly() {
            RichText::new("anomaly").color(Color32::RED)
        } else {
            RichText::new("normal").color(Color32::GREEN)
        };
        ui.horizontal(|ui: &mut Ui| {
            ui.label(format!("score {:.4} (threshold {:.4})", out.score, out.threshold));
            ui.label(verdict);
        });
    }

    ui.add_space(4.0);
    plot::signal_plot(ui, view, colors.color_for(detail.label), minmax_scaling);
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn pick_dataset_file(kind: DatasetKind) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title(format!("Open {kind} set"))
        .add_filter("Supported files", &["json", "csv", "parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}

use eframe::egui::{Color32, Ui};
use egui_plot::{Legend, Line, Plot, PlotPoints};

use crate::view::{DetailView, View};

// ---------------------------------------------------------------------------
// Signal plot (detail panel)
// ---------------------------------------------------------------------------

/// Render the selected record's signal, with the model reconstruction on top
/// when one is available.
pub fn signal_plot(ui: &mut Ui, view: &View, color: Color32, minmax_scaling: bool) {
    let Some(detail) = &view.detail else {
        return;
    };

    let signal = scaled(detail.signal, minmax_scaling);
    let reconstruction = view
        .model_output
        .as_ref()
        .and_then(|out| out.reconstruction.as_deref())
        .map(|r| scaled(r, minmax_scaling));

    Plot::new("signal_plot")
        .legend(Legend::default())
        .x_axis_label("Sample")
        .y_axis_label(if minmax_scaling { "Scaled value" } else { "Value" })
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .height(ui.available_height().max(160.0))
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(to_points(&signal))
                    .name(signal_name(detail))
                    .color(color)
                    .width(1.5),
            );
            if let Some(rec) = &reconstruction {
                plot_ui.line(
                    Line::new(to_points(rec))
                        .name("reconstruction")
                        .color(Color32::LIGHT_GRAY)
                        .width(1.0),
                );
            }
        });
}

fn signal_name(detail: &DetailView) -> String {
    format!("#{} ({})", detail.position, detail.label)
}

fn to_points(values: &[f64]) -> PlotPoints {
    values
        .iter()
        .enumerate()
        .map(|(i, &v)| [i as f64, v])
        .collect()
}

/// Optionally rescale values to `[0, 1]`; a flat signal maps to all zeros.
pub fn scaled(values: &[f64], minmax_scaling: bool) -> Vec<f64> {
    if !minmax_scaling {
        return values.to_vec();
    }
    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;
    if !range.is_finite() || range.abs() < f64::EPSILON {
        vec![0.0; values.len()]
    } else {
        values.iter().map(|&v| (v - min) / range).collect()
    }
}

use eframe::egui;
use egui_extras::{Size, StripBuilder};

use crate::config::Config;
use crate::data::loader::ResourceSource;
use crate::data::model::DatasetKind;
use crate::data::task::LoadTask;
use crate::inference::AnomalyModel;
use crate::state::{ComponentState, Event};
use crate::ui::{panels, Action};
use crate::view;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VizApp {
    pub state: ComponentState,
    config: Config,
    model: Option<Box<dyn AnomalyModel>>,
    test_task: Option<LoadTask>,
    train_task: Option<LoadTask>,
}

impl VizApp {
    /// Create the app and start loading both datasets.
    pub fn new(config: Config) -> Self {
        let mut app = Self {
            state: ComponentState::default(),
            config,
            model: None,
            test_task: None,
            train_task: None,
        };
        app.reload();
        app
    }

    /// Attach an anomaly model to the Model panels.
    #[cfg(test)]
    pub fn with_model(mut self, model: Box<dyn AnomalyModel>) -> Self {
        self.model = Some(model);
        self
    }

    /// (Re)load both datasets from their configured locations.
    pub fn reload(&mut self) {
        for kind in [DatasetKind::Test, DatasetKind::Train] {
            let source = self.config.resource(kind);
            self.start_load(kind, source);
        }
    }

    /// Start loading `kind` from `source`. A load already running for the
    /// same dataset is cancelled; its result will never reach the state.
    pub fn start_load(&mut self, kind: DatasetKind, source: ResourceSource) {
        log::info!("loading {kind} set from {source}");
        *self.task_mut(kind) = Some(LoadTask::spawn(kind, source));
        self.dispatch(Event::LoadStarted(kind));
    }

    fn task_mut(&mut self, kind: DatasetKind) -> &mut Option<LoadTask> {
        match kind {
            DatasetKind::Test => &mut self.test_task,
            DatasetKind::Train => &mut self.train_task,
        }
    }

    fn loading(&self) -> bool {
        self.test_task.is_some() || self.train_task.is_some()
    }

    /// Turn finished loads into events.
    fn poll_tasks(&mut self) {
        for kind in [DatasetKind::Test, DatasetKind::Train] {
            let slot = self.task_mut(kind);
            let Some(result) = slot.as_mut().and_then(LoadTask::poll) else {
                continue;
            };
            let source = slot.take().map(|t| t.source().to_string()).unwrap_or_default();

            let event = match result {
                Ok(dataset) => {
                    log::info!("loaded {} {kind} records from {source}", dataset.len());
                    Event::Loaded(kind, dataset)
                }
                Err(e) => {
                    log::error!("failed to load {kind} set from {source}: {e}");
                    Event::LoadFailed(kind, e.to_string())
                }
            };
            self.dispatch(event);
        }
    }

    fn dispatch(&mut self, event: Event) {
        if let Err(e) = self.state.apply(event) {
            log::warn!("ignoring selection: {e}");
        }
    }

    fn handle(&mut self, action: Action) {
        match action {
            Action::Select(i) => self.dispatch(Event::Select(i)),
            Action::SetScaling(on) => self.dispatch(Event::SetScaling(on)),
            Action::Reload => self.reload(),
            Action::Open(kind) => {
                if let Some(path) = panels::pick_dataset_file(kind) {
                    self.start_load(kind, ResourceSource::File(path));
                }
            }
        }
    }
}

impl eframe::App for VizApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_tasks();
        if self.loading() {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }

        let mut actions = Vec::new();
        {
            let view = view::render(&self.state, self.model.as_deref());
            let colors = &self.state.color_map;
            let scaling = self.state.minmax_scaling;

            // ---- Top panel: menu bar ----
            egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
                panels::top_bar(ui, &view, scaling, &mut actions);
            });

            // ---- Central panel: records | model | output ----
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::intro(ui);
                StripBuilder::new(ui)
                    .size(Size::relative(0.4))
                    .size(Size::relative(0.2))
                    .size(Size::remainder())
                    .horizontal(|mut strip| {
                        strip.cell(|ui| panels::record_list(ui, &view, colors, &mut actions));
                        strip.cell(|ui| panels::model_panel(ui, &view));
                        strip.cell(|ui| panels::output_panel(ui, &view, colors, scaling));
                    });
            });
        }

        for action in actions {
            self.handle(action);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::SlotStatus;

    fn wait_for_loads(app: &mut VizApp) {
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(10);
        while app.loading() && std::time::Instant::now() < deadline {
            app.poll_tasks();
            std::thread::sleep(std::time::Duration::from_millis(5));
        }
    }

    fn write_sets(dir: &std::path::Path, test: &str, train: &str) {
        let ecg = dir.join("data/ecg");
        std::fs::create_dir_all(&ecg).unwrap();
        std::fs::write(ecg.join("test_small.json"), test).unwrap();
        std::fs::write(ecg.join("train_small.json"), train).unwrap();
    }

    #[test]
    fn startup_loads_both_sets() {
        let dir = tempfile::tempdir().unwrap();
        write_sets(
            dir.path(),
            r#"[{"data":[1,2,3],"index":"A"},{"data":[4,5,6],"index":"B"}]"#,
            r#"[{"data":[0],"index":0}]"#,
        );

        let mut app = VizApp::new(Config::with_base(dir.path().to_string_lossy()));
        wait_for_loads(&mut app);

        assert_eq!(app.state.test.status(), SlotStatus::Loaded(2));
        assert_eq!(app.state.train.status(), SlotStatus::Loaded(1));

        app.handle(Action::Select(1));
        let view = view::render(&app.state, None);
        assert_eq!(view.detail.unwrap().label.to_string(), "B");
    }

    #[test]
    fn missing_files_become_failed_slots() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = VizApp::new(Config::with_base(dir.path().to_string_lossy()));
        wait_for_loads(&mut app);

        assert!(matches!(app.state.test.status(), SlotStatus::Failed(_)));
        assert!(matches!(app.state.train.status(), SlotStatus::Failed(_)));
        assert!(view::render(&app.state, None).rows.is_empty());
    }

    #[test]
    fn out_of_range_click_keeps_selection() {
        let dir = tempfile::tempdir().unwrap();
        write_sets(dir.path(), r#"[{"data":[1],"index":"A"}]"#, "[]");

        let mut app = VizApp::new(Config::with_base(dir.path().to_string_lossy()));
        wait_for_loads(&mut app);

        app.handle(Action::Select(3));
        assert_eq!(app.state.selected_index(), Some(0));
    }

    #[test]
    fn newer_load_supersedes_pending_one() {
        let dir = tempfile::tempdir().unwrap();
        write_sets(dir.path(), r#"[{"data":[1],"index":"A"}]"#, "[]");
        let shorter = dir.path().join("other.json");
        std::fs::write(&shorter, "[]").unwrap();

        let mut app = VizApp::new(Config::with_base(dir.path().to_string_lossy()));
        app.start_load(DatasetKind::Test, ResourceSource::File(shorter));
        wait_for_loads(&mut app);

        assert_eq!(app.state.test.status(), SlotStatus::Loaded(0));
        assert_eq!(app.state.selected_index(), None);
    }

    struct LengthModel;

    impl AnomalyModel for LengthModel {
        fn name(&self) -> &str {
            "length"
        }

        fn evaluate(
            &self,
            record: &crate::data::model::Record,
            _train: Option<&crate::data::model::Dataset>,
        ) -> crate::inference::ModelOutput {
            crate::inference::ModelOutput {
                score: record.data.len() as f64,
                threshold: 2.0,
                reconstruction: Some(record.data.clone()),
            }
        }
    }

    #[test]
    fn attached_model_scores_selected_record() {
        let dir = tempfile::tempdir().unwrap();
        write_sets(dir.path(), r#"[{"data":[1,2,3],"index":"A"}]"#, "[]");

        let mut app = VizApp::new(Config::with_base(dir.path().to_string_lossy()))
            .with_model(Box::new(LengthModel));
        wait_for_loads(&mut app);

        let view = view::render(&app.state, app.model.as_deref());
        assert_eq!(view.model_name, Some("length"));
        let out = view.model_output.unwrap();
        assert!(out.is_anomaly());
        assert_eq!(out.reconstruction.as_deref(), Some(&[1.0, 2.0, 3.0][..]));
    }
}

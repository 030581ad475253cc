use eframe::egui;
use egui::{Color32, Key, RichText, TextureHandle};
use rand::rngs::StdRng;
use std::fmt::Display;
use std::path::PathBuf;
use tracing::{error, info, warn};

use crate::figure::{self, Figure};
use crate::labels::{ChecklistLabel, LabelScheme, Verdict};
use crate::workflow::{Command, Outcome, Workflow};

const NUM_KEYS: [Key; 8] = [
    Key::Num1,
    Key::Num2,
    Key::Num3,
    Key::Num4,
    Key::Num5,
    Key::Num6,
    Key::Num7,
    Key::Num8,
];

/// A figure on screen plus the texture last uploaded for it.
struct Shown {
    figure: Figure,
    texture: Option<TextureHandle>,
    fitted_to: (u32, u32),
}

impl Shown {
    fn new(figure: Figure) -> Self {
        Self { figure, texture: None, fitted_to: (0, 0) }
    }

    /// Re-uploads the texture when the target box changed.
    fn fit(&mut self, ctx: &egui::Context, bounds: (u32, u32)) -> Result<(), figure::FigureError> {
        if self.texture.is_some() && self.fitted_to == bounds {
            return Ok(());
        }
        let rgba = self.figure.scaled(bounds)?;
        let image = figure::to_color_image(&rgba);
        let name = self.figure.path.to_string_lossy().to_string();
        self.texture = Some(ctx.load_texture(name, image, egui::TextureOptions::LINEAR));
        self.fitted_to = bounds;
        Ok(())
    }
}

/// Window adapter: turns clicks and keys into workflow commands.
pub struct InspectorApp {
    workflow: Workflow,
    rng: StdRng,
    scheme: LabelScheme,
    compare_dir: Option<PathBuf>,
    // input fields
    comment: String,
    checked: Vec<bool>,
    new_log_path: String,
    box_w: String,
    box_h: String,
    // display
    generation: u64,
    shown_key: Option<(u64, usize)>,
    shown: Option<Shown>,
    compare: Option<Shown>,
    showing_compare: bool,
    status: String,
}

impl InspectorApp {
    pub fn new(
        workflow: Workflow,
        scheme: LabelScheme,
        rng: StdRng,
        compare_dir: Option<PathBuf>,
        fixed_box: Option<(u32, u32)>,
    ) -> Self {
        let checked = match &scheme {
            LabelScheme::Checklist(boxes) => vec![false; boxes.len()],
            LabelScheme::Buttons(_) => vec![],
        };
        let (box_w, box_h) = fixed_box
            .map(|(w, h)| (w.to_string(), h.to_string()))
            .unwrap_or_default();
        Self {
            workflow,
            rng,
            scheme,
            compare_dir,
            comment: String::new(),
            checked,
            new_log_path: String::new(),
            box_w,
            box_h,
            generation: 0,
            shown_key: None,
            shown: None,
            compare: None,
            showing_compare: false,
            status: "Open a log or create a new one to start.".to_owned(),
        }
    }

    /// Single sink for everything that goes wrong while the window is up.
    fn report(&mut self, err: impl Display) {
        error!("{}", err);
        self.status = format!("Error: {}", err);
    }

    pub fn dispatch(&mut self, cmd: Command) -> Option<Outcome> {
        let workflow = std::mem::take(&mut self.workflow);
        let (workflow, result) = workflow.handle(cmd, &mut self.rng);
        self.workflow = workflow;
        match result {
            Ok(outcome) => {
                self.note(&outcome);
                Some(outcome)
            }
            Err(e) => {
                self.report(e);
                None
            }
        }
    }

    fn note(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Started { total, remaining } => {
                self.generation += 1;
                self.load_inputs();
                if let Some(p) = &self.workflow.log_path {
                    self.new_log_path = p.to_string_lossy().to_string();
                }
                self.status = format!("{} figures, {} left to classify", total, remaining);
            }
            Outcome::CatalogSelected { entries } => {
                self.status = format!("Catalog with {} entries; applies to the next log", entries);
            }
            Outcome::Recorded { id, save_error } => {
                self.load_inputs();
                self.status = format!("Recorded {}", id);
                if let Some(e) = save_error {
                    self.report(format!("recorded {} but autosave failed: {}", id, e));
                }
            }
            Outcome::Moved { from, to } if from == to => {
                self.status = "Cannot move any further".to_owned();
            }
            Outcome::Moved { .. } => self.load_inputs(),
            Outcome::Saved { rows } => {
                self.status = format!("Saved {} rows", rows);
            }
        }
    }

    /// Fills comment and checkboxes from the decision under the cursor, or clears them.
    fn load_inputs(&mut self) {
        let decision = self
            .workflow
            .session
            .as_ref()
            .and_then(|s| s.current())
            .map(|e| e.decision.clone())
            .unwrap_or_default();
        self.comment = decision.comment;
        self.checked = self.scheme.checked_boxes(&decision.label);
    }

    fn record(&mut self, label: String) {
        let comment = self.comment.trim().to_owned();
        self.dispatch(Command::Record { label, comment });
    }

    /// Loads the figure under the cursor, skipping over ones that fail to display.
    fn sync_display(&mut self) {
        loop {
            let Some(session) = self.workflow.session.as_ref() else {
                self.shown = None;
                self.shown_key = None;
                return;
            };
            let Some(entry) = session.current() else {
                self.shown = None;
                return;
            };
            let key = (self.generation, session.current_index());
            if self.shown_key == Some(key) {
                return;
            }
            let path = entry.item.path.clone();

            self.shown_key = Some(key);
            self.compare = None;
            match Figure::open(&path) {
                Ok(fig) => {
                    self.shown = Some(Shown::new(fig));
                    return;
                }
                Err(e) => {
                    self.shown = None;
                    let moved = self.dispatch(Command::Skip);
                    self.report(e);
                    match moved {
                        Some(Outcome::Moved { from, to }) if from != to => continue,
                        _ => return,
                    }
                }
            }
        }
    }

    fn load_compare(&mut self) {
        if self.compare.is_some() {
            return;
        }
        let Some(dir) = &self.compare_dir else { return };
        let Some(name) = self.shown.as_ref().and_then(|s| s.figure.path.file_name()) else {
            return;
        };
        let path = dir.join(name);
        match Figure::open(&path) {
            Ok(fig) => self.compare = Some(Shown::new(fig)),
            Err(e) => {
                warn!("No comparison figure for {}", path.display());
                self.report(e);
                self.showing_compare = false;
            }
        }
    }

    fn fixed_box(&self) -> Option<(u32, u32)> {
        let w = self.box_w.trim().parse::<u32>().ok()?;
        let h = self.box_h.trim().parse::<u32>().ok()?;
        Some((w, h))
    }

    fn can_record(&self) -> bool {
        let finished = self.workflow.session.as_ref().map_or(true, |s| s.is_finished());
        self.shown.is_some() && !finished
    }

    fn header_text(&self) -> String {
        let Some(session) = &self.workflow.session else {
            return "No log selected".to_owned();
        };
        let current = session.current().map(|e| e.item.id.as_str()).unwrap_or("-");
        let previous = session.previous_id().unwrap_or("-");
        let done = session.len() - session.remaining();
        format!("previous: {}  current: {}   [{}/{} classified]", previous, current, done, session.len())
    }

    fn label_controls(&mut self, ui: &mut egui::Ui) {
        let enabled = self.can_record();
        match self.scheme.clone() {
            LabelScheme::Buttons(labels) => {
                ui.horizontal_wrapped(|ui| {
                    for (i, label) in labels.iter().enumerate() {
                        let text = if i < self.scheme.shortcut_count() {
                            format!("{} [{}]", label, i + 1)
                        } else {
                            label.clone()
                        };
                        if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                            self.record(label.clone());
                        }
                    }
                });
            }
            LabelScheme::Checklist(boxes) => {
                for (b, on) in boxes.iter().zip(self.checked.iter_mut()) {
                    ui.checkbox(on, b.as_str());
                }
                ui.horizontal(|ui| {
                    for verdict in [Verdict::Success, Verdict::Failure] {
                        let text = format!("{:?}", verdict);
                        if ui.add_enabled(enabled, egui::Button::new(text)).clicked() {
                            let label = ChecklistLabel::from_boxes(verdict, &boxes, &self.checked);
                            self.record(label.to_label());
                        }
                    }
                });
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.wants_keyboard_input() || !self.can_record() {
            return;
        }
        let LabelScheme::Buttons(labels) = &self.scheme else { return };
        let n = self.scheme.shortcut_count();
        let pressed = NUM_KEYS[..n]
            .iter()
            .position(|k| ctx.input(|input| input.key_pressed(*k)));
        if let Some(i) = pressed {
            let label = labels[i].clone();
            self.record(label);
        }
    }

    fn side_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::left("left_panel").show(ctx, |ui| {
            ui.vertical(|ui| {
                ui.heading("Log");
                if ui.button("Open log…").clicked() {
                    if let Some(path) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                        self.dispatch(Command::OpenLog(path));
                    }
                }
                ui.horizontal(|ui| {
                    ui.text_edit_singleline(&mut self.new_log_path);
                    if ui.button("New log").clicked() {
                        let path = self.new_log_path.trim().to_owned();
                        if path.is_empty() {
                            self.report("enter a path for the new log");
                        } else {
                            self.dispatch(Command::NewLog(PathBuf::from(path)));
                        }
                    }
                });
                if ui.button("Catalog…").clicked() {
                    if let Some(path) = rfd::FileDialog::new().add_filter("CSV", &["csv"]).pick_file() {
                        self.dispatch(Command::SelectCatalog(path));
                    }
                }

                ui.separator();
                ui.heading("Classify");
                self.label_controls(ui);
                ui.horizontal(|ui| {
                    ui.label("Comment");
                    ui.text_edit_singleline(&mut self.comment);
                });
                if ui.button("Go back").clicked() {
                    self.dispatch(Command::GoBack);
                }

                if let Some(session) = &self.workflow.session {
                    egui::CollapsingHeader::new("This session").show(ui, |ui| {
                        egui::ScrollArea::vertical().max_height(240.0).show(ui, |ui| {
                            let upto = (session.current_index() + 1).min(session.len());
                            for (i, e) in session.entries()[session.start_index()..upto].iter().enumerate() {
                                let here = session.start_index() + i == session.current_index();
                                let text = if e.decision.is_labeled() {
                                    format!("{}: {}", e.item.id, self.scheme.describe(&e.decision.label))
                                } else {
                                    e.item.id.clone()
                                };
                                let _ = ui.selectable_label(here, text);
                            }
                        });
                    });
                }

                ui.separator();
                ui.label("Resize to (w × h):");
                ui.horizontal(|ui| {
                    ui.add(egui::TextEdit::singleline(&mut self.box_w).desired_width(50.0));
                    ui.add(egui::TextEdit::singleline(&mut self.box_h).desired_width(50.0));
                });
                if self.compare_dir.is_some() {
                    let text = if self.showing_compare { "Show primary" } else { "Show comparison" };
                    if ui.button(text).clicked() {
                        self.showing_compare = !self.showing_compare;
                    }
                }

                ui.separator();
                ui.horizontal(|ui| {
                    if ui.button("Save").clicked() {
                        self.dispatch(Command::Save);
                    }
                    if ui.button("Save & Quit").clicked() {
                        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
                    }
                });
            });
        });
    }

    fn central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(RichText::new(self.header_text()).strong());
            if let Some(d) = self
                .workflow
                .session
                .as_ref()
                .and_then(|s| s.current())
                .map(|e| &e.decision)
                .filter(|d| d.is_labeled())
            {
                ui.label(format!("Recorded: {} {}", self.scheme.describe(&d.label), d.comment));
            }

            let Some(session) = &self.workflow.session else { return };
            if session.is_empty() {
                ui.label("No figures to classify.");
                return;
            }
            if session.is_finished() {
                ui.label("All figures classified.");
                return;
            }

            let available = ui.available_size();
            let bounds = self
                .fixed_box()
                .unwrap_or((available.x.max(0.0) as u32, (available.y - 10.0).max(0.0) as u32));

            if self.showing_compare {
                self.load_compare();
            }
            let target = if self.showing_compare { self.compare.as_mut() } else { self.shown.as_mut() };
            let Some(shown) = target else {
                ui.label("Figure could not be displayed.");
                return;
            };
            if let Err(e) = shown.fit(ctx, bounds) {
                self.report(e);
                return;
            }
            if let Some(tex) = &shown.texture {
                ui.add(egui::Image::new(tex).fit_to_exact_size(tex.size_vec2()));
            }
        });
    }
}

impl eframe::App for InspectorApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_display();
        self.handle_shortcuts(ctx);
        self.sync_display();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            let color = if self.status.starts_with("Error") { Color32::LIGHT_RED } else { Color32::GRAY };
            ui.colored_label(color, &self.status);
        });
        self.side_panel(ctx);
        self.sync_display();
        self.central_panel(ctx);
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        match self.workflow.flush() {
            Ok(()) => info!("Session closed"),
            Err(e) => error!("Could not save log on exit: {}", e),
        }
    }
}

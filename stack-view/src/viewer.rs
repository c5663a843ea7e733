//! Interactive can stack viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which plays the host application: it
//! owns a small scene (a stack node with one can under it and a curve to
//! follow), edits the stack settings, evaluates the stack every frame and
//! draws the generated items in a side or top projection.

use std::ops::RangeInclusive;

use eframe::App;
use glam::{Vec2, Vec3};
use log::{info, warn};
use rand::{Rng, rng};
use stack_core::{
    config::StackSettings,
    dependency::RevisionTracker,
    error::Result,
    mesh::Mesh,
    object::StackObject,
    path::{CubicBezier, PathCurve, Spline},
    scene::{NodeKind, Scene},
    types::NodeId,
};

const CAN_RADIUS: f32 = 12.0;
const CAN_HEIGHT: f32 = 20.0;
const PATH_SAMPLES: usize = 64;

/// Plane the scene is projected onto. The longitudinal axis `Z` is
/// always horizontal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ViewPlane {
    /// Looking along `X`: rows stack upwards.
    Side,
    /// Looking down `Y`: shows the path and the lateral jitter.
    Top,
}

impl ViewPlane {
    fn project(self, p: Vec3) -> Vec2 {
        match self {
            ViewPlane::Side => Vec2::new(p.z, p.y),
            ViewPlane::Top => Vec2::new(p.z, p.x),
        }
    }

    fn label(self) -> &'static str {
        match self {
            ViewPlane::Side => "Side (Z/Y)",
            ViewPlane::Top => "Top (Z/X)",
        }
    }
}

fn demo_curve() -> CubicBezier {
    CubicBezier::new(
        Vec3::ZERO,
        Vec3::new(80.0, 0.0, 40.0),
        Vec3::new(-80.0, 0.0, 120.0),
        Vec3::new(0.0, 0.0, 160.0),
    )
}

/// Main application state for the interactive viewer.
///
/// ### Fields
/// - `scene` - Host scene holding the stack node, its can and the path.
/// - `tracker` - Dependency list of the stack between evaluations.
/// - `stack` - The stack generator node.
/// - `settings` - Settings as edited in the side panel.
///
/// - `source` - The can under the stack node.
/// - `path` - Curve node the stack can follow.
/// - `use_path` - Whether the stack is linked to `path`.
///
/// - `container` - Result of the last evaluation.
/// - `last_error` - Message of the last failed evaluation, if the latest
///   one failed.
///
/// - `plane` - Projection used by the canvas.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
pub struct Viewer {
    scene: Scene,
    tracker: RevisionTracker,
    stack: StackObject,
    settings: StackSettings,

    source: NodeId,
    path: NodeId,
    use_path: bool,

    container: Option<NodeId>,
    last_error: Option<String>,

    plane: ViewPlane,
    zoom: f32,
    pan: egui::Vec2,
}

impl Viewer {
    /// Builds the demo scene and evaluates the stack once.
    ///
    /// ### Returns
    /// - `Err` if a scene node could not be created.
    pub fn new(settings: StackSettings) -> Result<Self> {
        let mut scene = Scene::new();
        let op = scene.add_node("Can Stack", NodeKind::Null)?;
        let source = scene.add_node(
            "Can",
            NodeKind::Mesh(Mesh::cylinder(CAN_RADIUS, CAN_HEIGHT, 16)),
        )?;
        scene.insert_under_last(op, source)?;
        let path = scene.add_node("Path", NodeKind::Spline(Spline::Bezier(demo_curve())))?;

        let mut viewer = Self {
            scene,
            tracker: RevisionTracker::new(),
            stack: StackObject::with_settings(op, settings.clone()),
            settings,
            source,
            path,
            use_path: false,
            container: None,
            last_error: None,
            plane: ViewPlane::Side,
            zoom: 3.0,
            pan: egui::vec2(-150.0, 60.0),
        };
        viewer.refresh();
        Ok(viewer)
    }

    /// Pushes the edited settings to the stack and evaluates it.
    fn rebuild(&mut self) -> Result<Option<NodeId>> {
        let mut settings = self.settings.clone();
        settings.base_path = self.use_path.then_some(self.path);
        self.stack.set_settings(&mut self.scene, settings)?;
        // Show the validated values.
        self.settings = self.stack.settings().clone();
        self.stack.evaluate(&mut self.scene, &mut self.tracker)
    }

    fn refresh(&mut self) {
        match self.rebuild() {
            Ok(container) => {
                self.container = container;
                self.set_error(None);
            }
            Err(err) => {
                self.container = None;
                self.set_error(Some(err.to_string()));
            }
        }
    }

    /// Records the evaluation outcome, logging only transitions.
    fn set_error(&mut self, err: Option<String>) {
        if err == self.last_error {
            return;
        }
        match &err {
            Some(msg) => warn!("stack evaluation failed: {msg}"),
            None => info!("stack evaluation recovered"),
        }
        self.last_error = err;
    }

    fn fit_height(&mut self) {
        match self.stack.fit_row_height(&mut self.scene) {
            Ok(Some(height)) => {
                self.settings = self.stack.settings().clone();
                info!("row height fitted to {height:.2}");
            }
            Ok(None) => info!("nothing to fit the row height to"),
            Err(err) => self.set_error(Some(err.to_string())),
        }
    }

    fn randomize_seed(&mut self) {
        self.settings.random_seed = rng().random();
    }

    fn reset_settings(&mut self) {
        self.settings = StackSettings::default();
        self.use_path = false;
    }

    /// Number of deep copies and of references in the current result.
    fn item_counts(&self) -> (usize, usize) {
        let Some(container) = self.container else {
            return (0, 0);
        };
        self.scene
            .children(container)
            .iter()
            .fold((0, 0), |(copies, refs), &id| {
                if self.scene.instance_target(id).is_some() {
                    (copies, refs + 1)
                } else {
                    (copies + 1, refs)
                }
            })
    }

    /// Converts a projected world position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The vertical axis is flipped so
    /// that it points up on screen.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Inverse of [`Viewer::world_to_screen`].
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    /// Helper to draw a labeled numeric [`egui::DragValue`].
    fn labeled_drag<N: egui::emath::Numeric>(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut N,
        range: RangeInclusive<N>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel (view plane, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                for plane in [ViewPlane::Side, ViewPlane::Top] {
                    ui.selectable_value(&mut self.plane, plane, plane.label());
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (item counts, regenerations, errors).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        let (copies, refs) = self.item_counts();
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("regenerations = {}", self.stack.regenerations()));
                ui.separator();
                ui.label(format!("references = {refs}"));
                ui.label(format!("copies = {copies}"));
                if let Some(err) = &self.last_error {
                    ui.separator();
                    ui.colored_label(egui::Color32::LIGHT_RED, err.as_str());
                }
            });
        });
    }

    /// Builds the right-hand panel with the stack settings and commands.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Stack");

                ui.separator();
                ui.label("Layout");
                Self::labeled_drag(ui, "base count:", &mut self.settings.base_count, 0..=200, 0.1);
                ui.add_enabled_ui(self.settings.base_length_enabled(), |ui| {
                    Self::labeled_drag(
                        ui,
                        "base length:",
                        &mut self.settings.base_length,
                        0.0..=10_000.0,
                        1.0,
                    );
                });
                let max_rows = self.settings.base_count.max(1);
                Self::labeled_drag(
                    ui,
                    "row count:",
                    &mut self.settings.row_count,
                    1..=max_rows,
                    0.1,
                );
                Self::labeled_drag(
                    ui,
                    "row height:",
                    &mut self.settings.row_height,
                    0.0..=1_000.0,
                    0.5,
                );
                ui.checkbox(&mut self.settings.use_instancing, "Instances");
                ui.checkbox(&mut self.use_path, "Follow path");

                ui.separator();
                ui.label("Jitter");
                Self::labeled_drag(ui, "seed:", &mut self.settings.random_seed, 0..=u32::MAX, 1.0);
                ui.horizontal(|ui| {
                    ui.label("rotation:");
                    ui.drag_angle(&mut self.settings.random_rotation);
                });
                Self::labeled_drag(
                    ui,
                    "lateral:",
                    &mut self.settings.random_offset_lateral,
                    0.0..=1_000.0,
                    0.1,
                );
                Self::labeled_drag(
                    ui,
                    "longitudinal:",
                    &mut self.settings.random_offset_longitudinal,
                    0.0..=1_000.0,
                    0.1,
                );

                ui.separator();
                if ui.button("Fit height").clicked() {
                    self.fit_height();
                }
                if ui.button("Randomize seed").clicked() {
                    self.randomize_seed();
                }
                if ui.button("Reset settings").clicked() {
                    self.reset_settings();
                }
            });
    }

    fn draw_path(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(spline) = self.scene.spline(self.path) else {
            return;
        };
        let world = self.scene.world_transform(self.path);
        let points: Vec<egui::Pos2> = (0..=PATH_SAMPLES)
            .map(|i| {
                let t = i as f32 / PATH_SAMPLES as f32;
                let p = world.transform_point3(spline.point(t));
                self.world_to_screen(self.plane.project(p), rect)
            })
            .collect();
        painter.add(egui::Shape::line(
            points,
            egui::Stroke::new(1.5, egui::Color32::YELLOW),
        ));
    }

    /// Draws every generated item as an outline of the can plus a tick
    /// along its heading.
    fn draw_items(&self, painter: &egui::Painter, rect: egui::Rect) {
        let Some(container) = self.container else {
            return;
        };

        let op_world = self.scene.world_transform(self.stack.node());
        let (center, radius) = self
            .scene
            .hierarchy_bounds(self.source)
            .map_or((Vec3::ZERO, 1.0), |b| (b.center(), b.size().x * 0.5));
        let r = (radius * self.zoom).max(2.0);

        for &item in self.scene.children(container) {
            let Some(node) = self.scene.node(item) else {
                continue;
            };
            let m = op_world * node.local;
            let color = match node.kind {
                NodeKind::Instance { .. } => egui::Color32::ORANGE,
                _ => egui::Color32::LIGHT_BLUE,
            };

            let c = self.plane.project(m.transform_point3(center));
            let heading = self.plane.project(m.transform_vector3(Vec3::Z)).normalize_or_zero();
            let p = self.world_to_screen(c, rect);
            let tip = self.world_to_screen(c + heading * radius, rect);

            painter.circle_stroke(p, r, egui::Stroke::new(1.5, color));
            painter.line_segment([p, tip], egui::Stroke::new(1.0, color));
        }
    }

    /// Builds the central panel where the stack is drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            if self.use_path {
                self.draw_path(&painter, rect);
            }
            self.draw_items(&painter, rect);
        });
    }
}

impl App for Viewer {
    /// Builds all panels, evaluates the stack with the edited settings and
    /// draws the result.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.refresh();
        self.ui_central_panel(ctx);
    }
}

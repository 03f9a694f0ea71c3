//! Preview window: the engine drawn the way a dashboard shell would draw it

use std::collections::BTreeSet;
use std::sync::Arc;

use anyhow::{anyhow, Result};
use eframe::{egui, CreationContext, NativeOptions};
use tokio::sync::watch;
use tracing::{debug, error, info};

use super::components::capabilities;
use super::components::customizer::{self, CustomizerAction};
use super::components::nav_menu::NavMenu;
use super::constants::*;
use super::visuals;
use crate::breakpoint::Breakpoint;
use crate::config::{Configuration, Direction};
use crate::engine::{LayoutEngine, RenderContext};
use crate::hydration::{HydrationPhase, HydrationReconciler, Reconciliation};
use crate::layout::{Edge, SideNavMode, DOCKED_NAV_MIN};
use crate::navigation::{self, Capability};
use crate::theme::ThemeDescriptor;

struct StatusMessage {
    text: String,
    color: egui::Color32,
}

struct PreviewApp {
    engine: LayoutEngine,
    reconciler: HydrationReconciler,
    settings_changes: watch::Receiver<Arc<Configuration>>,
    available_capabilities: BTreeSet<Capability>,
    /// Theme currently installed in the egui context
    applied_theme: Option<Arc<ThemeDescriptor>>,
    drawer_open: bool,
    active_path: Option<String>,
    status_message: Option<StatusMessage>,
}

impl PreviewApp {
    fn new(_cc: &CreationContext<'_>, engine: LayoutEngine, reconciler: HydrationReconciler) -> Self {
        info!("Initializing preview window");
        let available_capabilities = navigation::capabilities_in(engine.tree());
        let settings_changes = engine.subscribe();
        Self {
            engine,
            reconciler,
            settings_changes,
            available_capabilities,
            applied_theme: None,
            drawer_open: false,
            active_path: None,
            status_message: None,
        }
    }

    /// The first frame paints the defaults exactly as a server would; the
    /// stored record is reconciled in on the frame after.
    fn begin_frame(&mut self, ctx: &egui::Context) -> RenderContext {
        match self.reconciler.phase() {
            HydrationPhase::AwaitingFirstRender => {
                ctx.request_repaint();
                return self.reconciler.first_render(&self.engine);
            }
            HydrationPhase::FirstRenderComplete => {
                self.status_message = match self.reconciler.reconcile(&mut self.engine) {
                    Reconciliation::Adopted { version } => Some(StatusMessage {
                        text: format!("Restored saved settings (v{version})"),
                        color: STATUS_OK,
                    }),
                    Reconciliation::Merged { version } => Some(StatusMessage {
                        text: format!("Restored saved settings with your recent changes (v{version})"),
                        color: STATUS_OK,
                    }),
                    Reconciliation::KeptDefaults => Some(StatusMessage {
                        text: "No saved settings; using defaults".to_string(),
                        color: STATUS_PENDING,
                    }),
                    _ => None,
                };
            }
            HydrationPhase::Reconciled => {}
        }

        self.engine.observe_viewport(f64::from(ctx.content_rect().width()));
        self.engine.render_context()
    }

    /// Repaint whenever the settings moved on, whoever changed them
    fn watch_settings(&mut self, ctx: &egui::Context) {
        if self.settings_changes.has_changed().unwrap_or(false) {
            let version = self.settings_changes.borrow_and_update().version;
            debug!(version, "Settings changed; scheduling repaint");
            ctx.request_repaint();
        }
    }

    fn apply_theme(&mut self, ctx: &egui::Context, theme: &Arc<ThemeDescriptor>) {
        if self
            .applied_theme
            .as_ref()
            .is_some_and(|applied| Arc::ptr_eq(applied, theme))
        {
            return;
        }
        ctx.set_visuals(visuals::visuals(theme));
        self.applied_theme = Some(theme.clone());
    }

    fn apply(&mut self, action: CustomizerAction) {
        match action {
            CustomizerAction::None => {}
            CustomizerAction::Update(patch) => match self.engine.update(&patch) {
                Ok(config) => {
                    self.status_message = Some(StatusMessage {
                        text: format!("Saved (v{})", config.version),
                        color: STATUS_OK,
                    });
                }
                Err(err) => {
                    error!(error = %err, "Settings change rejected");
                    self.status_message = Some(StatusMessage {
                        text: format!("Rejected: {err}"),
                        color: STATUS_ERROR,
                    });
                }
            },
            CustomizerAction::Reset => {
                let config = self.engine.reset();
                info!(version = config.version, "Settings reset from UI");
                self.status_message = Some(StatusMessage {
                    text: format!("Defaults restored (v{})", config.version),
                    color: STATUS_OK,
                });
            }
        }
    }

    fn nav_menu(&mut self, ui: &mut egui::Ui, context: &RenderContext, collapsed: bool) -> bool {
        ui.add_space(PADDING);
        NavMenu {
            palette: &context.theme.nav,
            collapsed,
            active_path: &mut self.active_path,
        }
        .ui(ui, &context.navigation)
    }
}

impl eframe::App for PreviewApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let context = self.begin_frame(ctx);
        self.apply_theme(ctx, &context.theme);

        let layout = context.layout;
        let overlay = layout.side_nav == SideNavMode::Overlay;
        if !overlay {
            self.drawer_open = false;
        }
        let narrow = self.engine.is_at_most(Breakpoint::Xs);
        let docked = self.engine.is_at_least(DOCKED_NAV_MIN);

        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            ui.add_space(PADDING / 2.0);
            ui.horizontal(|ui| {
                if overlay && ui.button("\u{2630}").clicked() {
                    self.drawer_open = !self.drawer_open;
                }
                if !narrow {
                    ui.heading(APP_TITLE);
                    ui.separator();
                }
                ui.label(format!(
                    "{} \u{00B7} {} px \u{00B7} v{}",
                    context.breakpoint.current, context.breakpoint.viewport_width, context.config.version
                ));
            });
            ui.add_space(PADDING / 2.0);
        });

        let nav_fill = visuals::color(context.theme.nav.background);
        if !overlay {
            let panel = match layout.nav_edge {
                Edge::Left => egui::SidePanel::left("side_nav"),
                Edge::Right => egui::SidePanel::right("side_nav"),
            };
            panel
                .resizable(false)
                .exact_width(layout.nav_width as f32)
                .frame(egui::Frame::side_top_panel(&ctx.style()).fill(nav_fill))
                .show(ctx, |ui| {
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        self.nav_menu(ui, &context, layout.side_nav == SideNavMode::Collapsed);
                    });
                });
        } else if self.drawer_open {
            let anchor = match layout.nav_edge {
                Edge::Left => egui::Align2::LEFT_TOP,
                Edge::Right => egui::Align2::RIGHT_TOP,
            };
            let mut open = true;
            let mut followed = false;
            egui::Window::new("Menu")
                .open(&mut open)
                .collapsible(false)
                .resizable(false)
                .default_width(DRAWER_WIDTH)
                .anchor(anchor, [0.0, 0.0])
                .frame(egui::Frame::window(&ctx.style()).fill(nav_fill))
                .show(ctx, |ui| {
                    followed = self.nav_menu(ui, &context, false);
                });
            // Following a link closes the drawer
            self.drawer_open = open && !followed;
        }

        let mut action = CustomizerAction::None;
        let mut identity_change = None;
        egui::CentralPanel::default().show(ctx, |ui| {
            let align = match context.theme.direction {
                Direction::Ltr => egui::Align::Min,
                Direction::Rtl => egui::Align::Max,
            };
            ui.with_layout(egui::Layout::top_down(align), |ui| {
                if let Some(max_width) = layout.content_max_width {
                    ui.set_max_width(max_width as f32);
                }
                egui::ScrollArea::vertical().show(ui, |ui| {
                    ui.add_space(PADDING);
                    ui.heading("Customizer");
                    if let Some(path) = &self.active_path {
                        ui.label(egui::RichText::new(format!("Viewing {path}")).weak());
                    }
                    ui.add_space(SECTION_SPACING);

                    action = customizer::ui(ui, &context.config, docked);

                    ui.add_space(SECTION_SPACING);
                    identity_change = capabilities::ui(ui, &self.available_capabilities, self.engine.identity());

                    ui.add_space(SECTION_SPACING);
                    ui.group(|ui| {
                        ui.label(egui::RichText::new("Current Layout").strong());
                        ui.label(format!(
                            "Navigation: {:?}, {:?} edge, {} px",
                            layout.side_nav, layout.nav_edge, layout.nav_width
                        ));
                        ui.label(format!("Menu type: {}", layout.menu_type));
                        match layout.content_max_width {
                            Some(max_width) => ui.label(format!("Content capped at {max_width} px")),
                            None => ui.label("Content uses the full width"),
                        };
                    });

                    if let Some(message) = &self.status_message {
                        ui.add_space(ITEM_SPACING);
                        ui.colored_label(message.color, &message.text);
                    }
                });
            });
        });

        self.apply(action);
        self.watch_settings(ctx);
        if let Some(identity) = identity_change {
            info!(capabilities = identity.capabilities.len(), "Preview identity changed");
            self.engine.set_identity(identity);
        }
    }

    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        info!(version = self.engine.config().version, "Preview exiting");
    }
}

pub fn run_gui(engine: LayoutEngine, reconciler: HydrationReconciler) -> Result<()> {
    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([WINDOW_WIDTH, WINDOW_HEIGHT])
            .with_min_inner_size([WINDOW_MIN_WIDTH, WINDOW_MIN_HEIGHT])
            .with_title(APP_TITLE),
        ..Default::default()
    };

    eframe::run_native(
        APP_TITLE,
        options,
        Box::new(move |cc| Ok(Box::new(PreviewApp::new(cc, engine, reconciler)))),
    )
    .map_err(|err| anyhow!("Failed to launch preview window: {err}"))
}

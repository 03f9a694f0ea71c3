//! Command line surface
//!
//! Every subcommand drives a `LayoutEngine` the same way a UI would: defaults
//! first, then the stored record reconciled in, then the requested operation.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use crate::breakpoint::{BreakpointBounds, BreakpointResolver, BreakpointState};
use crate::config::{ConfigContainer, ConfigPatch, Configuration, Field};
use crate::engine::{LayoutEngine, RenderContext};
use crate::gui;
use crate::hydration::HydrationReconciler;
use crate::layout::Layout;
use crate::navigation::{self, Identity, NavEntry, NavNode};
use crate::store::{BackgroundWriter, FileBackend, MemoryBackend, PersistentStore, StorageBackend};
use crate::theme::ThemeDescriptor;

#[derive(Debug, Parser)]
#[command(name = "dashboard-settings", version, about = "Inspect, change and preview dashboard presentation settings")]
pub struct Cli {
    /// Directory holding the settings file [default: platform config dir]
    #[arg(long, global = true, value_name = "DIR")]
    pub config_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides LOG_LEVEL
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Keep settings in memory only; nothing is read from or written to disk
    #[arg(long, global = true)]
    pub in_memory: bool,

    /// Navigation tree as JSON [default: built-in tree]
    #[arg(long, global = true, value_name = "FILE")]
    pub nav_tree: Option<PathBuf>,

    /// Capability held by the current user (repeatable)
    #[arg(long = "capability", short = 'c', global = true, value_name = "TAG")]
    pub capabilities: Vec<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Open the preview window (default)
    Gui,
    /// Print the current settings
    Show,
    /// Change settings, e.g. `set colorMode=dark direction=rtl`
    Set {
        #[arg(
            value_name = "KEY=VALUE",
            value_parser = parse_assignment,
            required_unless_present = "json",
            conflicts_with = "json"
        )]
        assignments: Vec<(String, String)>,

        /// Patch as a JSON object, e.g. `{"colorMode":"dark"}`
        #[arg(long, value_name = "OBJECT")]
        json: Option<String>,
    },
    /// Restore every setting to its default
    Reset,
    /// Print the theme derived from the current settings
    Theme,
    /// Print the navigation entries visible to the given capabilities
    Nav {
        /// Viewport width to resolve the menu presentation for
        #[arg(long, allow_negative_numbers = true)]
        width: Option<f64>,
    },
    /// Classify viewport widths into breakpoints
    Breakpoints {
        #[arg(required = true, allow_negative_numbers = true)]
        widths: Vec<f64>,
    },
    /// Print everything a render pass reads: settings, theme, breakpoint, layout and navigation
    Render {
        /// Render as a server would, without the stored settings or a viewport measurement
        #[arg(long, conflicts_with = "width")]
        server: bool,

        #[arg(long, allow_negative_numbers = true)]
        width: Option<f64>,
    },
    /// Print the layout decision for a viewport width
    Layout {
        #[arg(allow_negative_numbers = true)]
        width: f64,
    },
    /// List the settings fields and the values each accepts
    Fields,
}

fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.trim().to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}

fn parse_json_patch(raw: &str) -> Result<ConfigPatch> {
    match serde_json::from_str::<serde_json::Value>(raw).context("Patch is not valid JSON")? {
        serde_json::Value::Object(object) => Ok(ConfigPatch::from_object(object)),
        other => bail!("Patch must be a JSON object, got {other}"),
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RenderView<'a> {
    config: &'a Configuration,
    theme: &'a ThemeDescriptor,
    breakpoint: BreakpointState,
    layout: Layout,
    navigation: &'a [NavEntry],
}

impl<'a> From<&'a RenderContext> for RenderView<'a> {
    fn from(context: &'a RenderContext) -> Self {
        Self {
            config: &context.config,
            theme: &context.theme,
            breakpoint: context.breakpoint,
            layout: context.layout,
            navigation: &context.navigation,
        }
    }
}

/// Inputs shared by every subcommand
struct Session {
    store: PersistentStore,
    tree: Vec<NavNode>,
    identity: Identity,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self> {
        let backend: Arc<dyn StorageBackend> = if cli.in_memory {
            Arc::new(MemoryBackend::new())
        } else {
            let backend = match &cli.config_dir {
                Some(dir) => FileBackend::new(dir),
                None => FileBackend::in_config_dir(),
            };
            debug!(dir = %backend.dir().display(), "Using settings directory");
            Arc::new(backend)
        };

        let tree = match &cli.nav_tree {
            Some(path) => navigation::load_tree(path)?,
            None => navigation::default_tree(),
        };

        Ok(Self {
            store: PersistentStore::new(backend),
            tree,
            identity: Identity::with_capabilities(cli.capabilities.iter().map(String::as_str)),
        })
    }

    /// Engine that writes through to the store on every accepted change
    fn engine(&self, container: ConfigContainer) -> LayoutEngine {
        LayoutEngine::new(container, self.tree.clone(), self.identity.clone(), BreakpointBounds::default())
    }

    /// Engine with the stored record already reconciled in
    fn hydrated_engine(&self) -> LayoutEngine {
        let mut engine = self.engine(ConfigContainer::with_persister(Box::new(self.store.clone())));
        let mut reconciler = HydrationReconciler::new(self.store.clone());
        reconciler.first_render(&engine);
        let outcome = reconciler.reconcile(&mut engine);
        debug!(?outcome, "Hydrated command line session");
        engine
    }
}

pub fn run(cli: Cli) -> Result<()> {
    let session = Session::open(&cli)?;

    match cli.command.unwrap_or(Command::Gui) {
        Command::Gui => {
            let writer = BackgroundWriter::spawn(session.store.clone())
                .context("Failed to start settings writer thread")?;
            let engine = session.engine(ConfigContainer::with_persister(Box::new(writer)));
            gui::run_gui(engine, HydrationReconciler::new(session.store.clone()))
        }
        Command::Show => print_json(&*session.hydrated_engine().config()),
        Command::Set { assignments, json } => {
            let patch = match json {
                Some(raw) => parse_json_patch(&raw)?,
                None => ConfigPatch::from_pairs(assignments),
            };
            if patch.is_empty() {
                bail!("Nothing to set");
            }
            let mut engine = session.hydrated_engine();
            let updated = engine.update(&patch).context("Settings change rejected")?;
            print_json(&*updated)
        }
        Command::Reset => {
            let mut engine = session.hydrated_engine();
            print_json(&*engine.reset())
        }
        Command::Theme => print_json(&*session.hydrated_engine().theme()),
        Command::Nav { width } => {
            let mut engine = session.hydrated_engine();
            if let Some(width) = width {
                engine.observe_viewport(width);
            }
            debug!(breakpoint = %engine.breakpoint().current, menu_type = %engine.layout().menu_type, "Filtering navigation");
            print_json(&*engine.navigation())
        }
        Command::Breakpoints { widths } => {
            let mut resolver = BreakpointResolver::new(BreakpointBounds::default());
            for width in widths {
                let state = resolver.observe(width);
                println!("{width}\t{}", state.current);
            }
            Ok(())
        }
        Command::Render { server: true, .. } => {
            let context = HydrationReconciler::server_render(&session.tree, &session.identity, BreakpointBounds::default());
            print_json(&RenderView::from(&context))
        }
        Command::Render { server: false, width } => {
            let mut engine = session.hydrated_engine();
            if let Some(width) = width {
                engine.observe_viewport(width);
            }
            print_json(&RenderView::from(&engine.render_context()))
        }
        Command::Layout { width } => {
            let mut engine = session.hydrated_engine();
            engine.observe_viewport(width);
            print_json(&engine.layout())
        }
        Command::Fields => {
            for field in Field::ALL {
                println!("{field}\t{}", field.allowed_values().join("|"));
            }
            Ok(())
        }
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{json}");
    Ok(())
}

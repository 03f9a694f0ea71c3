//! Layout engine
//!
//! The long-lived instance a UI scope holds on to. Owns the settings
//! container, the breakpoint resolver, the static navigation tree and the
//! current identity, and keeps the derived theme and navigation in step with
//! them: every accepted change is reflected before the mutating call returns.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::breakpoint::{Breakpoint, BreakpointBounds, BreakpointResolver, BreakpointState};
use crate::config::{ConfigContainer, ConfigPatch, Configuration, NavigationMenuType};
use crate::error::ConfigError;
use crate::layout::{self, Layout};
use crate::navigation::{self, Identity, NavEntry, NavNode};
use crate::theme::{self, ThemeDescriptor, ThemeInput};

/// Everything a render pass reads, captured at one instant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderContext {
    pub config: Arc<Configuration>,
    pub theme: Arc<ThemeDescriptor>,
    pub breakpoint: BreakpointState,
    pub layout: Layout,
    pub navigation: Arc<Vec<NavEntry>>,
}

pub struct LayoutEngine {
    container: ConfigContainer,
    changes: watch::Receiver<Arc<Configuration>>,
    /// Snapshot the derived values were computed from
    snapshot: Arc<Configuration>,
    breakpoints: BreakpointResolver,
    tree: Vec<NavNode>,
    identity: Identity,
    theme_input: ThemeInput,
    theme: Arc<ThemeDescriptor>,
    nav_menu_type: NavigationMenuType,
    navigation: Arc<Vec<NavEntry>>,
}

impl LayoutEngine {
    pub fn new(
        container: ConfigContainer,
        tree: Vec<NavNode>,
        identity: Identity,
        bounds: BreakpointBounds,
    ) -> Self {
        let changes = container.subscribe();
        let snapshot = container.read();
        let breakpoints = BreakpointResolver::new(bounds);

        let theme_input = ThemeInput::from(&*snapshot);
        let nav_menu_type = layout::decide(&snapshot, breakpoints.current()).menu_type;
        let navigation = navigation::filter(&tree, &identity, nav_menu_type);

        Self {
            container,
            changes,
            snapshot,
            breakpoints,
            tree,
            identity,
            theme_input,
            theme: Arc::new(theme::derive(theme_input)),
            nav_menu_type,
            navigation: Arc::new(navigation),
        }
    }

    pub fn config(&self) -> Arc<Configuration> {
        self.snapshot.clone()
    }

    pub fn update(&mut self, patch: &ConfigPatch) -> Result<Arc<Configuration>, ConfigError> {
        let snapshot = self.container.update(patch)?;
        self.refresh();
        Ok(snapshot)
    }

    pub fn reset(&mut self) -> Arc<Configuration> {
        let snapshot = self.container.reset();
        self.refresh();
        snapshot
    }

    /// Take over a record restored from storage (hydration only)
    pub(crate) fn adopt(&mut self, restored: Configuration) -> Arc<Configuration> {
        let snapshot = self.container.adopt(restored);
        self.refresh();
        snapshot
    }

    /// End hydration without a stored record (hydration only)
    pub(crate) fn settle(&mut self) {
        self.container.settle();
    }

    /// Change notifications for consumers outside the engine
    pub fn subscribe(&self) -> watch::Receiver<Arc<Configuration>> {
        self.container.subscribe()
    }

    pub fn theme(&self) -> Arc<ThemeDescriptor> {
        self.theme.clone()
    }

    pub fn navigation(&self) -> Arc<Vec<NavEntry>> {
        self.navigation.clone()
    }

    pub fn breakpoint(&self) -> BreakpointState {
        self.breakpoints.current()
    }

    pub fn is_at_least(&self, breakpoint: Breakpoint) -> bool {
        self.breakpoints.is_at_least(breakpoint)
    }

    pub fn is_at_most(&self, breakpoint: Breakpoint) -> bool {
        self.breakpoints.is_at_most(breakpoint)
    }

    /// Feed a viewport width signal
    pub fn observe_viewport(&mut self, width: f64) -> BreakpointState {
        let state = self.breakpoints.observe(width);
        self.refresh_navigation(false);
        state
    }

    pub fn tree(&self) -> &[NavNode] {
        &self.tree
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Swap in a new identity from the auth collaborator and re-filter navigation
    pub fn set_identity(&mut self, identity: Identity) {
        if identity == self.identity {
            return;
        }
        debug!(capabilities = identity.capabilities.len(), "Identity changed");
        self.identity = identity;
        self.refresh_navigation(true);
    }

    pub fn layout(&self) -> Layout {
        layout::decide(&self.snapshot, self.breakpoints.current())
    }

    pub fn render_context(&self) -> RenderContext {
        RenderContext {
            config: self.snapshot.clone(),
            theme: self.theme.clone(),
            breakpoint: self.breakpoints.current(),
            layout: self.layout(),
            navigation: self.navigation.clone(),
        }
    }

    fn refresh(&mut self) {
        if self.changes.has_changed().unwrap_or(false) {
            self.snapshot = self.changes.borrow_and_update().clone();
        }

        let input = ThemeInput::from(&*self.snapshot);
        if input != self.theme_input {
            self.theme_input = input;
            self.theme = Arc::new(theme::derive(input));
            debug!(mode = %input.color_mode, direction = %input.direction, "Theme re-derived");
        }

        self.refresh_navigation(false);
    }

    fn refresh_navigation(&mut self, force: bool) {
        let menu_type = self.layout().menu_type;
        if !force && menu_type == self.nav_menu_type {
            return;
        }
        self.nav_menu_type = menu_type;
        self.navigation = Arc::new(navigation::filter(&self.tree, &self.identity, menu_type));
        debug!(menu_type = %menu_type, entries = self.navigation.len(), "Navigation re-filtered");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, Direction, Locale};
    use crate::layout::SideNavMode;
    use crate::navigation::{default_tree, Presentation};

    fn engine() -> LayoutEngine {
        LayoutEngine::new(
            ConfigContainer::new(),
            default_tree(),
            Identity::anonymous(),
            BreakpointBounds::default(),
        )
    }

    #[test]
    fn test_update_is_reflected_before_returning() {
        let mut engine = engine();
        engine
            .update(&ConfigPatch::new().color_mode(ColorMode::Dark).direction(Direction::Rtl))
            .unwrap();

        let context = engine.render_context();
        assert_eq!(context.config.color_mode, ColorMode::Dark);
        assert_eq!(context.theme.mode, ColorMode::Dark);
        assert_eq!(context.theme.direction, Direction::Rtl);
    }

    #[test]
    fn test_rejected_update_leaves_derived_state_alone() {
        let mut engine = engine();
        let before = engine.render_context();

        assert!(engine.update(&ConfigPatch::new().set("direction", "sideways")).is_err());
        assert_eq!(engine.render_context(), before);
    }

    #[test]
    fn test_theme_is_reused_when_its_inputs_do_not_change() {
        let mut engine = engine();
        let theme = engine.theme();

        engine.update(&ConfigPatch::new().locale(Locale::Fr)).unwrap();
        assert!(Arc::ptr_eq(&theme, &engine.theme()));

        engine.update(&ConfigPatch::new().color_mode(ColorMode::Dark)).unwrap();
        assert!(!Arc::ptr_eq(&theme, &engine.theme()));
    }

    #[test]
    fn test_identity_change_refilters_navigation() {
        let mut engine = engine();
        assert!(engine.navigation().iter().all(|e| e.id != "admin"));

        engine.set_identity(Identity::with_capabilities(["admin"]));
        assert!(engine.navigation().iter().any(|e| e.id == "admin"));

        engine.set_identity(Identity::anonymous());
        assert!(engine.navigation().iter().all(|e| e.id != "admin"));
    }

    #[test]
    fn test_slim_rail_appears_once_viewport_is_wide() {
        let mut engine = engine();
        engine
            .update(&ConfigPatch::new().navigation_menu_type(NavigationMenuType::Slim))
            .unwrap();

        // Conservative breakpoint: overlay drawer with default grouping
        assert_eq!(engine.layout().side_nav, SideNavMode::Overlay);
        assert_eq!(engine.navigation()[0].presentation, Presentation::Group { expanded: false });

        engine.observe_viewport(1400.0);
        assert!(engine.is_at_least(Breakpoint::Lg));
        assert_eq!(engine.layout().side_nav, SideNavMode::Collapsed);
        assert_eq!(engine.navigation()[0].presentation, Presentation::Flyout);

        engine.observe_viewport(700.0);
        assert!(engine.is_at_most(Breakpoint::Sm));
        assert_eq!(engine.navigation()[0].presentation, Presentation::Group { expanded: false });
    }

    #[test]
    fn test_reset_rederives_defaults() {
        let mut engine = engine();
        engine.update(&ConfigPatch::new().color_mode(ColorMode::Dark)).unwrap();
        let reset = engine.reset();

        assert_eq!(reset.version, 2);
        assert_eq!(engine.theme().mode, ColorMode::Light);
    }

    #[test]
    fn test_external_subscribers_are_notified() {
        let mut engine = engine();
        let mut changes = engine.subscribe();

        engine.update(&ConfigPatch::new().color_mode(ColorMode::Dark)).unwrap();
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().version, 1);
    }
}

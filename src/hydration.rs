//! Hydration reconciliation
//!
//! The first render anywhere (server or client) uses the documented defaults,
//! because a server cannot see the client's stored settings. Once that first
//! client render is on screen, the stored record is loaded and, if it differs,
//! applied as an ordinary settings change. The first paint therefore always
//! matches the server markup and any switch (light to dark, say) happens as a
//! normal transition afterwards, never as a remount.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::breakpoint::BreakpointBounds;
use crate::config::{ConfigContainer, Configuration};
use crate::engine::{LayoutEngine, RenderContext};
use crate::navigation::{Identity, NavNode};
use crate::store::PersistentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPhase {
    AwaitingFirstRender,
    FirstRenderComplete,
    Reconciled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Asked to reconcile before the first render finished; nothing done
    Deferred,
    /// Nothing usable stored; defaults stay authoritative
    KeptDefaults,
    Adopted { version: u64 },
    /// Settings changed before reconciliation were replayed onto the stored record
    Merged { version: u64 },
    /// Settings were changed before reconciliation and nothing usable was
    /// stored; in-memory state wins
    Superseded,
    AlreadyReconciled,
}

pub struct HydrationReconciler {
    store: PersistentStore,
    phase: HydrationPhase,
}

impl HydrationReconciler {
    pub fn new(store: PersistentStore) -> Self {
        Self {
            store,
            phase: HydrationPhase::AwaitingFirstRender,
        }
    }

    pub fn phase(&self) -> HydrationPhase {
        self.phase
    }

    /// What a render without access to client storage produces
    pub fn server_render(tree: &[NavNode], identity: &Identity, bounds: BreakpointBounds) -> RenderContext {
        LayoutEngine::new(ConfigContainer::new(), tree.to_vec(), identity.clone(), bounds).render_context()
    }

    /// Render the first client frame. The engine still holds the defaults at
    /// this point, so the result matches `server_render` for the same inputs.
    pub fn first_render(&mut self, engine: &LayoutEngine) -> RenderContext {
        let context = engine.render_context();
        if self.phase == HydrationPhase::AwaitingFirstRender {
            debug!(version = context.config.version, "First client render complete");
            self.phase = HydrationPhase::FirstRenderComplete;
        }
        context
    }

    /// Bring the engine in line with what the client has stored.
    /// Runs at most once, and only after `first_render`.
    pub fn reconcile(&mut self, engine: &mut LayoutEngine) -> Reconciliation {
        match self.phase {
            HydrationPhase::AwaitingFirstRender => {
                warn!("Reconcile requested before the first render; deferring");
                return Reconciliation::Deferred;
            }
            HydrationPhase::Reconciled => return Reconciliation::AlreadyReconciled,
            HydrationPhase::FirstRenderComplete => {}
        }
        self.phase = HydrationPhase::Reconciled;

        let defaults = Configuration::default();
        let changed_early = engine.config().version != defaults.version;

        match self.store.load() {
            Some(stored) if stored.version != defaults.version => {
                let adopted: Arc<Configuration> = engine.adopt(stored);
                if changed_early {
                    info!(version = adopted.version, "Hydrated stored settings with early changes");
                    Reconciliation::Merged { version: adopted.version }
                } else {
                    info!(version = adopted.version, "Hydrated stored settings");
                    Reconciliation::Adopted { version: adopted.version }
                }
            }
            Some(_) | None => {
                engine.settle();
                if changed_early {
                    info!(version = engine.config().version, "Settings changed before reconciliation; keeping them");
                    Reconciliation::Superseded
                } else {
                    Reconciliation::KeptDefaults
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColorMode, ConfigPatch, Locale};
    use crate::navigation::default_tree;
    use crate::store::{MemoryBackend, StorageBackend};
    use crate::constants::storage::SETTINGS_KEY;

    struct Client {
        backend: Arc<MemoryBackend>,
        store: PersistentStore,
        engine: LayoutEngine,
        reconciler: HydrationReconciler,
    }

    fn client() -> Client {
        let backend = Arc::new(MemoryBackend::new());
        let store = PersistentStore::new(backend.clone());
        let engine = LayoutEngine::new(
            ConfigContainer::with_persister(Box::new(store.clone())),
            default_tree(),
            Identity::anonymous(),
            BreakpointBounds::default(),
        );
        let reconciler = HydrationReconciler::new(store.clone());
        Client { backend, store, engine, reconciler }
    }

    fn server() -> RenderContext {
        HydrationReconciler::server_render(&default_tree(), &Identity::anonymous(), BreakpointBounds::default())
    }

    #[test]
    fn test_stored_dark_mode_applied_after_identical_first_render() {
        let mut c = client();
        c.store.save(&Configuration { color_mode: ColorMode::Dark, version: 3, ..Configuration::default() });

        let first = c.reconciler.first_render(&c.engine);
        assert_eq!(first, server());
        assert_eq!(first.config.color_mode, ColorMode::Light);

        let outcome = c.reconciler.reconcile(&mut c.engine);
        assert_eq!(outcome, Reconciliation::Adopted { version: 3 });
        assert_eq!(c.engine.config().color_mode, ColorMode::Dark);
        assert_eq!(c.engine.theme().mode, ColorMode::Dark);
        assert_eq!(c.reconciler.phase(), HydrationPhase::Reconciled);
    }

    #[test]
    fn test_cold_start_keeps_defaults_and_writes_nothing() {
        let mut c = client();
        c.reconciler.first_render(&c.engine);

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::KeptDefaults);
        assert_eq!(*c.engine.config(), Configuration::default());
        assert!(c.backend.read(SETTINGS_KEY).unwrap().is_none());
    }

    #[test]
    fn test_defaults_persisted_on_first_explicit_change() {
        let mut c = client();
        c.reconciler.first_render(&c.engine);
        c.reconciler.reconcile(&mut c.engine);

        c.engine.update(&ConfigPatch::new().locale(Locale::De)).unwrap();
        let stored = c.store.load().unwrap();
        assert_eq!(stored.locale, Locale::De);
        assert_eq!(stored.version, 1);
    }

    #[test]
    fn test_corrupt_store_keeps_defaults() {
        let mut c = client();
        c.backend.insert_raw(SETTINGS_KEY, "\u{0}\u{0}garbage");
        c.reconciler.first_render(&c.engine);

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::KeptDefaults);
        assert_eq!(*c.engine.config(), Configuration::default());
    }

    #[test]
    fn test_reconcile_before_first_render_is_deferred() {
        let mut c = client();
        c.store.save(&Configuration { color_mode: ColorMode::Dark, version: 3, ..Configuration::default() });

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::Deferred);
        assert_eq!(c.engine.config().color_mode, ColorMode::Light);

        c.reconciler.first_render(&c.engine);
        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::Adopted { version: 3 });
        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::AlreadyReconciled);
    }

    #[test]
    fn test_change_before_reconcile_merges_into_stored_record() {
        let mut c = client();
        c.store.save(&Configuration { color_mode: ColorMode::Dark, version: 3, ..Configuration::default() });
        c.reconciler.first_render(&c.engine);

        c.engine.update(&ConfigPatch::new().locale(Locale::Fr)).unwrap();
        // The stored record is not clobbered while hydration is pending
        assert_eq!(c.store.load().unwrap().version, 3);

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::Merged { version: 4 });
        assert_eq!(c.engine.config().color_mode, ColorMode::Dark);
        assert_eq!(c.engine.config().locale, Locale::Fr);
        assert_eq!(c.engine.theme().mode, ColorMode::Dark);

        let stored = c.store.load().unwrap();
        assert_eq!(stored, *c.engine.config());
        assert!(stored.version > 3);
    }

    #[test]
    fn test_change_before_reconcile_without_stored_record_wins() {
        let mut c = client();
        c.reconciler.first_render(&c.engine);

        c.engine.update(&ConfigPatch::new().locale(Locale::Fr)).unwrap();
        assert!(c.store.load().is_none());

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::Superseded);
        assert_eq!(c.engine.config().locale, Locale::Fr);
        assert_eq!(c.store.load().unwrap().version, 1);
    }

    #[test]
    fn test_adoption_notifies_subscribers_as_a_normal_change() {
        let mut c = client();
        c.store.save(&Configuration { color_mode: ColorMode::Dark, version: 5, ..Configuration::default() });
        let mut changes = c.engine.subscribe();

        c.reconciler.first_render(&c.engine);
        assert!(!changes.has_changed().unwrap());

        c.reconciler.reconcile(&mut c.engine);
        assert!(changes.has_changed().unwrap());
        assert_eq!(changes.borrow_and_update().color_mode, ColorMode::Dark);
    }

    #[test]
    fn test_stored_record_at_default_version_is_ignored() {
        let mut c = client();
        c.store.save(&Configuration::default());
        c.reconciler.first_render(&c.engine);

        assert_eq!(c.reconciler.reconcile(&mut c.engine), Reconciliation::KeptDefaults);
    }
}

//! Responsive breakpoint classification
//!
//! Viewport width signals come from the platform; this turns them into an
//! ordered `Breakpoint` plus range queries. Before the first signal the
//! resolver reports the smallest breakpoint so the initial render never
//! depends on a measurement only the client can make.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

use crate::constants::breakpoints;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Breakpoint {
    Xs,
    Sm,
    Md,
    Lg,
    Xl,
}

impl Breakpoint {
    /// Smallest to largest
    pub const ALL: [Breakpoint; 5] = [
        Breakpoint::Xs,
        Breakpoint::Sm,
        Breakpoint::Md,
        Breakpoint::Lg,
        Breakpoint::Xl,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Breakpoint::Xs => "xs",
            Breakpoint::Sm => "sm",
            Breakpoint::Md => "md",
            Breakpoint::Lg => "lg",
            Breakpoint::Xl => "xl",
        }
    }
}

impl fmt::Display for Breakpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower bound in pixels of each breakpoint. `xs` always starts at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakpointBounds {
    pub sm: u32,
    pub md: u32,
    pub lg: u32,
    pub xl: u32,
}

impl Default for BreakpointBounds {
    fn default() -> Self {
        Self {
            sm: breakpoints::SM,
            md: breakpoints::MD,
            lg: breakpoints::LG,
            xl: breakpoints::XL,
        }
    }
}

impl BreakpointBounds {
    pub fn lower_bound(&self, breakpoint: Breakpoint) -> u32 {
        match breakpoint {
            Breakpoint::Xs => breakpoints::XS,
            Breakpoint::Sm => self.sm,
            Breakpoint::Md => self.md,
            Breakpoint::Lg => self.lg,
            Breakpoint::Xl => self.xl,
        }
    }

    /// Largest breakpoint whose lower bound is at or below `width`
    pub fn classify(&self, width: u32) -> Breakpoint {
        Breakpoint::ALL
            .into_iter()
            .rev()
            .find(|bp| self.lower_bound(*bp) <= width)
            .unwrap_or(Breakpoint::Xs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BreakpointState {
    pub current: Breakpoint,
    pub viewport_width: u32,
}

impl Default for BreakpointState {
    fn default() -> Self {
        Self {
            current: Breakpoint::Xs,
            viewport_width: 0,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct BreakpointResolver {
    bounds: BreakpointBounds,
    state: BreakpointState,
}

impl BreakpointResolver {
    pub fn new(bounds: BreakpointBounds) -> Self {
        Self {
            bounds,
            state: BreakpointState::default(),
        }
    }

    /// Feed a viewport width signal. Negative or non-finite widths count as zero.
    pub fn observe(&mut self, width: f64) -> BreakpointState {
        let viewport_width = if width.is_finite() && width > 0.0 {
            width.min(u32::MAX as f64) as u32
        } else {
            0
        };
        let next = BreakpointState {
            current: self.bounds.classify(viewport_width),
            viewport_width,
        };
        if next.current != self.state.current {
            debug!(from = %self.state.current, to = %next.current, width = viewport_width, "Breakpoint changed");
        }
        self.state = next;
        next
    }

    pub fn current(&self) -> BreakpointState {
        self.state
    }

    pub fn is_at_least(&self, breakpoint: Breakpoint) -> bool {
        self.state.current >= breakpoint
    }

    pub fn is_at_most(&self, breakpoint: Breakpoint) -> bool {
        self.state.current <= breakpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conservative_default_before_first_signal() {
        let resolver = BreakpointResolver::default();
        assert_eq!(resolver.current(), BreakpointState { current: Breakpoint::Xs, viewport_width: 0 });
        assert!(resolver.is_at_most(Breakpoint::Xs));
    }

    #[test]
    fn test_width_sequence_resolves_in_order() {
        let mut resolver = BreakpointResolver::new(BreakpointBounds { sm: 600, md: 900, lg: 1200, xl: 1536 });
        let seen: Vec<Breakpoint> = [320.0, 800.0, 1300.0]
            .into_iter()
            .map(|width| resolver.observe(width).current)
            .collect();
        assert_eq!(seen, vec![Breakpoint::Xs, Breakpoint::Sm, Breakpoint::Lg]);
        assert_eq!(resolver.current().viewport_width, 1300);
    }

    #[test]
    fn test_bounds_are_inclusive() {
        let bounds = BreakpointBounds::default();
        assert_eq!(bounds.classify(599), Breakpoint::Xs);
        assert_eq!(bounds.classify(600), Breakpoint::Sm);
        assert_eq!(bounds.classify(1199), Breakpoint::Md);
        assert_eq!(bounds.classify(1200), Breakpoint::Lg);
        assert_eq!(bounds.classify(u32::MAX), Breakpoint::Xl);
    }

    #[test]
    fn test_malformed_widths_clamp_to_zero() {
        let mut resolver = BreakpointResolver::default();
        resolver.observe(1300.0);
        for width in [-40.0, f64::NAN, f64::NEG_INFINITY, f64::INFINITY] {
            let state = resolver.observe(width);
            assert_eq!(state, BreakpointState { current: Breakpoint::Xs, viewport_width: 0 });
        }
    }

    #[test]
    fn test_range_queries() {
        let mut resolver = BreakpointResolver::default();
        resolver.observe(1000.0);
        assert_eq!(resolver.current().current, Breakpoint::Md);
        assert!(resolver.is_at_least(Breakpoint::Sm));
        assert!(resolver.is_at_least(Breakpoint::Md));
        assert!(!resolver.is_at_least(Breakpoint::Lg));
        assert!(resolver.is_at_most(Breakpoint::Md));
        assert!(resolver.is_at_most(Breakpoint::Xl));
        assert!(!resolver.is_at_most(Breakpoint::Sm));
    }

    #[test]
    fn test_fractional_widths_truncate() {
        let mut resolver = BreakpointResolver::default();
        assert_eq!(resolver.observe(599.9).current, Breakpoint::Xs);
        assert_eq!(resolver.current().viewport_width, 599);
    }
}

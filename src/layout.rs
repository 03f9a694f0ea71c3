//! Layout decisions
//!
//! The one place where settings meet the viewport: decides how the side
//! navigation is drawn for the current breakpoint.

use serde::Serialize;

use crate::breakpoint::{Breakpoint, BreakpointState};
use crate::config::{Configuration, ContentWidth, Direction, NavigationMenuType, SideNavState};
use crate::constants::layout::{COMPACT_CONTENT_MAX_WIDTH, NAV_COLLAPSED_WIDTH, NAV_EXPANDED_WIDTH};

/// Side navigation stops being docked below this breakpoint
pub const DOCKED_NAV_MIN: Breakpoint = Breakpoint::Lg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SideNavMode {
    Expanded,
    Collapsed,
    /// Hidden drawer laid over the content, opened on demand
    Overlay,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub side_nav: SideNavMode,
    /// Width reserved for the docked navigation; zero for an overlay
    pub nav_width: u32,
    pub nav_edge: Edge,
    /// Menu grouping actually rendered at this breakpoint
    pub menu_type: NavigationMenuType,
    pub content_max_width: Option<u32>,
}

pub fn decide(config: &Configuration, breakpoint: BreakpointState) -> Layout {
    let docked = breakpoint.current >= DOCKED_NAV_MIN;

    let (side_nav, menu_type) = match (docked, config.navigation_menu_type) {
        (false, _) => (SideNavMode::Overlay, NavigationMenuType::Default),
        // The slim rail is always the narrow variant
        (true, NavigationMenuType::Slim) => (SideNavMode::Collapsed, NavigationMenuType::Slim),
        (true, menu_type) => match config.side_nav_state {
            SideNavState::Expanded => (SideNavMode::Expanded, menu_type),
            SideNavState::Collapsed => (SideNavMode::Collapsed, menu_type),
        },
    };

    let nav_width = match side_nav {
        SideNavMode::Expanded => NAV_EXPANDED_WIDTH,
        SideNavMode::Collapsed => NAV_COLLAPSED_WIDTH,
        SideNavMode::Overlay => 0,
    };

    Layout {
        side_nav,
        nav_width,
        nav_edge: match config.direction {
            Direction::Ltr => Edge::Left,
            Direction::Rtl => Edge::Right,
        },
        menu_type,
        content_max_width: match config.content_width {
            ContentWidth::Compact => Some(COMPACT_CONTENT_MAX_WIDTH),
            ContentWidth::Wide => None,
        },
    }
}

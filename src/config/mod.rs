//! Configuration management
//!
//! - **settings**: the persisted `Configuration` record and its enumerations
//! - **patch**: validated partial updates
//! - **container**: the single owner of the live record

pub mod container;
pub mod patch;
pub mod settings;

// Re-export commonly used types
pub use container::ConfigContainer;
pub use patch::ConfigPatch;
pub use settings::{
    ColorMode, Configuration, ContentWidth, Contrast, Direction, Field, Locale, NavColor,
    NavigationMenuType, SideNavState, Skin,
};

//! Application-wide constants
//!
//! Single source of truth for storage locations, breakpoint bounds and
//! layout thresholds shared by the engine, the CLI and the GUI.

/// Persisted settings location
pub mod storage {
    /// Directory created under the platform config dir
    pub const APP_DIR: &str = "dashboard-settings";

    /// Well-known key the settings record is stored under
    pub const SETTINGS_KEY: &str = "dashboard-settings";

    /// Extension appended to a key by the file backend
    pub const FILE_EXTENSION: &str = "json";
}

/// Default lower bounds (in pixels) for each breakpoint
pub mod breakpoints {
    pub const XS: u32 = 0;
    pub const SM: u32 = 600;
    pub const MD: u32 = 900;
    pub const LG: u32 = 1200;
    pub const XL: u32 = 1536;
}

/// Layout thresholds used when combining settings with viewport state
pub mod layout {
    /// Maximum content width for the `compact` content width setting
    pub const COMPACT_CONTENT_MAX_WIDTH: u32 = 1440;

    /// Expanded vertical navigation width
    pub const NAV_EXPANDED_WIDTH: u32 = 260;

    /// Collapsed (icon rail) vertical navigation width
    pub const NAV_COLLAPSED_WIDTH: u32 = 72;
}

/// Background persistence
pub mod writer {
    /// Thread name for the settings writer
    pub const THREAD_NAME: &str = "settings-writer";
}

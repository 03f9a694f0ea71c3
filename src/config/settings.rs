//! Presentation settings record
//!
//! `Configuration` is the canonical, persisted record of what the user picked
//! in the customizer. Every field is a closed enumeration so an in-memory value
//! can never be out of range; out-of-range input is rejected at the patch
//! boundary (see `patch.rs`).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declares a closed settings enumeration with its wire names
macro_rules! setting_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:literal),+ $(,)? } default $default:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every member, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$default
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

setting_enum! {
    /// How the navigation menu groups its entries
    NavigationMenuType {
        Default => "default",
        Slim => "slim",
        Stacked => "stacked",
    } default Default
}

setting_enum! {
    /// Drawer state of the vertical side navigation on wide viewports
    SideNavState {
        Expanded => "expanded",
        Collapsed => "collapsed",
    } default Expanded
}

setting_enum! {
    /// Color scheme of the navigation surface, independent of the page mode
    NavColor {
        Default => "default",
        Light => "light",
        Dark => "dark",
        Primary => "primary",
    } default Default
}

setting_enum! {
    ColorMode {
        Light => "light",
        Dark => "dark",
    } default Light
}

setting_enum! {
    Contrast {
        Default => "default",
        High => "high",
    } default Default
}

setting_enum! {
    /// Text and layout direction
    Direction {
        Ltr => "ltr",
        Rtl => "rtl",
    } default Ltr
}

setting_enum! {
    /// Supported UI locales. Only the identifier is carried here;
    /// translation tables live with the host application.
    Locale {
        En => "en",
        Fr => "fr",
        De => "de",
        Ar => "ar",
    } default En
}

setting_enum! {
    /// Card/surface treatment: elevated shadows or flat bordered surfaces
    Skin {
        Default => "default",
        Bordered => "bordered",
    } default Default
}

setting_enum! {
    ContentWidth {
        Compact => "compact",
        Wide => "wide",
    } default Compact
}

impl Locale {
    /// Direction the locale is normally written in
    pub fn natural_direction(self) -> Direction {
        match self {
            Locale::Ar => Direction::Rtl,
            _ => Direction::Ltr,
        }
    }
}

/// Canonical settings record.
///
/// Missing fields in a stored record fall back to their defaults and unknown
/// fields are ignored, so records written by older or newer builds still load.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Configuration {
    pub navigation_menu_type: NavigationMenuType,
    pub side_nav_state: SideNavState,
    pub nav_color: NavColor,
    pub color_mode: ColorMode,
    pub contrast: Contrast,
    pub direction: Direction,
    pub locale: Locale,
    pub skin: Skin,
    pub content_width: ContentWidth,
    /// Incremented on every accepted mutation
    pub version: u64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            navigation_menu_type: NavigationMenuType::default(),
            side_nav_state: SideNavState::default(),
            nav_color: NavColor::default(),
            color_mode: ColorMode::default(),
            contrast: Contrast::default(),
            direction: Direction::default(),
            locale: Locale::default(),
            skin: Skin::default(),
            content_width: ContentWidth::default(),
            version: 0,
        }
    }
}

#[cfg(test)]
impl Configuration {
    /// Same settings, ignoring the version counter
    pub fn same_settings(&self, other: &Configuration) -> bool {
        Configuration { version: 0, ..self.clone() } == Configuration { version: 0, ..other.clone() }
    }
}

/// Patchable settings fields, keyed by their persisted (camelCase) name.
/// `version` is owned by the container and is not patchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    NavigationMenuType,
    SideNavState,
    NavColor,
    ColorMode,
    Contrast,
    Direction,
    Locale,
    Skin,
    ContentWidth,
}

impl Field {
    pub const ALL: &'static [Field] = &[
        Field::NavigationMenuType,
        Field::SideNavState,
        Field::NavColor,
        Field::ColorMode,
        Field::Contrast,
        Field::Direction,
        Field::Locale,
        Field::Skin,
        Field::ContentWidth,
    ];

    pub fn key(self) -> &'static str {
        match self {
            Field::NavigationMenuType => "navigationMenuType",
            Field::SideNavState => "sideNavState",
            Field::NavColor => "navColor",
            Field::ColorMode => "colorMode",
            Field::Contrast => "contrast",
            Field::Direction => "direction",
            Field::Locale => "locale",
            Field::Skin => "skin",
            Field::ContentWidth => "contentWidth",
        }
    }

    /// Wire names accepted for this field
    pub fn allowed_values(self) -> Vec<&'static str> {
        fn names<T: Copy>(all: &[T], name: fn(T) -> &'static str) -> Vec<&'static str> {
            all.iter().map(|v| name(*v)).collect()
        }
        match self {
            Field::NavigationMenuType => names(NavigationMenuType::ALL, NavigationMenuType::as_str),
            Field::SideNavState => names(SideNavState::ALL, SideNavState::as_str),
            Field::NavColor => names(NavColor::ALL, NavColor::as_str),
            Field::ColorMode => names(ColorMode::ALL, ColorMode::as_str),
            Field::Contrast => names(Contrast::ALL, Contrast::as_str),
            Field::Direction => names(Direction::ALL, Direction::as_str),
            Field::Locale => names(Locale::ALL, Locale::as_str),
            Field::Skin => names(Skin::ALL, Skin::as_str),
            Field::ContentWidth => names(ContentWidth::ALL, ContentWidth::as_str),
        }
    }

    /// Look a field up by its camelCase key; snake_case is accepted too
    /// since that is what people type on a command line.
    pub fn from_key(key: &str) -> Option<Field> {
        let folded: String = key.chars().filter(|c| *c != '_' && *c != '-').collect();
        Field::ALL
            .iter()
            .copied()
            .find(|field| field.key().eq_ignore_ascii_case(&folded))
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

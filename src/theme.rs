//! Theme derivation
//!
//! `derive` is a pure, total function from the theme-relevant slice of the
//! settings to an immutable `ThemeDescriptor`. Equal inputs always give equal
//! descriptors, so consumers can compare against the previous one to skip work.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::config::{ColorMode, Configuration, Contrast, Direction, NavColor, Skin};

/// sRGB color with alpha
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)?;
        if self.a != 0xFF {
            write!(f, "{:02X}", self.a)?;
        }
        Ok(())
    }
}

impl Serialize for Rgba {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

mod colors {
    use super::Rgba;

    pub const PRIMARY: Rgba = Rgba::rgb(0x73, 0x67, 0xF0);
    pub const WHITE: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Rgba = Rgba::rgb(0x00, 0x00, 0x00);

    pub const LIGHT_BACKGROUND: Rgba = Rgba::rgb(0xF8, 0xF7, 0xFA);
    pub const LIGHT_SURFACE: Rgba = Rgba::rgb(0xFF, 0xFF, 0xFF);
    pub const LIGHT_TEXT: Rgba = Rgba::rgb(0x44, 0x40, 0x50);
    pub const LIGHT_TEXT_MUTED: Rgba = Rgba::rgb(0x8A, 0x87, 0x93);
    pub const LIGHT_DIVIDER: Rgba = Rgba::rgb(0xE6, 0xE6, 0xE8);

    pub const DARK_BACKGROUND: Rgba = Rgba::rgb(0x25, 0x29, 0x3C);
    pub const DARK_SURFACE: Rgba = Rgba::rgb(0x2F, 0x33, 0x49);
    pub const DARK_TEXT: Rgba = Rgba::rgb(0xCF, 0xCD, 0xE4);
    pub const DARK_TEXT_MUTED: Rgba = Rgba::rgb(0x8A, 0x8D, 0x93);
    pub const DARK_DIVIDER: Rgba = Rgba::rgb(0x43, 0x47, 0x5C);
}

/// Theme-relevant slice of the settings record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ThemeInput {
    pub color_mode: ColorMode,
    pub direction: Direction,
    pub nav_color: NavColor,
    pub contrast: Contrast,
    pub skin: Skin,
}

impl From<&Configuration> for ThemeInput {
    fn from(config: &Configuration) -> Self {
        Self {
            color_mode: config.color_mode,
            direction: config.direction,
            nav_color: config.nav_color,
            contrast: config.contrast,
            skin: config.skin,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Palette {
    pub background: Rgba,
    pub surface: Rgba,
    pub text: Rgba,
    pub text_muted: Rgba,
    pub divider: Rgba,
    pub primary: Rgba,
    pub on_primary: Rgba,
}

/// Colors for the navigation surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NavPalette {
    pub background: Rgba,
    pub text: Rgba,
    pub active_background: Rgba,
    pub active_text: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Shape {
    pub corner_radius: u8,
    pub bordered: bool,
    pub elevated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ThemeDescriptor {
    pub mode: ColorMode,
    pub direction: Direction,
    pub contrast: Contrast,
    pub palette: Palette,
    pub nav: NavPalette,
    pub shape: Shape,
}

pub fn derive(input: ThemeInput) -> ThemeDescriptor {
    let palette = palette(input.color_mode, input.contrast);
    ThemeDescriptor {
        mode: input.color_mode,
        direction: input.direction,
        contrast: input.contrast,
        palette,
        nav: nav_palette(input.nav_color, &palette),
        shape: Shape {
            corner_radius: 6,
            bordered: input.skin == Skin::Bordered,
            elevated: input.skin == Skin::Default,
        },
    }
}

fn palette(mode: ColorMode, contrast: Contrast) -> Palette {
    let base = match mode {
        ColorMode::Light => Palette {
            background: colors::LIGHT_BACKGROUND,
            surface: colors::LIGHT_SURFACE,
            text: colors::LIGHT_TEXT,
            text_muted: colors::LIGHT_TEXT_MUTED,
            divider: colors::LIGHT_DIVIDER,
            primary: colors::PRIMARY,
            on_primary: colors::WHITE,
        },
        ColorMode::Dark => Palette {
            background: colors::DARK_BACKGROUND,
            surface: colors::DARK_SURFACE,
            text: colors::DARK_TEXT,
            text_muted: colors::DARK_TEXT_MUTED,
            divider: colors::DARK_DIVIDER,
            primary: colors::PRIMARY,
            on_primary: colors::WHITE,
        },
    };

    match (contrast, mode) {
        (Contrast::Default, _) => base,
        // High contrast: text goes to the extreme, muted text and dividers lose their tint
        (Contrast::High, ColorMode::Light) => Palette {
            text: colors::BLACK,
            text_muted: colors::LIGHT_TEXT,
            divider: colors::LIGHT_TEXT_MUTED,
            ..base
        },
        (Contrast::High, ColorMode::Dark) => Palette {
            text: colors::WHITE,
            text_muted: colors::DARK_TEXT,
            divider: colors::DARK_TEXT_MUTED,
            ..base
        },
    }
}

fn nav_palette(nav_color: NavColor, palette: &Palette) -> NavPalette {
    let (background, text) = match nav_color {
        NavColor::Default => (palette.surface, palette.text),
        NavColor::Light => (colors::LIGHT_SURFACE, colors::LIGHT_TEXT),
        NavColor::Dark => (colors::DARK_SURFACE, colors::DARK_TEXT),
        NavColor::Primary => (palette.primary, palette.on_primary),
    };

    let (active_background, active_text) = match nav_color {
        // Primary on primary would vanish; invert to a translucent highlight
        NavColor::Primary => (palette.on_primary.with_alpha(0x29), palette.on_primary),
        _ => (palette.primary, palette.on_primary),
    };

    NavPalette {
        background,
        text,
        active_background,
        active_text,
    }
}

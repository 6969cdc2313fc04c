//! # Theme and density
//!
//! The visual parameters every view function and the layout pass need:
//!
//! - `Theme`: colors for surfaces, text and controls.
//! - `Density`: dp to px scale factor, set by the runner from the window.
//! - `TextScale`: user text scaling applied on top of density.
//!
//! They are grouped in `Locals` and passed by reference. Overriding a value
//! for part of the tree is an ordinary struct update:
//!
//! ```rust
//! use tally_core::*;
//!
//! let locals = Locals::default();
//! let light = Locals {
//!     theme: Theme {
//!         background: Color::WHITE,
//!         on_surface: Color::from_hex("#222222"),
//!         ..locals.theme
//!     },
//!     ..locals
//! };
//! assert_eq!(light.theme.background, Color::WHITE);
//! ```

use crate::Color;

/// Small semantic color set used by widgets and layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Theme {
    /// Window background / app root.
    pub background: Color,
    /// Default container surface (cards, panels, list rows).
    pub surface: Color,
    /// Primary foreground color on top of `surface`/`background`.
    pub on_surface: Color,
    /// Secondary text (timestamps, captions).
    pub on_surface_variant: Color,

    pub primary: Color,
    pub on_primary: Color,

    /// Low-emphasis outline/border color.
    pub outline: Color,

    pub button_bg: Color,
    pub button_bg_hover: Color,
    pub button_bg_pressed: Color,
    pub button_bg_disabled: Color,
    pub on_button_disabled: Color,

    pub scrollbar_track: Color,
    pub scrollbar_thumb: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            background: Color::from_hex("#121212"),
            surface: Color::from_hex("#1E1E1E"),
            on_surface: Color::from_hex("#DDDDDD"),
            on_surface_variant: Color::from_hex("#9A9A9A"),
            primary: Color::from_hex("#34AF82"),
            on_primary: Color::WHITE,
            outline: Color::from_hex("#555555"),
            button_bg: Color::from_hex("#34AF82"),
            button_bg_hover: Color::from_hex("#2A8F6A"),
            button_bg_pressed: Color::from_hex("#1F7556"),
            button_bg_disabled: Color::from_hex("#2C2C2C"),
            on_button_disabled: Color::from_hex("#6E6E6E"),
            scrollbar_track: Color(0xDD, 0xDD, 0xDD, 32),
            scrollbar_thumb: Color(0xDD, 0xDD, 0xDD, 140),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Density {
    pub scale: f32, // dp→px multiplier
}

impl Default for Density {
    fn default() -> Self {
        Self { scale: 1.0 }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextScale(pub f32);

impl Default for TextScale {
    fn default() -> Self {
        Self(1.0)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Locals {
    pub theme: Theme,
    pub density: Density,
    pub text_scale: TextScale,
}

impl Locals {
    pub fn dp_to_px(&self, dp: f32) -> f32 {
        dp * self.density.scale
    }

    pub fn px_to_dp(&self, px: f32) -> f32 {
        if self.density.scale > 0.0 {
            px / self.density.scale
        } else {
            px
        }
    }

    /// Font size in dp to px, with text scale applied.
    pub fn font_px(&self, dp: f32) -> f32 {
        self.dp_to_px(dp) * self.text_scale.0
    }
}

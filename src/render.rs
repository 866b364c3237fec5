//! Drawing capability and palettes.
//!
//! The session never touches a real canvas; it issues primitive calls against
//! a [`Surface`]. The web shell implements it over `CanvasRenderingContext2d`,
//! tests implement it with a recorder.

use crate::settings::Theme;

/// Minimal 2D fill API the draw sequence needs.
pub trait Surface {
    fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64, color: &str);
    fn fill_circle(&mut self, cx: f64, cy: f64, r: f64, color: &str);
}

/// Visual selection supplied by the host. Only changes colors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrawStyle {
    pub theme: Theme,
    pub high_contrast: bool,
}

/// Resolved colors for one frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub background: &'static str,
    pub ground: &'static str,
    pub obstacle: &'static str,
    pub player: &'static str,
    pub coin: &'static str,
}

const LIGHT: Palette = Palette {
    background: "#87CEEB",
    ground: "#8B4513",
    obstacle: "#654321",
    player: "#ff6b6b",
    coin: "#ffd700",
};

const DARK: Palette = Palette {
    background: "#1a1a2e",
    ground: "#16213e",
    obstacle: "#333",
    player: "#ff6b6b",
    coin: "#ffd700",
};

// High contrast ignores the theme: pure black/white with saturated actors.
const HIGH_CONTRAST: Palette = Palette {
    background: "#000",
    ground: "#fff",
    obstacle: "#fff",
    player: "#ff2d2d",
    coin: "#ffff00",
};

impl DrawStyle {
    pub fn palette(&self) -> Palette {
        if self.high_contrast {
            return HIGH_CONTRAST;
        }
        match self.theme {
            Theme::Light => LIGHT,
            Theme::Dark => DARK,
        }
    }
}

/// CSS color for a fading particle (`alpha` is clamped to 0..=1).
pub fn particle_color(gold: bool, alpha: f64) -> String {
    let a = alpha.clamp(0.0, 1.0);
    if gold {
        format!("rgba(255, 215, 0, {a:.3})")
    } else {
        format!("rgba(255, 255, 255, {a:.3})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_selects_palette() {
        let light = DrawStyle { theme: Theme::Light, high_contrast: false };
        let dark = DrawStyle { theme: Theme::Dark, high_contrast: false };
        assert_eq!(light.palette().background, "#87CEEB");
        assert_eq!(dark.palette().background, "#1a1a2e");
        assert_eq!(dark.palette().obstacle, "#333");
    }

    #[test]
    fn test_contrast_overrides_theme() {
        let a = DrawStyle { theme: Theme::Light, high_contrast: true };
        let b = DrawStyle { theme: Theme::Dark, high_contrast: true };
        assert_eq!(a.palette(), b.palette());
        assert_eq!(a.palette().background, "#000");
    }

    #[test]
    fn test_particle_alpha_clamped() {
        assert_eq!(particle_color(true, 1.5), "rgba(255, 215, 0, 1.000)");
        assert_eq!(particle_color(false, -0.2), "rgba(255, 255, 255, 0.000)");
    }
}

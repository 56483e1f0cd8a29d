//! Startup banner: "ELECTION POLL" in figlet with a vertical gradient.

use super::style::Palette;
use crate::shared::config::Theme;
use crossterm::ExecutableCommand;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use figlet_rs::FIGfont;
use std::io::{Write, stdout};

/// Linear interpolation between two RGB colors. `t` in [0.0, 1.0].
fn lerp_rgb(a: (u8, u8, u8), b: (u8, u8, u8), t: f64) -> (u8, u8, u8) {
    let r = (f64::from(a.0) * (1.0 - t) + f64::from(b.0) * t).round() as u8;
    let g = (f64::from(a.1) * (1.0 - t) + f64::from(b.1) * t).round() as u8;
    let bl = (f64::from(a.2) * (1.0 - t) + f64::from(b.2) * t).round() as u8;
    (r, g, bl)
}

/// Banner art, or the plain title when the font cannot render it.
fn banner_lines(title: &str) -> Vec<String> {
    let plain = || vec![title.to_string()];
    match FIGfont::standard() {
        Ok(font) => font
            .convert(title)
            .map(|figure| figure.to_string().lines().map(String::from).collect())
            .unwrap_or_else(plain),
        Err(_) => plain(),
    }
}

/// Prints the welcome banner from accent to secondary accent, then the version line.
pub fn print_welcome(theme: Theme) {
    let palette = Palette::for_theme(theme);
    let mut out = stdout();
    let lines = banner_lines("ELECTION POLL");
    let total = lines.len().max(1);

    for (i, line) in lines.iter().enumerate() {
        let t = if total <= 1 {
            1.0
        } else {
            i as f64 / (total - 1) as f64
        };
        let (r, g, b) = lerp_rgb(palette.accent, palette.accent_alt, t);
        let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
        let _ = out.execute(Print(line));
        let _ = out.execute(Print("\r\n"));
        let _ = out.execute(ResetColor);
    }

    let (r, g, b) = palette.muted;
    let _ = out.execute(SetForegroundColor(Color::Rgb { r, g, b }));
    let _ = out.execute(Print(format!(
        "v{}  2025 local elections straw poll\r\n",
        env!("CARGO_PKG_VERSION")
    )));
    let _ = out.execute(ResetColor);
    let _ = out.flush();
}

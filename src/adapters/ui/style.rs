//! Colors and small print helpers shared by the terminal views.

use crate::shared::config::Theme;
use crossterm::ExecutableCommand;
use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use inquire::ui::{Color as PromptColor, RenderConfig, StyleSheet, Styled};
use std::io::{Write, stdout};

/// RGB triplets per role. Dark mirrors the web UI's green-on-slate look.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub accent: (u8, u8, u8),
    pub accent_alt: (u8, u8, u8),
    pub success: (u8, u8, u8),
    pub error: (u8, u8, u8),
    pub muted: (u8, u8, u8),
}

impl Palette {
    pub fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Dark => Self {
                accent: (0x22, 0xc5, 0x5e),
                accent_alt: (0x38, 0xbd, 0xf8),
                success: (0x4a, 0xde, 0x80),
                error: (0xf8, 0x71, 0x71),
                muted: (0x9c, 0xa3, 0xaf),
            },
            Theme::Light => Self {
                accent: (0x15, 0x80, 0x3d),
                accent_alt: (0x1d, 0x4e, 0xd8),
                success: (0x16, 0xa3, 0x4a),
                error: (0xb9, 0x1c, 0x1c),
                muted: (0x4b, 0x55, 0x63),
            },
        }
    }
}

fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb { r, g, b }
}

fn prompt_rgb((r, g, b): (u8, u8, u8)) -> PromptColor {
    PromptColor::Rgb { r, g, b }
}

/// Print `text` and a newline in `color`. Terminal write errors are ignored.
pub fn println_colored(color: (u8, u8, u8), text: &str) {
    let mut out = stdout();
    let _ = out.execute(SetForegroundColor(rgb(color)));
    let _ = out.execute(Print(text));
    let _ = out.execute(ResetColor);
    let _ = out.execute(Print("\r\n"));
    let _ = out.flush();
}

pub fn clear_screen() {
    let mut out = stdout();
    let _ = out.execute(Clear(ClearType::All));
    let _ = out.execute(MoveTo(0, 0));
}

/// Apply the palette to every subsequent inquire prompt.
pub fn apply_theme(theme: Theme) {
    let p = Palette::for_theme(theme);
    let config = RenderConfig::default_colored()
        .with_prompt_prefix(Styled::new("?").with_fg(prompt_rgb(p.accent)))
        .with_highlighted_option_prefix(Styled::new(">").with_fg(prompt_rgb(p.accent_alt)))
        .with_selected_option(Some(StyleSheet::new().with_fg(prompt_rgb(p.accent_alt))))
        .with_answer(StyleSheet::new().with_fg(prompt_rgb(p.success)))
        .with_help_message(StyleSheet::new().with_fg(prompt_rgb(p.muted)));
    inquire::set_global_render_config(config);
}

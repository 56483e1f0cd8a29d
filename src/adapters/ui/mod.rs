pub mod banner;
pub mod privacy;
pub mod progress;
pub mod results_view;
pub mod style;
pub mod tui;

use crate::shared::config::Theme;

/// Prints the welcome banner and applies `theme` to all subsequent inquire prompts.
/// Call once at startup (e.g. in main after tracing init).
pub fn init_ui(theme: Theme) {
    banner::print_welcome(theme);
    style::apply_theme(theme);
}

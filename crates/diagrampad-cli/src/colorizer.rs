//! Terminal colorization for notifications and listings
//!
//! Applies ANSI escape codes using crossterm.

use crossterm::style::{Color, Stylize};
use diagrampad::NotificationLevel;

use crate::cli::ColorChoice;

/// Decide whether to colorize, honouring `NO_COLOR` in auto mode
pub fn should_colorize(choice: ColorChoice, is_terminal: bool) -> bool {
    match choice {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => std::env::var_os("NO_COLOR").is_none() && is_terminal,
    }
}

fn level_color(level: NotificationLevel) -> Color {
    match level {
        NotificationLevel::Info => Color::Cyan,
        NotificationLevel::Success => Color::Green,
        NotificationLevel::Error => Color::Red,
    }
}

/// One notification line, e.g. `[success] Diagram saved!`
pub fn paint_notification(level: NotificationLevel, message: &str, color: bool) -> String {
    let tag = format!("[{}]", level);
    if color {
        format!("{} {}", tag.with(level_color(level)).bold(), message)
    } else {
        format!("{} {}", tag, message)
    }
}

/// Highlight the listing row of the open diagram
pub fn paint_active(line: &str, color: bool) -> String {
    if color {
        format!("{}", line.with(Color::Green).bold())
    } else {
        format!("* {}", line)
    }
}

/// The syntax error panel shown instead of a preview
pub fn paint_syntax_error(message: &str, help: &str, color: bool) -> String {
    let title = "Syntax Error";
    if color {
        format!(
            "{}\n{}\n{}",
            title.with(Color::Red).bold(),
            message.with(Color::Red),
            help.with(Color::Blue)
        )
    } else {
        format!("{}\n{}\n{}", title, message, help)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_notification() {
        assert_eq!(
            paint_notification(NotificationLevel::Success, "Diagram saved!", false),
            "[success] Diagram saved!"
        );
    }

    #[test]
    fn test_colored_notification_keeps_message() {
        let painted = paint_notification(NotificationLevel::Error, "Diagram not found", true);
        assert!(painted.contains("\x1b["));
        assert!(painted.contains("Diagram not found"));
    }

    #[test]
    fn test_active_marker_without_color() {
        assert_eq!(paint_active("Flow", false), "* Flow");
    }

    #[test]
    fn test_explicit_choices_ignore_terminal() {
        assert!(should_colorize(ColorChoice::Always, false));
        assert!(!should_colorize(ColorChoice::Never, true));
        assert!(!should_colorize(ColorChoice::Auto, false));
    }

    #[test]
    fn test_syntax_error_panel() {
        let panel = paint_syntax_error("Parse error on line 2", "View examples: cheatsheet.html", false);
        assert_eq!(
            panel,
            "Syntax Error\nParse error on line 2\nView examples: cheatsheet.html"
        );
    }
}

use crossterm::style::{StyledContent, Stylize};
use indicatif::ProgressStyle;
use std::time::Duration;

/// Spinner frames for the per-chunk generation stage
pub const EARTH_FRAMES: &[&str] = &["🌍 ", "🌎 ", "🌏 "];

/// Spinner frames for the combination stage
pub const MOON_FRAMES: &[&str] = &["🌑 ", "🌒 ", "🌓 ", "🌔 ", "🌕 ", "🌖 ", "🌗 ", "🌘 "];

pub const EARTH_TICK: Duration = Duration::from_millis(180);
pub const MOON_TICK: Duration = Duration::from_millis(80);

/// Which spinner a progress stage uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerKind {
    Earth,
    Moon,
}

impl SpinnerKind {
    pub fn frames(self) -> &'static [&'static str] {
        match self {
            Self::Earth => EARTH_FRAMES,
            Self::Moon => MOON_FRAMES,
        }
    }

    pub fn tick(self) -> Duration {
        match self {
            Self::Earth => EARTH_TICK,
            Self::Moon => MOON_TICK,
        }
    }

    pub fn style(self, with_counter: bool) -> ProgressStyle {
        let template = if with_counter {
            "{spinner}{msg} [{pos}/{len}]"
        } else {
            "{spinner}{msg}"
        };

        // Template is static, fall back to the default look if it ever fails
        ProgressStyle::with_template(template)
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(self.frames())
    }
}

/// Theme tokens for consistent console styling
pub fn info(message: &str) -> StyledContent<String> {
    format!(" {} ", message).black().on_cyan()
}

pub fn success(message: &str) -> StyledContent<String> {
    format!(" {} ", message).black().on_green()
}

pub fn warning(message: &str) -> StyledContent<String> {
    message.to_string().yellow()
}

pub fn danger(message: &str) -> StyledContent<String> {
    message.to_string().red()
}

pub fn key_hint(message: &str) -> StyledContent<String> {
    message.to_string().cyan().bold()
}

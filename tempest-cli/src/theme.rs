//! Terminal colours and symbols.
//!
//! Thresholds are in metric; readings in imperial are mapped back before
//! picking a colour.

use clap::builder::styling::{Ansi256Color, AnsiColor, Color, Style};
use tempest_core::UnitSystem;

const GREEN: Style = AnsiColor::Green.on_default();
const YELLOW: Style = AnsiColor::Yellow.on_default();
const RED: Style = AnsiColor::Red.on_default();
const BLUE: Style = AnsiColor::Blue.on_default();
const HEAVY_BLUE: Style = AnsiColor::BrightBlue.on_default().bold();
const PURPLE: Style = AnsiColor::Magenta.on_default();
const ORANGE: Style = Style::new().fg_color(Some(Color::Ansi256(Ansi256Color(208))));
const MUTED: Style = Style::new().dimmed();
const TITLE: Style = Style::new().bold();

const WIND_ARROWS: [&str; 8] = ["↓", "↙", "←", "↖", "↑", "↗", "→", "↘"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub color: bool,
    pub emoji: bool,
}

impl Theme {
    pub fn new(color: bool, emoji: bool) -> Self {
        Self { color, emoji }
    }

    /// No escape codes, text labels instead of symbols.
    pub fn plain() -> Self {
        Self::new(false, false)
    }

    fn paint(&self, style: Style, text: &str) -> String {
        if self.color {
            format!("{}{text}{}", style.render(), style.render_reset())
        } else {
            text.to_string()
        }
    }

    pub fn title(&self, text: &str) -> String {
        self.paint(TITLE, text)
    }

    pub fn muted(&self, text: &str) -> String {
        self.paint(MUTED, text)
    }

    pub fn online(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    pub fn offline(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    pub fn temperature(&self, value: f64, units: UnitSystem, text: &str) -> String {
        let celsius = match units {
            UnitSystem::Imperial => (value - 32.0) * 5.0 / 9.0,
            UnitSystem::Metric => value,
        };
        let style = match celsius {
            c if c <= 0.0 => BLUE,
            c if c <= 15.0 => return text.to_string(),
            c if c <= 32.0 => YELLOW,
            _ => RED,
        };
        self.paint(style, text)
    }

    pub fn humidity(&self, pct: f64, text: &str) -> String {
        let style = match pct {
            p if p < 30.0 => YELLOW,
            p if p <= 60.0 => GREEN,
            _ => BLUE,
        };
        self.paint(style, text)
    }

    pub fn wind(&self, speed: f64, units: UnitSystem, text: &str) -> String {
        let mps = match units {
            UnitSystem::Imperial => speed / 2.236_94,
            UnitSystem::Metric => speed,
        };
        let style = match mps {
            s if s < 5.0 => GREEN,
            s if s < 10.0 => YELLOW,
            _ => RED,
        };
        self.paint(style, text)
    }

    pub fn pressure(&self, value: f64, units: UnitSystem, text: &str) -> String {
        let hpa = match units {
            UnitSystem::Imperial => value * 33.863_9,
            UnitSystem::Metric => value,
        };
        let style = match hpa {
            p if p < 1000.0 => RED,
            p if p <= 1020.0 => GREEN,
            _ => BLUE,
        };
        self.paint(style, text)
    }

    pub fn rain(&self, amount: f64, units: UnitSystem, text: &str) -> String {
        let mm = match units {
            UnitSystem::Imperial => amount * 25.4,
            UnitSystem::Metric => amount,
        };
        let style = match mm {
            m if m <= 0.0 => MUTED,
            m if m < 5.0 => BLUE,
            _ => HEAVY_BLUE,
        };
        self.paint(style, text)
    }

    pub fn lightning(&self, count: u32, text: &str) -> String {
        self.paint(if count == 0 { MUTED } else { YELLOW }, text)
    }

    pub fn uv(&self, index: f64, text: &str) -> String {
        let style = match index {
            i if i <= 2.0 => GREEN,
            i if i <= 5.0 => YELLOW,
            i if i <= 7.0 => ORANGE,
            i if i <= 10.0 => RED,
            _ => PURPLE,
        };
        self.paint(style, text)
    }

    pub fn battery(&self, volts: f64, text: &str) -> String {
        let style = match volts {
            v if v >= 2.4 => GREEN,
            v if v >= 2.1 => YELLOW,
            _ => RED,
        };
        self.paint(style, text)
    }

    /// Symbol for a forecast icon name, or a bracketed label without emoji.
    pub fn condition_icon(&self, icon: &str) -> &'static str {
        if self.emoji {
            condition_symbol(icon)
        } else {
            condition_label(icon)
        }
    }

    /// Arrow pointing where the wind blows to. Empty without emoji.
    pub fn wind_arrow(&self, degrees: f64) -> &'static str {
        if !self.emoji {
            return "";
        }
        let index = (degrees.rem_euclid(360.0) / 45.0).round() as usize % WIND_ARROWS.len();
        WIND_ARROWS[index]
    }
}

fn condition_symbol(icon: &str) -> &'static str {
    match icon {
        "clear-day" => "☀",
        "clear-night" => "☽",
        "cloudy" => "☁",
        "foggy" => "≡",
        "partly-cloudy-day" => "⛅",
        "partly-cloudy-night" => "☁",
        "possibly-rainy-day" | "possibly-rainy-night" | "rainy" => "☂",
        "possibly-sleet-day" | "possibly-sleet-night" | "sleet" => "❄",
        "possibly-snow-day" | "possibly-snow-night" | "snow" => "❄",
        "possibly-thunderstorm-day" | "possibly-thunderstorm-night" | "thunderstorm" => "⚡",
        "windy" => "~",
        _ => "•",
    }
}

fn condition_label(icon: &str) -> &'static str {
    match icon {
        "clear-day" | "clear-night" => "[clear]",
        "cloudy" => "[cloudy]",
        "foggy" => "[fog]",
        "partly-cloudy-day" | "partly-cloudy-night" => "[partly cloudy]",
        "possibly-rainy-day" | "possibly-rainy-night" => "[chance rain]",
        "rainy" => "[rain]",
        "possibly-sleet-day" | "possibly-sleet-night" | "sleet" => "[sleet]",
        "possibly-snow-day" | "possibly-snow-night" | "snow" => "[snow]",
        "possibly-thunderstorm-day" | "possibly-thunderstorm-night" | "thunderstorm" => "[storm]",
        "windy" => "[windy]",
        _ => "[--]",
    }
}

pub fn uv_label(index: f64) -> &'static str {
    match index {
        i if i <= 2.0 => "Low",
        i if i <= 5.0 => "Moderate",
        i if i <= 7.0 => "High",
        i if i <= 10.0 => "Very High",
        _ => "Extreme",
    }
}

pub fn battery_label(volts: f64) -> &'static str {
    match volts {
        v if v >= 2.4 => "Good",
        v if v >= 2.1 => "Fair",
        _ => "Low",
    }
}

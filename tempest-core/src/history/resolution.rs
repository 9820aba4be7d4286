use std::fmt;

use chrono::Duration;
use tracing::warn;

/// Target spacing between consecutive observations after downsampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Resolution(Duration);

impl Resolution {
    /// Labels accepted by `--resolution`.
    pub const LABELS: [&'static str; 4] = ["1m", "5m", "30m", "3h"];

    pub fn from_duration(duration: Duration) -> Self {
        Self(duration)
    }

    pub fn duration(&self) -> Duration {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > Duration::zero()
    }

    pub fn one_minute() -> Self {
        Self(Duration::minutes(1))
    }

    pub fn five_minutes() -> Self {
        Self(Duration::minutes(5))
    }

    pub fn thirty_minutes() -> Self {
        Self(Duration::minutes(30))
    }

    pub fn three_hours() -> Self {
        Self(Duration::hours(3))
    }

    /// Parses one of the four user-selectable labels.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "1m" => Some(Self::one_minute()),
            "5m" => Some(Self::five_minutes()),
            "30m" => Some(Self::thirty_minutes()),
            "3h" => Some(Self::three_hours()),
            _ => None,
        }
    }

    /// Picks a resolution from the window span. Each threshold is inclusive.
    pub fn auto(span: Duration) -> Self {
        if span <= Duration::days(1) {
            Self::one_minute()
        } else if span <= Duration::days(7) {
            Self::five_minutes()
        } else if span <= Duration::days(30) {
            Self::thirty_minutes()
        } else {
            Self::three_hours()
        }
    }

    /// An explicit, recognized token wins; anything else falls back to
    /// [`Resolution::auto`].
    pub fn select(token: Option<&str>, span: Duration) -> Self {
        let token = token.map(str::trim).filter(|t| !t.is_empty());
        if let Some(token) = token {
            if let Some(res) = Self::from_label(token) {
                return res;
            }
            warn!(
                resolution = token,
                valid = %Self::LABELS.join(", "),
                "unrecognized resolution, selecting one from the time range"
            );
        }
        Self::auto(span)
    }

    /// Short label for the four known values, generic duration text otherwise.
    pub fn label(&self) -> String {
        match self.0 {
            d if d == Duration::minutes(1) => "1m".to_string(),
            d if d == Duration::minutes(5) => "5m".to_string(),
            d if d == Duration::minutes(30) => "30m".to_string(),
            d if d == Duration::hours(3) => "3h".to_string(),
            d => format_duration(d),
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

/// Renders a duration as `1h30m0s`, `10m0s`, `45s` or `500ms`.
pub fn format_duration(d: Duration) -> String {
    if d.is_zero() {
        return "0s".to_string();
    }

    let sign = if d < Duration::zero() { "-" } else { "" };
    let total_ms = d.num_milliseconds().unsigned_abs();
    if total_ms < 1000 {
        return format!("{sign}{total_ms}ms");
    }

    let secs = total_ms / 1000;
    let millis = total_ms % 1000;
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;

    let seconds = if millis == 0 {
        seconds.to_string()
    } else {
        let frac = format!("{millis:03}");
        format!("{seconds}.{}", frac.trim_end_matches('0'))
    };

    if hours > 0 {
        format!("{sign}{hours}h{minutes}m{seconds}s")
    } else if minutes > 0 {
        format!("{sign}{minutes}m{seconds}s")
    } else {
        format!("{sign}{seconds}s")
    }
}

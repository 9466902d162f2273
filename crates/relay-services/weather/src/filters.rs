//! The weather service's filters.

use relay_framework::FilterSpec;

/// Name of the capture group holding the location query.
pub const LOCATION: &str = "loc";

/// One filter per command. All are direct-only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherFilter {
    /// `weather alerts <location>`
    Alerts,
    /// `weather <location>`
    Current,
    /// `forecast <location>`
    Forecast,
    /// `help` / `help weather`
    Help,
}

impl WeatherFilter {
    /// Every filter, in registration order.
    pub const ALL: [Self; 4] = [Self::Alerts, Self::Current, Self::Forecast, Self::Help];

    /// The filter name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Alerts => "weather_alerts",
            Self::Current => "current_weather",
            Self::Forecast => "forecast",
            Self::Help => "help",
        }
    }

    /// The pattern source.
    pub fn pattern(self) -> &'static str {
        match self {
            Self::Alerts => r"^(current\s)?weather alerts (for\s)?(?P<loc>(.*))$",
            Self::Current => r"^(current\s)?weather (for\s)?(?P<loc>(.*))$",
            Self::Forecast => r"^forecast (for\s)?(?P<loc>(.*))$",
            Self::Help => r"^help( weather)?$",
        }
    }

    /// The declarative filter.
    ///
    /// `Current` excludes alert commands, so "weather alerts X" has one owner.
    pub fn spec(self) -> FilterSpec {
        let spec = FilterSpec::new(self.name(), [self.pattern()]).direct_only(true);
        match self {
            Self::Current => spec.exclude(Self::Alerts.pattern()),
            _ => spec,
        }
    }
}

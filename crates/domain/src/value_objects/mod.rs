//! Value Objects - Immutable, identity-less domain primitives

mod geo_location;
mod history_query;
mod lookback;
mod reference_time;
mod weather_variable;

pub use geo_location::GeoLocation;
pub use history_query::{HistoryQuery, WINDOW_HOURS};
pub use lookback::{
    ANCHOR_CUTOFF_MONTH, LOOKBACK_YEARS, LookbackWindow, PREVIOUS_ANCHOR_YEAR, RECENT_ANCHOR_YEAR,
};
pub use reference_time::ReferenceTime;
pub use weather_variable::WeatherVariable;

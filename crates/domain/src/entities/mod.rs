//! Domain entities - yearly samples and what is derived from them

mod history;
mod statistics;

pub use history::{HistoryBundle, YearRecord};
pub use statistics::{StatsBundle, VariableStats};

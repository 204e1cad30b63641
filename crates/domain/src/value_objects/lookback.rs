//! Five-year lookback window
//!
//! The archive is complete through mid-2025, so requests for the first five
//! months can include 2025 while later months stop at 2024.

/// Number of past years sampled per request
pub const LOOKBACK_YEARS: i32 = 5;

/// Anchor year for months before the cutoff
pub const RECENT_ANCHOR_YEAR: i32 = 2025;

/// Anchor year for the cutoff month and later
pub const PREVIOUS_ANCHOR_YEAR: i32 = 2024;

/// First month that is not yet available for the recent anchor year
pub const ANCHOR_CUTOFF_MONTH: u32 = 6;

/// Descending run of years to sample for a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LookbackWindow {
    anchor: i32,
}

impl LookbackWindow {
    /// Window for a requested month (1-12)
    #[must_use]
    pub const fn for_month(month: u32) -> Self {
        let anchor = if month < ANCHOR_CUTOFF_MONTH {
            RECENT_ANCHOR_YEAR
        } else {
            PREVIOUS_ANCHOR_YEAR
        };
        Self { anchor }
    }

    /// Most recent year in the window
    #[must_use]
    pub const fn anchor(&self) -> i32 {
        self.anchor
    }

    /// Years from the anchor down to `anchor - 4`
    pub fn years(&self) -> impl Iterator<Item = i32> + use<> {
        let anchor = self.anchor;
        (0..LOOKBACK_YEARS).map(move |offset| anchor - offset)
    }
}

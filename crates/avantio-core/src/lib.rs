// avantio-core: Booking aggregation layer between avantio-api and the host platform.

pub mod aggregator;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::BookingAggregator;
pub use config::AccountConfig;
pub use error::CoreError;
pub use model::{Accommodation, CalendarEvent, RefreshState};

// ── Domain model ──
//
// Calendar-ready types derived from the raw portal rows. Rebuilt in
// full on every refresh; there are no partial updates.

use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Hour of day pinned onto a booking's start date (check-in).
pub const CHECK_IN_HOUR: u32 = 17;
/// Hour of day pinned onto a booking's end date (check-out).
pub const CHECK_OUT_HOUR: u32 = 10;

/// Status name the portal uses for an owner's personal-use block.
pub const OWNER_STATUS: &str = "PROPIETARIO";

/// One calendar event derived from a booking row.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEvent {
    /// Booking id.
    pub uid: String,
    /// Check-in instant (booking start date at 17:00 local).
    pub start: DateTime<Tz>,
    /// Check-out instant (booking end date at 10:00 local).
    pub end: DateTime<Tz>,
    /// Booking id again — the portal has no better short title.
    pub summary: String,
    /// Multi-line guest/earnings/agent text.
    pub description: String,
    /// `false` for the owner's own blocks, `true` for paying stays.
    pub is_rental: bool,
}

/// One property attached to the account, passed through from the raw
/// accommodation list.
#[derive(Debug, Clone, Serialize)]
pub struct Accommodation {
    pub id: String,
    pub name: Option<String>,
    pub city: Option<String>,
    pub image_src: Option<String>,
    pub image_alt: Option<String>,
}

impl From<avantio_api::Accommodation> for Accommodation {
    fn from(raw: avantio_api::Accommodation) -> Self {
        let (image_src, image_alt) = raw
            .image
            .map(|img| (img.src, img.alt))
            .unwrap_or_default();
        Self {
            id: raw.id,
            name: raw.name,
            city: raw.city,
            image_src,
            image_alt,
        }
    }
}

/// Observable refresh lifecycle of the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshState {
    /// No refresh attempted yet; all accessors return empty containers.
    Uninitialized,
    /// A refresh is in flight; the previous snapshot stays readable.
    Refreshing,
    /// The snapshot reflects the last successful refresh.
    Ready,
    /// The last refresh failed; the previous snapshot stays readable
    /// and the failure reason is retained.
    Failed,
}

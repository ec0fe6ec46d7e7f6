// Raw response types for the portal's AJAX endpoints
//
// These mirror the JSON the portal's own web frontend consumes, so they
// are modeled defensively: `#[serde(default)]` everywhere the portal has
// been seen omitting fields, number-or-string tolerance for ids, and a
// catch-all `extra` map for whatever else a page happens to carry.

use serde::{Deserialize, Deserializer, Serialize};

/// Deserialize an id that the portal sends sometimes as a JSON number
/// and sometimes as a string.
fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Str(String),
        Num(i64),
    }
    Ok(match Raw::deserialize(deserializer)? {
        Raw::Str(s) => s,
        Raw::Num(n) => n.to_string(),
    })
}

fn id_string_default() -> String {
    String::new()
}

// ── Pagination envelope ──────────────────────────────────────────────

/// Pagination block attached to paginated responses.
///
/// `total` doubles as the next offset: the portal reports the running
/// item count here and its own frontend feeds that straight back as
/// `offset`, so we do the same.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub has_next_page: bool,
    #[serde(default)]
    pub total: i64,
    #[serde(default)]
    pub total_filtered: Option<i64>,
}

// ── Booking ──────────────────────────────────────────────────────────

/// One booking row from `fetchOwnerBookings`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    #[serde(default = "id_string_default", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default = "id_string_default", deserialize_with = "id_string")]
    pub property_id: String,
    #[serde(default)]
    pub property_name: Option<String>,
    #[serde(default)]
    pub status: BookingStatus,
    #[serde(default)]
    pub guests: Option<Guests>,
    #[serde(default)]
    pub nights_count: Option<i64>,
    #[serde(default)]
    pub date_add: Option<String>,
    /// Check-in date, `"DD Mon YYYY"` text form.
    #[serde(default)]
    pub booking_start: String,
    /// Check-out date, same text form.
    #[serde(default)]
    pub booking_end: String,
    /// Currency-formatted amount string, e.g. `"€ 2,729.58"`.
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub locator: Option<String>,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub agent: Agent,
    /// Catch-all for undocumented fields.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Booking status as displayed by the portal. `"PROPIETARIO"` marks an
/// owner's personal-use block rather than a paying-guest stay.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingStatus {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// Guest headcount breakdown attached to a booking.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Guests {
    #[serde(default)]
    pub num_adults: u32,
    #[serde(default)]
    pub num_children: u32,
    #[serde(default)]
    pub num_babies: u32,
    #[serde(default)]
    pub children_ages: Vec<i64>,
}

/// Booking agent (the channel the stay was booked through).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default = "id_string_default", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
}

// ── Accommodation ────────────────────────────────────────────────────

/// One property row from `fetchAccommodations`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Accommodation {
    #[serde(default = "id_string_default", deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image: Option<AccommodationImage>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Cover image attached to an accommodation.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccommodationImage {
    #[serde(default)]
    pub src: Option<String>,
    #[serde(default)]
    pub alt: Option<String>,
}

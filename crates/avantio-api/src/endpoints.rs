// Booking and accommodation endpoints
//
// Thin typed wrappers over the generic paginated fetch. Each endpoint
// is fully described by its descriptor; nothing here special-cases the
// response shape beyond the dot-path.

use serde_json::{Value, json};
use tracing::debug;

use crate::error::Error;
use crate::models::{Accommodation, Booking};
use crate::pagination::PaginationRequest;
use crate::session::PortalSession;

impl PortalSession {
    /// Fetch every booking visible to the owner account, across all
    /// pages.
    ///
    /// `POST index.php` — module `Compromisos`, function
    /// `fetchOwnerBookings`. The status filter mirrors what the
    /// portal's own frontend requests, including `PROPIETARIO` blocks.
    pub async fn fetch_bookings(&self) -> Result<Vec<Booking>, Error> {
        debug!("fetching bookings from {}", self.base_url());

        let request = PaginationRequest::new("Compromisos", "fetchOwnerBookings", "list")
            .with_params(json_params(json!({
                "dateCheckType": "CHECKIN",
                "sort": "RECENT_TO_OLDEST_CHECKIN",
                "status": ["UNPAID", "CONFIRMADA", "BAJOPETICION", "PROPIETARIO", "PAID"],
            })));

        let rows = self.fetch_paginated(&request).await?;
        deserialize_rows(rows, "booking")
    }

    /// Fetch the accommodations (properties) attached to the account.
    ///
    /// `POST index.php` — module `PlanningPropietarios`, function
    /// `fetchAccommodations`, items under `accommodations`.
    pub async fn fetch_accommodations(&self) -> Result<Vec<Accommodation>, Error> {
        debug!("fetching accommodations from {}", self.base_url());

        let request =
            PaginationRequest::new("PlanningPropietarios", "fetchAccommodations", "accommodations");

        let rows = self.fetch_paginated(&request).await?;
        deserialize_rows(rows, "accommodation")
    }
}

/// Extract the object map out of a `json!({..})` literal.
fn json_params(value: Value) -> serde_json::Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => serde_json::Map::new(),
    }
}

/// Deserialize aggregated rows into a typed list, failing the whole
/// fetch on the first row that no longer matches the expected shape.
fn deserialize_rows<T: serde::de::DeserializeOwned>(
    rows: Vec<Value>,
    kind: &str,
) -> Result<Vec<T>, Error> {
    rows.into_iter()
        .map(|row| {
            serde_json::from_value(row).map_err(|e| Error::MalformedResponse {
                message: format!("unreadable {kind} row: {e}"),
            })
        })
        .collect()
}

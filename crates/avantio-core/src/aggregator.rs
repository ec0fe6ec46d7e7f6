// ── Refresh orchestration ──
//
// Pulls raw bookings and accommodations through the portal session and
// derives the calendar/sensor-ready snapshot: events split by
// rental-vs-owner, total earnings, per-year earnings. The snapshot is
// recomputed wholesale on every refresh — never accumulated — so a
// re-fetch can never double-count earnings.

use std::collections::BTreeMap;

use tracing::{debug, warn};

use avantio_api::{PortalSession, TransportConfig};

use crate::config::AccountConfig;
use crate::convert::{booking_to_event, booking_year, parse_amount};
use crate::error::CoreError;
use crate::model::{Accommodation, CalendarEvent, RefreshState};

/// Everything one successful refresh produces, swapped in atomically.
struct Snapshot {
    events: Vec<CalendarEvent>,
    total_earnings: f64,
    yearly_earnings: BTreeMap<i32, f64>,
    accommodations: Vec<Accommodation>,
}

/// Aggregates portal data into calendar events and earnings figures.
///
/// Holds one [`PortalSession`] per configured account. The external
/// scheduler drives [`refresh`](Self::refresh) (daily cadence) and must
/// serialize calls — refreshes for the same account never run
/// concurrently, which `&mut self` makes compiler-enforced. Between and
/// after refreshes the last known good snapshot remains readable; a
/// failed refresh never clears it.
pub struct BookingAggregator {
    session: PortalSession,
    timezone: chrono_tz::Tz,
    state: RefreshState,
    last_error: Option<CoreError>,
    events: Vec<CalendarEvent>,
    total_earnings: f64,
    yearly_earnings: BTreeMap<i32, f64>,
    accommodations: Vec<Accommodation>,
}

impl BookingAggregator {
    /// Create an aggregator for one account. Does not touch the
    /// network — the first [`refresh`](Self::refresh) signs in.
    pub fn new(config: &AccountConfig) -> Result<Self, CoreError> {
        if config.username.is_empty() {
            return Err(CoreError::Config {
                message: "username must not be empty".into(),
            });
        }

        let transport = TransportConfig {
            timeout: config.timeout,
            ..TransportConfig::default()
        };
        let session = PortalSession::new(
            config.base_url.clone(),
            config.username.clone(),
            config.password.clone(),
            &transport,
        )?;

        Ok(Self {
            session,
            timezone: config.timezone,
            state: RefreshState::Uninitialized,
            last_error: None,
            events: Vec::new(),
            total_earnings: 0.0,
            yearly_earnings: BTreeMap::new(),
            accommodations: Vec::new(),
        })
    }

    // ── Refresh lifecycle ─────────────────────────────────────────────

    /// Fetch everything and rebuild the snapshot.
    ///
    /// All-or-nothing: a failure in either fetch or in any row
    /// conversion aborts the whole refresh, keeps the previous snapshot
    /// readable, and records the failure reason.
    pub async fn refresh(&mut self) -> Result<(), CoreError> {
        self.state = RefreshState::Refreshing;
        debug!("refreshing portal data");

        match self.build_snapshot().await {
            Ok(snapshot) => {
                debug!(
                    events = snapshot.events.len(),
                    accommodations = snapshot.accommodations.len(),
                    total_earnings = snapshot.total_earnings,
                    "refresh complete"
                );
                self.events = snapshot.events;
                self.total_earnings = snapshot.total_earnings;
                self.yearly_earnings = snapshot.yearly_earnings;
                self.accommodations = snapshot.accommodations;
                self.state = RefreshState::Ready;
                self.last_error = None;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "refresh failed, keeping previous snapshot");
                self.state = RefreshState::Failed;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    async fn build_snapshot(&self) -> Result<Snapshot, CoreError> {
        let bookings = self.session.fetch_bookings().await?;
        let raw_accommodations = self.session.fetch_accommodations().await?;

        let mut events = Vec::with_capacity(bookings.len());
        let mut total_earnings = 0.0_f64;
        let mut yearly_earnings: BTreeMap<i32, f64> = BTreeMap::new();

        for booking in &bookings {
            events.push(booking_to_event(booking, self.timezone)?);

            // Every booking counts toward the totals regardless of
            // status, owner blocks included (their amounts are € 0.00).
            let amount = parse_amount(&booking.amount)?;
            total_earnings += amount;
            *yearly_earnings
                .entry(booking_year(&booking.booking_start)?)
                .or_insert(0.0) += amount;
        }

        Ok(Snapshot {
            events,
            total_earnings,
            yearly_earnings,
            accommodations: raw_accommodations.into_iter().map(Into::into).collect(),
        })
    }

    /// Release the portal session. Safe to call at any point.
    pub fn close(&self) {
        self.session.close();
    }

    // ── Read accessors ────────────────────────────────────────────────
    //
    // All of these return empty containers (never an absence) before
    // the first successful refresh.

    /// Current refresh lifecycle state.
    pub fn state(&self) -> RefreshState {
        self.state
    }

    /// The reason the last refresh failed, if it did.
    pub fn last_error(&self) -> Option<&CoreError> {
        self.last_error.as_ref()
    }

    /// All bookings, guest stays and owner blocks alike.
    pub fn bookings(&self) -> &[CalendarEvent] {
        &self.events
    }

    /// Bookings by paying guests only.
    pub fn rental_bookings(&self) -> Vec<&CalendarEvent> {
        self.events.iter().filter(|e| e.is_rental).collect()
    }

    /// The owner's own blocks only.
    pub fn owner_bookings(&self) -> Vec<&CalendarEvent> {
        self.events.iter().filter(|e| !e.is_rental).collect()
    }

    /// Sum of all de-localized booking amounts.
    pub fn total_earnings(&self) -> f64 {
        self.total_earnings
    }

    /// Earnings bucketed by the year each booking starts in.
    pub fn yearly_earnings(&self) -> &BTreeMap<i32, f64> {
        &self.yearly_earnings
    }

    /// Properties attached to the account.
    pub fn accommodations(&self) -> &[Accommodation] {
        &self.accommodations
    }
}

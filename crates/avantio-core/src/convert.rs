// ── Raw-row-to-domain conversions ──
//
// Bridges raw `avantio_api` booking rows into calendar events and
// earnings figures. The portal hands out display strings, not data:
// amounts arrive currency-formatted, dates arrive as "DD Mon YYYY"
// text with no time of day, and the guest breakdown is assembled into
// the exact human-readable form the portal's own calendar shows.

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta};
use chrono_tz::Tz;

use avantio_api::{Booking, Guests};

use crate::error::CoreError;
use crate::model::{CHECK_IN_HOUR, CHECK_OUT_HOUR, CalendarEvent, OWNER_STATUS};

/// Text form the portal uses for booking dates.
const DATE_FORMAT: &str = "%d %b %Y";

/// Sentinel shown when a booking carries no guest data at all.
const UNKNOWN_GUESTS: &str = "**Unknown**";

// ── Amounts ──────────────────────────────────────────────────────────

/// De-localize a currency-formatted amount string (`"€ 2,729.58"`)
/// into a number: strip the thousands separator and the currency
/// symbol, then parse.
pub(crate) fn parse_amount(raw: &str) -> Result<f64, CoreError> {
    let cleaned = raw.replace([',', '€'], "");
    cleaned
        .trim()
        .parse::<f64>()
        .map_err(|_| CoreError::RefreshFailed {
            message: format!("unparseable booking amount: {raw:?}"),
        })
}

// ── Dates ────────────────────────────────────────────────────────────

/// Parse a `"DD Mon YYYY"` booking date and pin a fixed hour of day in
/// the configured time zone. The portal carries no time of day, so
/// check-in/check-out hours are a fixed modeling convention; keeping
/// them stable keeps event ordering and display stable.
///
/// An ambiguous local time (DST fall-back) resolves to the earlier
/// instant; a nonexistent one (spring-forward) slides forward an hour,
/// staying on the booking's calendar date.
pub(crate) fn parse_date_with_hour(
    raw: &str,
    hour: u32,
    timezone: Tz,
) -> Result<DateTime<Tz>, CoreError> {
    let date = NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|_| CoreError::RefreshFailed {
        message: format!("unparseable booking date: {raw:?}"),
    })?;
    let naive = date
        .and_hms_opt(hour, 0, 0)
        .ok_or_else(|| CoreError::RefreshFailed {
            message: format!("invalid pinned hour {hour} for date {raw:?}"),
        })?;
    naive
        .and_local_timezone(timezone)
        .earliest()
        .or_else(|| {
            // The pinned hour fell into a DST gap; the skipped span is
            // at most an hour, so one step lands on a valid time.
            naive
                .checked_add_signed(TimeDelta::hours(1))
                .and_then(|next| next.and_local_timezone(timezone).earliest())
        })
        .ok_or_else(|| CoreError::RefreshFailed {
            message: format!("no valid instant for {raw:?} at {hour}:00 in {timezone}"),
        })
}

/// Calendar year a booking starts in, used for the per-year earnings
/// buckets.
pub(crate) fn booking_year(booking_start: &str) -> Result<i32, CoreError> {
    NaiveDate::parse_from_str(booking_start, DATE_FORMAT)
        .map(|date| date.year())
        .map_err(|_| CoreError::RefreshFailed {
            message: format!("unparseable booking date: {booking_start:?}"),
        })
}

// ── Guests ───────────────────────────────────────────────────────────

/// Render the guest breakdown the way the portal's calendar shows it:
/// total headcount first, then the non-zero categories, then any
/// positive children ages. All-zero counts render as an empty string;
/// absent guest data renders as the unknown sentinel.
pub(crate) fn stringify_guests(guests: Option<&Guests>) -> String {
    let Some(guests) = guests else {
        return UNKNOWN_GUESTS.to_string();
    };

    let mut parts: Vec<String> = Vec::new();

    let total = guests.num_adults + guests.num_children + guests.num_babies;
    if total > 0 {
        parts.push(format!("{total} personnes"));
    }

    let mut breakdown: Vec<String> = Vec::new();
    if guests.num_adults > 0 {
        breakdown.push(format!("{} adultes", guests.num_adults));
    }
    if guests.num_children > 0 {
        breakdown.push(format!("{} enfants", guests.num_children));
    }
    if guests.num_babies > 0 {
        breakdown.push(format!("{} bébés", guests.num_babies));
    }

    let ages: Vec<String> = guests
        .children_ages
        .iter()
        .filter(|age| **age > 0)
        .map(ToString::to_string)
        .collect();

    let mut details: Vec<String> = Vec::new();
    if !breakdown.is_empty() {
        details.push(breakdown.join(", "));
    }
    if !ages.is_empty() {
        details.push(format!("(ages {} ans)", ages.join(", ")));
    }
    if !details.is_empty() {
        parts.push(details.join(" "));
    }

    parts.join(" – ")
}

// ── Events ───────────────────────────────────────────────────────────

/// Build the event description: guest line, amount line, blank
/// separator, and the booking channel when one is named.
fn description(booking: &Booking) -> String {
    let mut lines = vec![
        format!("🧑‍🧑‍🧒‍🧒 {}", stringify_guests(booking.guests.as_ref())),
        format!("💸 {}", booking.amount),
        String::new(),
    ];
    if !booking.agent.name.is_empty() {
        lines.push(format!("Réservé via {}", booking.agent.name));
    }
    lines.join("\n")
}

/// Map one raw booking row to a calendar event.
///
/// The `PROPIETARIO` status marks the owner's own block; every other
/// status is a paying rental.
pub(crate) fn booking_to_event(
    booking: &Booking,
    timezone: Tz,
) -> Result<CalendarEvent, CoreError> {
    Ok(CalendarEvent {
        uid: booking.id.clone(),
        start: parse_date_with_hour(&booking.booking_start, CHECK_IN_HOUR, timezone)?,
        end: parse_date_with_hour(&booking.booking_end, CHECK_OUT_HOUR, timezone)?,
        summary: booking.id.clone(),
        description: description(booking),
        is_rental: booking.status.name != OWNER_STATUS,
    })
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use avantio_api::{Agent, BookingStatus};
    use chrono::Timelike;

    fn booking(status: &str, agent_name: &str) -> Booking {
        serde_json::from_value(serde_json::json!({
            "id": "B-1",
            "status": { "name": status },
            "guests": { "numAdults": 2, "numChildren": 0, "numBabies": 0, "childrenAges": [] },
            "bookingStart": "01 Jan 2026",
            "bookingEnd": "08 Jan 2026",
            "amount": "€ 500.00",
            "agent": { "id": "1", "name": agent_name }
        }))
        .expect("valid booking")
    }

    #[test]
    fn amounts_are_delocalized() {
        assert_eq!(parse_amount("€ 2,729.58").expect("parses"), 2729.58);
        assert_eq!(parse_amount("€ 0.00").expect("parses"), 0.0);
        assert_eq!(parse_amount("1,234,567.89").expect("parses"), 1_234_567.89);
    }

    #[test]
    fn garbage_amount_is_a_refresh_failure() {
        let err = parse_amount("N/A").expect_err("must not parse");
        assert!(matches!(err, CoreError::RefreshFailed { .. }));
    }

    #[test]
    fn dates_are_pinned_to_the_fixed_hours() {
        let tz = chrono_tz::Europe::Madrid;
        let start = parse_date_with_hour("03 Jul 2026", CHECK_IN_HOUR, tz).expect("parses");
        assert_eq!(start.hour(), 17);
        assert_eq!(start.date_naive(), NaiveDate::from_ymd_opt(2026, 7, 3).expect("valid"));

        let end = parse_date_with_hour("10 Jul 2026", CHECK_OUT_HOUR, tz).expect("parses");
        assert_eq!(end.hour(), 10);
    }

    #[test]
    fn dst_gap_resolves_within_the_same_day() {
        // Spring-forward morning in Madrid: 02:00 does not exist on
        // this date, the clock jumps straight to 03:00.
        let tz = chrono_tz::Europe::Madrid;
        let resolved = parse_date_with_hour("29 Mar 2026", 2, tz).expect("resolves");
        assert_eq!(resolved.hour(), 3);
        assert_eq!(
            resolved.date_naive(),
            NaiveDate::from_ymd_opt(2026, 3, 29).expect("valid")
        );
    }

    #[test]
    fn booking_year_comes_from_the_start_date() {
        assert_eq!(booking_year("31 Dec 2025").expect("parses"), 2025);
        assert_eq!(booking_year("01 Jan 2026").expect("parses"), 2026);
    }

    #[test]
    fn guest_summary_lists_total_breakdown_and_ages() {
        let guests = Guests {
            num_adults: 6,
            num_children: 2,
            num_babies: 0,
            children_ages: vec![3, 3],
        };
        let text = stringify_guests(Some(&guests));
        assert_eq!(text, "8 personnes – 6 adultes, 2 enfants (ages 3, 3 ans)");
    }

    #[test]
    fn all_zero_guest_counts_render_empty() {
        let guests = Guests::default();
        assert_eq!(stringify_guests(Some(&guests)), "");
    }

    #[test]
    fn absent_guest_data_renders_the_unknown_sentinel() {
        assert_eq!(stringify_guests(None), "**Unknown**");
    }

    #[test]
    fn non_positive_children_ages_are_dropped() {
        let guests = Guests {
            num_adults: 1,
            num_children: 1,
            num_babies: 0,
            children_ages: vec![0, -1, 5],
        };
        let text = stringify_guests(Some(&guests));
        assert_eq!(text, "2 personnes – 1 adultes, 1 enfants (ages 5 ans)");
    }

    #[test]
    fn owner_status_is_not_a_rental() {
        let tz = chrono_tz::UTC;
        let event = booking_to_event(&booking("PROPIETARIO", ""), tz).expect("converts");
        assert!(!event.is_rental);

        let event = booking_to_event(&booking("CONFIRMADA", ""), tz).expect("converts");
        assert!(event.is_rental);
        let event = booking_to_event(&booking("UNPAID", ""), tz).expect("converts");
        assert!(event.is_rental);
    }

    #[test]
    fn description_names_the_agent_when_present() {
        let tz = chrono_tz::UTC;
        let event = booking_to_event(&booking("CONFIRMADA", "Airbnb"), tz).expect("converts");
        assert_eq!(
            event.description,
            "🧑‍🧑‍🧒‍🧒 2 personnes – 2 adultes\n💸 € 500.00\n\nRéservé via Airbnb"
        );
    }

    #[test]
    fn description_omits_the_agent_line_when_unnamed() {
        let tz = chrono_tz::UTC;
        let event = booking_to_event(&booking("CONFIRMADA", ""), tz).expect("converts");
        assert_eq!(
            event.description,
            "🧑‍🧑‍🧒‍🧒 2 personnes – 2 adultes\n💸 € 500.00\n"
        );
    }

    #[test]
    fn event_uid_and_summary_are_the_booking_id() {
        let tz = chrono_tz::UTC;
        let event = booking_to_event(&booking("CONFIRMADA", ""), tz).expect("converts");
        assert_eq!(event.uid, "B-1");
        assert_eq!(event.summary, "B-1");
    }

    #[test]
    fn unparseable_date_fails_the_conversion() {
        let tz = chrono_tz::UTC;
        let mut row = booking("CONFIRMADA", "");
        row.booking_start = "sometime next week".into();
        let err = booking_to_event(&row, tz).expect_err("must not convert");
        assert!(matches!(err, CoreError::RefreshFailed { .. }));
    }

    #[test]
    fn unused_agent_fields_do_not_affect_the_event() {
        let tz = chrono_tz::UTC;
        let mut row = booking("CONFIRMADA", "Booking.com");
        row.agent = Agent {
            id: "9".into(),
            name: "Booking.com".into(),
            image: Some("https://cdn.example/logo.png".into()),
            color: Some("#003b95".into()),
        };
        row.status = BookingStatus {
            name: "PAID".into(),
            color: Some("#2e7d32".into()),
        };
        let event = booking_to_event(&row, tz).expect("converts");
        assert!(event.description.ends_with("Réservé via Booking.com"));
        assert!(event.is_rental);
    }
}

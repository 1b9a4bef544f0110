//! Text rendering of list rows and the detail overlay.

use std::fmt::Write as _;

use call_stream_feed_models::{ServiceRequest, parse_feed_timestamp};
use console::style;

/// Formats a feed timestamp for display, falling back to the raw string
/// when it doesn't parse and `N/A` when it is absent.
#[must_use]
pub fn format_date(value: Option<&str>) -> String {
    value.map_or_else(
        || "N/A".to_owned(),
        |raw| {
            parse_feed_timestamp(raw).map_or_else(
                || raw.to_owned(),
                |dt| dt.format("%b %-d, %Y %H:%M").to_string(),
            )
        },
    )
}

/// Colors a case status: open red, closed green, in progress yellow,
/// anything else dim (the status set is open-ended upstream).
#[must_use]
pub fn styled_status(status: &str) -> String {
    let styled = match status.to_lowercase().as_str() {
        "open" => style(status).red(),
        "closed" => style(status).green(),
        "in_progress" | "in progress" => style(status).yellow(),
        _ => style(status).dim(),
    };
    styled.to_string()
}

/// One list row: title, status, location, opened date, photo marker.
#[must_use]
pub fn list_row(record: &ServiceRequest) -> String {
    let photos = if record.submitted_photo.is_some() || record.closed_photo.is_some() {
        " [photo]"
    } else {
        ""
    };

    format!(
        "{} [{}] {} (opened {}){}",
        record.case_title.to_lowercase(),
        styled_status(&record.case_status),
        record.location,
        format_date(record.open_dt.as_deref()),
        photos,
    )
}

/// The full detail overlay for one incident, sectioned like the map UI:
/// header, photos, location, timeline, department.
#[must_use]
pub fn detail(record: &ServiceRequest) -> String {
    let mut out = String::new();

    writeln!(
        out,
        "{} #{} [{}]",
        record.case_title,
        record.case_enquiry_id,
        styled_status(&record.case_status)
    )
    .unwrap();

    if record.submitted_photo.is_some() || record.closed_photo.is_some() {
        writeln!(out, "\nPhotos").unwrap();
        if let Some(url) = &record.submitted_photo {
            writeln!(out, "  Submitted:  {}", photo_url(url)).unwrap();
        }
        if let Some(url) = &record.closed_photo {
            writeln!(out, "  Resolution: {}", photo_url(url)).unwrap();
        }
    }

    writeln!(out, "\nLocation").unwrap();
    writeln!(out, "  {}", record.location).unwrap();
    if let Some(neighborhood) = &record.neighborhood {
        writeln!(out, "  Neighborhood: {neighborhood}").unwrap();
    }

    writeln!(out, "\nTimeline").unwrap();
    writeln!(out, "  Opened: {}", format_date(record.open_dt.as_deref())).unwrap();
    if record.closed_dt.is_some() {
        writeln!(out, "  Closed: {}", format_date(record.closed_dt.as_deref())).unwrap();
    }
    if record.sla_target_dt.is_some() {
        writeln!(
            out,
            "  SLA target: {} ({})",
            format_date(record.sla_target_dt.as_deref()),
            record.on_time
        )
        .unwrap();
    }

    writeln!(out, "\nDepartment").unwrap();
    writeln!(out, "  Department: {}", record.department).unwrap();
    writeln!(out, "  Type: {}", record.request_type).unwrap();
    writeln!(out, "  Queue: {}", record.queue).unwrap();
    writeln!(out, "  Source: {}", record.source).unwrap();

    out
}

/// Strips the fragment some photo URLs carry after `#`.
#[must_use]
pub fn photo_url(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

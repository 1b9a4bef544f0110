#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! 311 service request record type, field schema, and validation.
//!
//! The feed is a CSV export whose columns map 1:1 onto [`ServiceRequest`]
//! fields. [`FIELDS`] is the declarative schema (column name + required
//! flag) and [`ServiceRequest::from_fields`] is the validator: a row missing
//! any required value is rejected, never defaulted.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// One column of the feed schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// CSV column name.
    pub name: &'static str,
    /// Whether the source guarantees a non-empty value for this column.
    pub required: bool,
}

/// The declarative feed schema: every column the record type consumes.
///
/// Columns present in the feed but not listed here are ignored. Required
/// columns missing from the feed header cause every row to fail validation.
pub const FIELDS: &[FieldSpec] = &[
    FieldSpec { name: "case_enquiry_id", required: true },
    FieldSpec { name: "open_dt", required: false },
    FieldSpec { name: "sla_target_dt", required: false },
    FieldSpec { name: "closed_dt", required: false },
    FieldSpec { name: "on_time", required: true },
    FieldSpec { name: "case_status", required: true },
    FieldSpec { name: "closure_reason", required: true },
    FieldSpec { name: "case_title", required: true },
    FieldSpec { name: "subject", required: true },
    FieldSpec { name: "reason", required: true },
    FieldSpec { name: "type", required: true },
    FieldSpec { name: "queue", required: true },
    FieldSpec { name: "department", required: true },
    FieldSpec { name: "submitted_photo", required: false },
    FieldSpec { name: "closed_photo", required: false },
    FieldSpec { name: "location", required: true },
    FieldSpec { name: "fire_district", required: false },
    FieldSpec { name: "pwd_district", required: false },
    FieldSpec { name: "city_council_district", required: false },
    FieldSpec { name: "police_district", required: false },
    FieldSpec { name: "neighborhood", required: false },
    FieldSpec { name: "neighborhood_services_district", required: false },
    FieldSpec { name: "ward", required: false },
    FieldSpec { name: "precinct", required: false },
    FieldSpec { name: "location_street_name", required: false },
    FieldSpec { name: "location_zipcode", required: false },
    FieldSpec { name: "latitude", required: true },
    FieldSpec { name: "longitude", required: true },
    FieldSpec { name: "geom_4326", required: true },
    FieldSpec { name: "source", required: true },
];

/// Errors that can occur while validating a single feed row.
///
/// Always scoped to one row: the caller logs and skips, the batch continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// A required column was present in the header but empty for this row.
    #[error("row {row}: required field '{field}' has no value")]
    MissingField {
        /// 1-based position of the row among the decoded data rows.
        row: u32,
        /// Name of the offending column.
        field: &'static str,
    },

    /// A required column was missing from the feed header entirely.
    #[error("row {row}: required column '{field}' not present in header")]
    MissingColumn {
        /// 1-based position of the row among the decoded data rows.
        row: u32,
        /// Name of the missing column.
        field: &'static str,
    },
}

/// A validated 311 service request.
///
/// String fields are stored exactly as the source exports them —
/// `latitude`/`longitude` keep the source's decimal precision and
/// `case_status` is an open set, since the upstream system is authoritative
/// and may introduce new values at any time. Identity across views is
/// `case_enquiry_id`; `seq_id` exists only as a fallback key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// 1-based position of the row among the decoded data rows. Fallback
    /// identity only — never used for sorting. Rows dropped during
    /// normalization still consume their position, so gaps are normal.
    pub seq_id: u32,
    /// Source-assigned case identifier, opaque and unique within a fetch.
    pub case_enquiry_id: String,
    /// When the case was opened. `None` for malformed source rows.
    pub open_dt: Option<String>,
    /// SLA target timestamp.
    pub sla_target_dt: Option<String>,
    /// When the case was closed.
    pub closed_dt: Option<String>,
    /// Whether the case met its SLA (`"ONTIME"` / `"OVERDUE"`).
    pub on_time: String,
    /// Case status (`"Open"`, `"Closed"`, ... — open set, not an enum).
    pub case_status: String,
    /// Free-text closure note.
    pub closure_reason: String,
    /// Short case title.
    pub case_title: String,
    /// Owning subject area.
    pub subject: String,
    /// Request reason grouping.
    pub reason: String,
    /// Request type (CSV column `type`).
    #[serde(rename = "type")]
    pub request_type: String,
    /// Work queue the case is assigned to.
    pub queue: String,
    /// Owning department code.
    pub department: String,
    /// Photo submitted with the request, if any.
    pub submitted_photo: Option<String>,
    /// Photo attached at resolution, if any.
    pub closed_photo: Option<String>,
    /// Free-text location.
    pub location: String,
    /// Fire district code.
    pub fire_district: Option<String>,
    /// Public works district code.
    pub pwd_district: Option<String>,
    /// City council district code.
    pub city_council_district: Option<String>,
    /// Police district code.
    pub police_district: Option<String>,
    /// Neighborhood name.
    pub neighborhood: Option<String>,
    /// Neighborhood services district code.
    pub neighborhood_services_district: Option<String>,
    /// Voting ward.
    pub ward: Option<String>,
    /// Voting precinct.
    pub precinct: Option<String>,
    /// Street name component of the location.
    pub location_street_name: Option<String>,
    /// ZIP code component of the location.
    pub location_zipcode: Option<String>,
    /// Latitude as a decimal string, preserving source precision.
    pub latitude: String,
    /// Longitude as a decimal string, preserving source precision.
    pub longitude: String,
    /// WKT point geometry from the source.
    pub geom_4326: String,
    /// Channel the request came in through (e.g. `"Citizens Connect App"`).
    pub source: String,
}

impl ServiceRequest {
    /// Validates a decoded row and builds a `ServiceRequest` from it.
    ///
    /// `fields` maps column name to the row's value, where `None` marks a
    /// blank cell. Extra columns are ignored. No coercion is applied beyond
    /// string identity; the synthetic `seq_id` is the only non-string field.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] on the first required field that is blank
    /// or whose column is absent from the header.
    #[allow(clippy::too_many_lines)]
    pub fn from_fields(
        seq_id: u32,
        fields: &BTreeMap<String, Option<String>>,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            seq_id,
            case_enquiry_id: required(fields, seq_id, "case_enquiry_id")?,
            open_dt: optional(fields, "open_dt"),
            sla_target_dt: optional(fields, "sla_target_dt"),
            closed_dt: optional(fields, "closed_dt"),
            on_time: required(fields, seq_id, "on_time")?,
            case_status: required(fields, seq_id, "case_status")?,
            closure_reason: required(fields, seq_id, "closure_reason")?,
            case_title: required(fields, seq_id, "case_title")?,
            subject: required(fields, seq_id, "subject")?,
            reason: required(fields, seq_id, "reason")?,
            request_type: required(fields, seq_id, "type")?,
            queue: required(fields, seq_id, "queue")?,
            department: required(fields, seq_id, "department")?,
            submitted_photo: optional(fields, "submitted_photo"),
            closed_photo: optional(fields, "closed_photo"),
            location: required(fields, seq_id, "location")?,
            fire_district: optional(fields, "fire_district"),
            pwd_district: optional(fields, "pwd_district"),
            city_council_district: optional(fields, "city_council_district"),
            police_district: optional(fields, "police_district"),
            neighborhood: optional(fields, "neighborhood"),
            neighborhood_services_district: optional(fields, "neighborhood_services_district"),
            ward: optional(fields, "ward"),
            precinct: optional(fields, "precinct"),
            location_street_name: optional(fields, "location_street_name"),
            location_zipcode: optional(fields, "location_zipcode"),
            latitude: required(fields, seq_id, "latitude")?,
            longitude: required(fields, seq_id, "longitude")?,
            geom_4326: required(fields, seq_id, "geom_4326")?,
            source: required(fields, seq_id, "source")?,
        })
    }

    /// When the case was opened, parsed to an orderable instant.
    ///
    /// Returns `None` when `open_dt` is absent or unparseable — the two are
    /// treated identically for ordering.
    #[must_use]
    pub fn opened_at(&self) -> Option<DateTime<Utc>> {
        self.open_dt.as_deref().and_then(parse_feed_timestamp)
    }

    /// When the case was closed, parsed to an instant.
    #[must_use]
    pub fn closed_at(&self) -> Option<DateTime<Utc>> {
        self.closed_dt.as_deref().and_then(parse_feed_timestamp)
    }

    /// The record's map position, when its lat/lng strings parse to finite
    /// in-range coordinates.
    ///
    /// Records returning `None` stay visible in lists but are excluded from
    /// map placement and never trigger camera-focus commands.
    #[must_use]
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.latitude.parse::<f64>().ok()?;
        let longitude = self.longitude.parse::<f64>().ok()?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return None;
        }
        if latitude.abs() > 90.0 || longitude.abs() > 180.0 {
            return None;
        }
        Some((latitude, longitude))
    }
}

/// Parses a feed timestamp string (space- or `T`-separated, with optional
/// fractional seconds). Feed timestamps carry no zone and are taken as UTC.
#[must_use]
pub fn parse_feed_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    None
}

/// Extracts a required field, failing on a blank cell or a missing column.
fn required(
    fields: &BTreeMap<String, Option<String>>,
    row: u32,
    field: &'static str,
) -> Result<String, ValidationError> {
    match fields.get(field) {
        Some(Some(value)) => Ok(value.clone()),
        Some(None) => Err(ValidationError::MissingField { row, field }),
        None => Err(ValidationError::MissingColumn { row, field }),
    }
}

/// Extracts an optional field; blank cells and missing columns are `None`.
fn optional(fields: &BTreeMap<String, Option<String>>, field: &str) -> Option<String> {
    fields.get(field).and_then(Clone::clone)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_fields() -> BTreeMap<String, Option<String>> {
        FIELDS
            .iter()
            .map(|spec| {
                let value = match spec.name {
                    "latitude" => "42.3601",
                    "longitude" => "-71.0589",
                    "open_dt" => "2025-07-01 08:12:00",
                    other => other,
                };
                (spec.name.to_owned(), Some(value.to_owned()))
            })
            .collect()
    }

    #[test]
    fn builds_record_from_complete_row() {
        let record = ServiceRequest::from_fields(1, &complete_fields()).unwrap();

        assert_eq!(record.seq_id, 1);
        assert_eq!(record.case_enquiry_id, "case_enquiry_id");
        assert_eq!(record.request_type, "type");
        assert_eq!(record.open_dt.as_deref(), Some("2025-07-01 08:12:00"));
    }

    #[test]
    fn schema_agrees_with_validator() {
        // Blanking each column one at a time must fail exactly the
        // required ones.
        for spec in FIELDS {
            let mut fields = complete_fields();
            fields.insert(spec.name.to_owned(), None);

            let result = ServiceRequest::from_fields(7, &fields);
            if spec.required {
                assert_eq!(
                    result,
                    Err(ValidationError::MissingField {
                        row: 7,
                        field: spec.name,
                    }),
                    "blank required column '{}' should be rejected",
                    spec.name
                );
            } else {
                assert!(
                    result.is_ok(),
                    "blank optional column '{}' should be accepted",
                    spec.name
                );
            }
        }
    }

    #[test]
    fn missing_column_is_distinct_from_blank_cell() {
        let mut fields = complete_fields();
        fields.remove("case_status");

        assert_eq!(
            ServiceRequest::from_fields(3, &fields),
            Err(ValidationError::MissingColumn {
                row: 3,
                field: "case_status",
            })
        );
    }

    #[test]
    fn parses_space_separated_timestamp() {
        let dt = parse_feed_timestamp("2025-07-01 08:12:00").unwrap();
        assert_eq!(dt.to_string(), "2025-07-01 08:12:00 UTC");
    }

    #[test]
    fn parses_iso_timestamp_with_fraction() {
        let dt = parse_feed_timestamp("2025-07-01T08:12:00.500").unwrap();
        assert_eq!(dt.to_string(), "2025-07-01 08:12:00.500 UTC");
    }

    #[test]
    fn rejects_garbage_timestamp() {
        assert!(parse_feed_timestamp("not-a-date").is_none());
    }

    #[test]
    fn coordinates_parse_when_finite() {
        let record = ServiceRequest::from_fields(1, &complete_fields()).unwrap();
        let (lat, lng) = record.coordinates().unwrap();
        assert!((lat - 42.3601).abs() < f64::EPSILON);
        assert!((lng - -71.0589).abs() < f64::EPSILON);
    }

    #[test]
    fn coordinates_reject_non_numeric() {
        let mut record = ServiceRequest::from_fields(1, &complete_fields()).unwrap();
        record.latitude = "null".to_owned();
        assert!(record.coordinates().is_none());
    }

    #[test]
    fn coordinates_reject_out_of_range() {
        let mut record = ServiceRequest::from_fields(1, &complete_fields()).unwrap();
        record.longitude = "211.5".to_owned();
        assert!(record.coordinates().is_none());
    }

    #[test]
    fn unparseable_open_dt_is_treated_as_missing() {
        let mut record = ServiceRequest::from_fields(1, &complete_fields()).unwrap();
        record.open_dt = Some("garbled".to_owned());
        assert!(record.opened_at().is_none());
    }
}

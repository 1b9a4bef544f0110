//! Normalization pipeline: raw feed text in, bounded sorted record set out.
//!
//! Per-row problems (wrong field count, failed validation) drop that row and
//! continue — one garbled row never aborts a batch. The only fatal condition
//! is a feed with no header row.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use call_stream_feed_models::ServiceRequest;

use crate::{FeedError, csv};

/// Maximum number of records in the result set: the 100 most recent.
pub const RESULT_LIMIT: usize = 100;

/// Normalizes raw feed text into the bounded, most-recent-first record set.
///
/// Each surviving record carries its 1-based physical row position as
/// `seq_id`; dropped rows still consume a position. Records are sorted by
/// open timestamp descending, with records lacking a parseable timestamp
/// after all that have one, then truncated to [`RESULT_LIMIT`].
///
/// # Errors
///
/// Returns [`FeedError::Decode`] when the feed has no header row. All
/// per-row failures are logged and skipped.
pub fn normalize(text: &str) -> Result<Vec<ServiceRequest>, FeedError> {
    let feed = csv::decode(text)?;
    let column_count = feed.header.len();
    let raw_count = feed.rows.len();

    let mut records: Vec<ServiceRequest> = Vec::new();
    let mut dropped_shape: u64 = 0;
    let mut dropped_invalid: u64 = 0;

    for (index, row) in feed.rows.iter().enumerate() {
        let seq_id = u32::try_from(index + 1).unwrap_or(u32::MAX);

        if row.len() != column_count {
            dropped_shape += 1;
            log::debug!(
                "row {seq_id}: {} fields, expected {column_count} — dropping",
                row.len()
            );
            continue;
        }

        // The export cannot distinguish "empty" from "absent", so blank
        // cells become null before validation.
        let fields: BTreeMap<String, Option<String>> = feed
            .header
            .iter()
            .cloned()
            .zip(row.iter().map(|value| {
                if value.is_empty() {
                    None
                } else {
                    Some(value.clone())
                }
            }))
            .collect();

        match ServiceRequest::from_fields(seq_id, &fields) {
            Ok(record) => records.push(record),
            Err(e) => {
                dropped_invalid += 1;
                log::warn!("Skipping row: {e}");
            }
        }
    }

    let valid_count = records.len();

    // Stable sort: `None` ordering puts missing/unparseable timestamps
    // after every real one, and ties keep their decode order.
    records.sort_by_cached_key(|record| Reverse(record.opened_at()));
    records.truncate(RESULT_LIMIT);

    log::info!(
        "Normalized {valid_count} of {raw_count} raw rows ({dropped_shape} malformed, \
         {dropped_invalid} invalid), keeping {}",
        records.len()
    );

    Ok(records)
}

//! Minimal quote-aware CSV decoder for the 311 feed export.
//!
//! The feed is machine-generated with a fixed shape, so this is deliberately
//! not a full RFC 4180 parser: a double quote toggles quoting, a comma splits
//! fields only outside quotes, and every field is trimmed. Known limitations:
//! escaped quotes inside quoted fields (`""`) are not handled, and a quoted
//! field cannot span physical lines. Rows that come out with the wrong field
//! count are dropped downstream by the pipeline, not here, so that sequence
//! numbers keep tracking physical row positions.

use crate::FeedError;

/// A decoded feed: the header column names plus every physical data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFeed {
    /// Column names from the first physical line.
    pub header: Vec<String>,
    /// Field values of every following line, in file order. Field counts
    /// are not validated against the header.
    pub rows: Vec<Vec<String>>,
}

/// Decodes raw feed text into a header and data rows.
///
/// # Errors
///
/// Returns [`FeedError::Decode`] when the input is empty or whitespace-only
/// (no header row). This is the only fatal decode condition.
pub fn decode(text: &str) -> Result<DecodedFeed, FeedError> {
    let mut lines = text.trim().lines();

    let Some(header_line) = lines.next() else {
        return Err(FeedError::Decode {
            message: "feed contains no header row".to_owned(),
        });
    };

    let header = split_line(header_line);
    let rows: Vec<Vec<String>> = lines.map(split_line).collect();

    log::debug!("Decoded {} columns, {} data rows", header.len(), rows.len());

    Ok(DecodedFeed { header, rows })
}

/// Splits one physical line into trimmed field values.
///
/// Quote characters toggle quoting and are not included in the output,
/// matching how the upstream export quotes fields containing commas.
#[must_use]
pub fn split_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(current.trim().to_owned());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    fields.push(current.trim().to_owned());
    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_plain_fields() {
        assert_eq!(split_line("a,b,c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(split_line(" a , b ,c "), vec!["a", "b", "c"]);
    }

    #[test]
    fn keeps_quoted_comma_in_one_field() {
        assert_eq!(
            split_line(r#"101,"123 Main St, Apt 4",Open"#),
            vec!["101", "123 Main St, Apt 4", "Open"]
        );
    }

    #[test]
    fn preserves_empty_fields() {
        assert_eq!(split_line("a,,c,"), vec!["a", "", "c", ""]);
    }

    #[test]
    fn decodes_header_and_rows() {
        let feed = decode("id,name\n1,alpha\n2,beta\n").unwrap();
        assert_eq!(feed.header, vec!["id", "name"]);
        assert_eq!(feed.rows, vec![vec!["1", "alpha"], vec!["2", "beta"]]);
    }

    #[test]
    fn header_only_feed_has_no_rows() {
        let feed = decode("id,name\n").unwrap();
        assert!(feed.rows.is_empty());
    }

    #[test]
    fn empty_input_is_a_decode_error() {
        assert!(matches!(decode(""), Err(FeedError::Decode { .. })));
        assert!(matches!(decode("  \n \n"), Err(FeedError::Decode { .. })));
    }

    #[test]
    fn handles_crlf_line_endings() {
        let feed = decode("id,name\r\n1,alpha\r\n").unwrap();
        assert_eq!(feed.rows, vec![vec!["1", "alpha"]]);
    }
}

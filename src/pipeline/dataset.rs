//! Review dataset loading.
//!
//! Reads review rows from CSV by header name: a `comment` text column plus
//! `rating` and `product_id` metadata columns (extra columns are ignored).
//! Missing values are defaulted the way the ingestion scripts defaulted them
//! (text to the empty string, numbers to zero), and rows whose text is too
//! short to be worth embedding are skipped.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use serde::Deserialize;

use crate::error::Result;

/// One review ready for ingestion.
#[derive(Debug, Clone, PartialEq)]
pub struct ReviewRow {
    /// Review text.
    pub comment: String,
    /// Star rating.
    pub rating: f32,
    /// Reviewed product id.
    pub product_id: i64,
}

/// Raw CSV shape; `Option` lets empty cells and absent columns deserialize,
/// defaulted in [`ReviewRow`].
#[derive(Debug, Deserialize)]
struct RawRow {
    comment: Option<String>,
    rating: Option<f32>,
    product_id: Option<i64>,
}

impl From<RawRow> for ReviewRow {
    fn from(raw: RawRow) -> Self {
        ReviewRow {
            comment: raw.comment.unwrap_or_default(),
            rating: raw.rating.unwrap_or(0.0),
            product_id: raw.product_id.unwrap_or(0),
        }
    }
}

/// Read reviews from a CSV file.
///
/// Rows whose comment is shorter than `min_text_len` characters are dropped.
pub fn read_reviews<P: AsRef<Path>>(path: P, min_text_len: usize) -> Result<Vec<ReviewRow>> {
    let file = File::open(path.as_ref())?;
    read_reviews_from_reader(file, min_text_len)
}

/// Read reviews from any CSV source with a header row.
pub fn read_reviews_from_reader<R: Read>(reader: R, min_text_len: usize) -> Result<Vec<ReviewRow>> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut rows = Vec::new();
    let mut skipped = 0usize;
    for raw in csv_reader.deserialize::<RawRow>() {
        let row = ReviewRow::from(raw?);
        if row.comment.chars().count() < min_text_len {
            skipped += 1;
            continue;
        }
        rows.push(row);
    }
    if skipped > 0 {
        log::debug!(
            "skipped {} rows with comments shorter than {} characters",
            skipped,
            min_text_len
        );
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_rows() {
        let csv = "comment,rating,product_id\n\
                   Great blender and very quiet.,5,100\n\
                   Stopped working after one week.,1,200\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows[0],
            ReviewRow {
                comment: "Great blender and very quiet.".to_string(),
                rating: 5.0,
                product_id: 100,
            }
        );
        assert_eq!(rows[1].product_id, 200);
    }

    #[test]
    fn test_empty_cells_default() {
        let csv = "comment,rating,product_id\n\
                   No rating or product attached here.,,\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, 0.0);
        assert_eq!(rows[0].product_id, 0);
    }

    #[test]
    fn test_short_comments_skipped() {
        let csv = "comment,rating,product_id\n\
                   ok,3,100\n\
                   This one is long enough to keep.,4,200\n\
                   ,2,300\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].product_id, 200);
    }

    #[test]
    fn test_extra_columns_ignored() {
        let csv = "comment,rating,product_id,verified\n\
                   Sturdy base and sharp blades.,4,300,true\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, 4.0);
    }

    #[test]
    fn test_missing_columns_default() {
        let csv = "comment\n\
                   Only the text column is present here.\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rating, 0.0);
        assert_eq!(rows[0].product_id, 0);
    }

    #[test]
    fn test_quoted_commas() {
        let csv = "comment,rating,product_id\n\
                   \"Loud, but it gets the job done.\",3,400\n";
        let rows = read_reviews_from_reader(csv.as_bytes(), 10).unwrap();
        assert_eq!(rows[0].comment, "Loud, but it gets the job done.");
    }

    #[test]
    fn test_malformed_numeric_is_an_error() {
        let csv = "comment,rating,product_id\n\
                   The rating column holds garbage.,not-a-number,100\n";
        assert!(read_reviews_from_reader(csv.as_bytes(), 10).is_err());
    }
}

//! Shared helpers for Crocus examples.
//!
//! Provides a small review dataset and print helpers so that each example can
//! focus on demonstrating its specific feature rather than repeating
//! boilerplate.

#![allow(dead_code)]

use crocus::pipeline::{ReviewHit, ReviewRow};

// ---------------------------------------------------------------------------
// Sample data
// ---------------------------------------------------------------------------

/// A handful of product reviews in the shape the pipeline ingests.
pub fn sample_reviews() -> Vec<ReviewRow> {
    [
        (
            "Absolutely love this blender, quiet and powerful enough for frozen fruit.",
            5.0,
            100,
        ),
        (
            "The blender jar started leaking from the base after two weeks.",
            2.0,
            100,
        ),
        (
            "Battery life on these headphones is outstanding, a full week per charge.",
            5.0,
            200,
        ),
        (
            "Headphones stopped charging after a month, very disappointed.",
            1.0,
            200,
        ),
        (
            "The kettle boils fast but the lid leaks water when pouring.",
            2.0,
            300,
        ),
        (
            "Decent kettle for the price, nothing fancy but it works.",
            3.0,
            300,
        ),
        (
            "This vacuum picks up pet hair better than models twice the price.",
            5.0,
            400,
        ),
        (
            "Vacuum is far too loud and the dust bin is tiny.",
            2.0,
            400,
        ),
        (
            "Comfortable office chair, my back pain is gone after a month.",
            4.0,
            500,
        ),
        (
            "The chair's armrest snapped off during assembly.",
            1.0,
            500,
        ),
    ]
    .into_iter()
    .map(|(comment, rating, product_id)| ReviewRow {
        comment: comment.to_string(),
        rating,
        product_id,
    })
    .collect()
}

// ---------------------------------------------------------------------------
// Print helpers
// ---------------------------------------------------------------------------

/// Print ranked review hits in a human-readable format.
pub fn print_hits(hits: &[ReviewHit]) {
    if hits.is_empty() {
        println!("  (No results found)");
        return;
    }
    for (i, hit) in hits.iter().enumerate() {
        let comment = if hit.comment.len() > 80 {
            format!("{}...", &hit.comment[..80])
        } else {
            hit.comment.clone()
        };
        println!("  {}. (similarity: {:.4})", i + 1, hit.similarity);
        println!("     comment: {}", comment);
        println!("     rating: {:.1}  product_id: {}", hit.rating, hit.product_id);
    }
}

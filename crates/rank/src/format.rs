//! Rendering of selected candidates into a bounded text block
//!
//! Item layout:
//!
//! ```text
//! [1] <title>
//! Price: $899 | Availability: In stock | Category: Distiller
//! Capacity: 10 gal | Features: Copper, 220V electric
//! <description>
//! ```
//!
//! Items are separated by a blank line and followed by the configured
//! trailer, byte-identical on every call. The capacity/features line is
//! omitted when the document has neither.

use sift_core::{Candidate, Document, FormatConfig};
use sift_index::parser::truncate_chars;
use sift_index::CorpusSnapshot;

/// Shown in place of a missing price
const PRICE_UNKNOWN: &str = "Contact us";

/// Bounded result renderer
#[derive(Debug, Clone, Default)]
pub struct ResultFormatter {
    cfg: FormatConfig,
}

impl ResultFormatter {
    /// Create with the given settings
    pub fn new(cfg: FormatConfig) -> Self {
        ResultFormatter { cfg }
    }

    /// Active settings
    pub fn config(&self) -> &FormatConfig {
        &self.cfg
    }

    /// Fallback sentence plus trailer
    pub fn fallback(&self) -> String {
        self.with_trailer(&self.cfg.fallback)
    }

    /// Render `selected` in order.
    ///
    /// Items are added while the block, trailer included, stays within
    /// `max_block_chars`. The first item is always rendered, with its
    /// description shortened if needed. Candidates missing from `snapshot`
    /// are skipped; nothing renderable yields [`fallback`](Self::fallback).
    pub fn format(&self, selected: &[Candidate], snapshot: &CorpusSnapshot) -> String {
        let docs: Vec<&Document> = selected
            .iter()
            .filter_map(|c| snapshot.document(c.doc_id))
            .collect();
        if docs.is_empty() {
            return self.fallback();
        }

        // "\n\n" before the trailer
        let trailer_len = self.cfg.trailer.chars().count() + 2;
        let budget = self.cfg.max_block_chars.saturating_sub(trailer_len);

        let mut body = String::new();
        let mut used = 0usize;
        for (i, doc) in docs.iter().enumerate() {
            let mut item = render_item(i + 1, doc, self.cfg.description_chars);
            let sep = if i == 0 { 0 } else { 2 };
            let len = item.chars().count();

            if used + sep + len > budget {
                if i > 0 {
                    break;
                }
                item = shrink_first(i + 1, doc, self.cfg.description_chars, budget);
            }

            if i > 0 {
                body.push_str("\n\n");
            }
            used += sep + item.chars().count();
            body.push_str(&item);
        }

        self.with_trailer(&body)
    }

    fn with_trailer(&self, body: &str) -> String {
        format!("{}\n\n{}", body, self.cfg.trailer)
    }
}

fn header(rank: usize, doc: &Document) -> String {
    let fields = &doc.fields;
    let price = match fields.price {
        Some(p) => p.to_string(),
        None => PRICE_UNKNOWN.to_string(),
    };
    let mut out = format!(
        "[{}] {}\nPrice: {} | Availability: {} | Category: {}",
        rank,
        doc.title,
        price,
        fields.availability.label(),
        fields.category.label()
    );

    let mut extras: Vec<String> = Vec::new();
    if let Some(gallons) = fields.capacity_gallons {
        extras.push(format!("Capacity: {} gal", format_gallons(gallons)));
    }
    if !fields.features.is_empty() {
        let labels: Vec<&str> = fields.features.iter().map(|f| f.label()).collect();
        extras.push(format!("Features: {}", labels.join(", ")));
    }
    if !extras.is_empty() {
        out.push('\n');
        out.push_str(&extras.join(" | "));
    }
    out
}

fn render_item(rank: usize, doc: &Document, description_chars: usize) -> String {
    let mut out = header(rank, doc);
    let description = truncate_chars(&doc.raw_text, description_chars);
    if !description.is_empty() {
        out.push('\n');
        out.push_str(&description);
    }
    out
}

/// First item cut down to `budget`: description shortened, header kept
fn shrink_first(rank: usize, doc: &Document, description_chars: usize, budget: usize) -> String {
    let head = header(rank, doc);
    let room = budget.saturating_sub(head.chars().count() + 1);
    if room == 0 {
        return head;
    }
    render_item(rank, doc, description_chars.min(room))
}

fn format_gallons(gallons: f32) -> String {
    if (gallons - gallons.round()).abs() < 0.05 {
        format!("{:.0}", gallons)
    } else {
        format!("{:.1}", gallons)
    }
}

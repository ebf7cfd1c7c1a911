// src/extract/mod.rs
// =============================================================================
// Markup extraction for the listing site.
//
// The pipeline only needs three answers from a document: how many listing
// pages there are, which items a listing page links to, and which assets an
// item page offers. Everything selector-specific lives in html.rs.
// =============================================================================

mod html;

pub use html::{extract_asset_links, extract_listing_links, extract_page_count};

// src/urls.rs
// =============================================================================
// URL and path derivation shared by every pipeline level.
//
// - dedup_key: asset URL -> file name ("{collection}-{file}")
// - listing_page_url: listing URL + page number -> page URL
// - site_origin: the value sent in Origin/Referer
// - partial_path: where an in-progress download is written
// =============================================================================

use crate::error::CrawlError;
use std::path::{Path, PathBuf};
use url::Url;

// Minimum number of '/'-separated components in an asset URL:
// "https:", "", host, collection, file
const MIN_ASSET_COMPONENTS: usize = 5;

const PARTIAL_SUFFIX: &str = ".part";

// Derives the DedupKey of an asset URL.
//
// The key is the last two '/'-separated components joined with '-'. It is
// both the "already downloaded?" check and the stored file name.
//
// Example:
//   "https://cdn.example.com/files/series/vol1.pdf" -> "series-vol1.pdf"
pub fn dedup_key(url: &str) -> Result<String, CrawlError> {
    let components: Vec<&str> = url.split('/').collect();

    if components.len() < MIN_ASSET_COMPONENTS {
        return Err(CrawlError::malformed(
            url,
            format!(
                "expected at least {} '/'-separated components, found {}",
                MIN_ASSET_COMPONENTS,
                components.len()
            ),
        ));
    }

    let collection = components[components.len() - 2];
    let file = components[components.len() - 1];

    for part in [collection, file] {
        if part.is_empty() || part == "." || part == ".." {
            return Err(CrawlError::malformed(
                url,
                format!("`{}` cannot be used in a file name", part),
            ));
        }
    }

    Ok(format!("{}-{}", collection, file))
}

// "{listing}/page/{n}", tolerating a trailing slash on the listing URL
pub fn listing_page_url(listing: &Url, page: u32) -> String {
    format!("{}/page/{}", listing.as_str().trim_end_matches('/'), page)
}

// "https://example.com/" for any URL on example.com
pub fn site_origin(url: &Url) -> String {
    format!("{}/", url.origin().ascii_serialization())
}

pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(PARTIAL_SUFFIX);
    PathBuf::from(name)
}

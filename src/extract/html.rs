// src/extract/html.rs
// =============================================================================
// Site-specific extraction from listing, item and root pages.
//
// We use the `scraper` crate to query the DOM with CSS selectors and the
// `url` crate to resolve relative hrefs against the page they came from.
//
// Three documents, three extractors:
// - listing root: the last pagination link holds the total page count
// - listing page: one `.post` per item, its "more" link points at the item
// - item page: a <select> whose options carry the asset URLs in `?file=`
// =============================================================================

use crate::error::ExtractError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

const PAGE_NUMBER_SELECTOR: &str = "a[class='page-numbers']";
const POST_SELECTOR: &str = ".post";
const ENTRY_CONTENT_SELECTOR: &str = "div[class='entry-content']";
const MORE_LINK_SELECTOR: &str = "a[class='more-link']";
const ASSET_SELECT_SELECTOR: &str = "select#selector.vi13";
const OPTION_SELECTOR: &str = "option";

const FILE_PARAMETER: &str = "?file=";

/// One entry of a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingLink {
    pub url: String,
    /// The post is hidden by its own inline style and must not be crawled
    pub hidden: bool,
}

// All selectors are constants; parsing can only fail on a typo in this file
fn selector(css: &'static str) -> Selector {
    Selector::parse(css).expect("selector constants are valid CSS")
}

// Reads the total number of listing pages from the listing root.
//
// The pagination control ends with the highest page number:
//   <a class="page-numbers">2</a> ... <a class="page-numbers">42</a>
// ("next" links carry extra classes and are not matched)
pub fn extract_page_count(html: &str) -> Result<u32, ExtractError> {
    let document = Html::parse_document(html);
    let last = document
        .select(&selector(PAGE_NUMBER_SELECTOR))
        .last()
        .ok_or(ExtractError::MissingElement {
            selector: PAGE_NUMBER_SELECTOR,
        })?;

    let text = element_text(last);
    text.parse::<u32>()
        .map_err(|_| ExtractError::InvalidPageCount { text })
}

// Extracts the item links of one listing page, in document order.
//
// A post with a non-empty `style` attribute (even whitespace) is hidden.
// The "more" link is looked up inside the post's first entry-content div
// only. A visible post without it means the page layout changed, which is
// an error; a hidden one is dropped since it would be filtered anyway.
pub fn extract_listing_links(html: &str, base: &Url) -> Result<Vec<ListingLink>, ExtractError> {
    let document = Html::parse_document(html);
    let entry_content = selector(ENTRY_CONTENT_SELECTOR);
    let more_link = selector(MORE_LINK_SELECTOR);
    let mut links = Vec::new();

    for post in document.select(&selector(POST_SELECTOR)) {
        let hidden = post
            .value()
            .attr("style")
            .map(|style| !style.is_empty())
            .unwrap_or(false);

        let href = post
            .select(&entry_content)
            .next()
            .and_then(|content| content.select(&more_link).next())
            .and_then(|a| a.value().attr("href"));

        match (href, hidden) {
            (Some(href), _) => {
                if let Some(url) = resolve_url(base, href) {
                    links.push(ListingLink { url, hidden });
                } else if !hidden {
                    return Err(ExtractError::MissingAttribute {
                        selector: MORE_LINK_SELECTOR,
                        attribute: "href",
                    });
                }
            }
            (None, true) => continue,
            (None, false) => {
                return Err(ExtractError::MissingElement {
                    selector: MORE_LINK_SELECTOR,
                })
            }
        }
    }

    Ok(links)
}

// Extracts the asset URLs of one item page, in option order.
//
// Each option value is a viewer link with the real file in its query:
//   "https://site/viewer.html?file=https://cdn.site/files/series/vol1.pdf"
// Everything after the first `?file=` is the asset URL.
pub fn extract_asset_links(html: &str, base: &Url) -> Result<Vec<String>, ExtractError> {
    let document = Html::parse_document(html);
    let select = document
        .select(&selector(ASSET_SELECT_SELECTOR))
        .next()
        .ok_or(ExtractError::MissingElement {
            selector: ASSET_SELECT_SELECTOR,
        })?;

    let mut urls = Vec::new();
    for option in select.select(&selector(OPTION_SELECTOR)) {
        let value = option
            .value()
            .attr("value")
            .ok_or(ExtractError::MissingAttribute {
                selector: OPTION_SELECTOR,
                attribute: "value",
            })?;

        let (_, file) = value
            .split_once(FILE_PARAMETER)
            .ok_or_else(|| ExtractError::MissingFileParameter {
                value: value.to_string(),
            })?;

        let url = asset_url(base, file).ok_or_else(|| ExtractError::MissingFileParameter {
            value: value.to_string(),
        })?;
        urls.push(url);
    }

    Ok(urls)
}

// Resolves a possibly-relative URL against the page it was found on
//
//   base = "https://example.com/page"
//   href = "/docs"             -> Some("https://example.com/docs")
//   href = "https://other.com" -> Some("https://other.com/")
fn resolve_url(base: &Url, href: &str) -> Option<String> {
    match Url::parse(href) {
        Ok(url) => Some(url.to_string()),
        Err(_) => base.join(href).ok().map(|url| url.to_string()),
    }
}

// An absolute `?file=` value is kept exactly as written. Its last two path
// segments become the file name, and serialising through Url would
// percent-encode non-ASCII segments:
//   "https://cdn.site/uploads/シリーズ/第1巻.pdf" stays as is
// Relative values are resolved against the item page.
fn asset_url(base: &Url, file: &str) -> Option<String> {
    match Url::parse(file) {
        Ok(_) => Some(file.to_string()),
        Err(_) => base.join(file).ok().map(|url| url.to_string()),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

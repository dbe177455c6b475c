use scraper::{Html, Selector};
use std::sync::OnceLock;
use wgwatch_browser::RawAnchor;
use wgwatch_core::Listing;

/// Path prefix shared by every listing detail page.
pub const DETAIL_PREFIX: &str = "/wglink/";

fn anchor_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("valid selector"))
}

/// Listings linked from an HTML document or fragment, in document order.
///
/// Anchors that do not point at a detail page, or whose URL carries no
/// id, are skipped.
pub fn parse_listings(html: &str) -> Vec<Listing> {
    let document = Html::parse_document(html);
    document
        .select(anchor_selector())
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?;
            if !href.contains(DETAIL_PREFIX) {
                return None;
            }
            Listing::from_anchor(href, &anchor.inner_html())
        })
        .collect()
}

/// Listings from anchors read off a live page.
pub fn listings_from_anchors(anchors: Vec<RawAnchor>) -> Vec<Listing> {
    anchors
        .into_iter()
        .filter_map(|anchor| Listing::from_anchor(&anchor.href, &anchor.text))
        .collect()
}

/// Render listings as the site's results list, so a page that never showed
/// results can be extracted the same way as one that did.
pub fn render_results_html(listings: &[Listing]) -> String {
    let mut html = String::from("<ul id=\"search-result-list\">");
    for listing in listings {
        html.push_str("<li class=\"search-mate-entry\"><a href=\"");
        html.push_str(&html_escape::encode_double_quoted_attribute(&listing.href));
        html.push_str("\">");
        html.push_str(&html_escape::encode_text(&listing.summary));
        html.push_str("</a></li>");
    }
    html.push_str("</ul>");
    html
}

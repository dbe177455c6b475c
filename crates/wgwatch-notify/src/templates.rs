use wgwatch_core::Listing;

/// First line of every notification.
pub const HEADLINE: &str = "Neue WG-Zimmer-Anzeige gefunden:";

/// Message text for a listing, safe for Telegram's HTML parse mode.
pub fn format_message(listing: &Listing) -> String {
    format!(
        "{HEADLINE}\n{}\n{}",
        html_escape::encode_text(&listing.summary),
        listing.href
    )
}

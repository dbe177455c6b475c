use url::Url;

/// Site root.
pub const HOME_URL: &str = "https://www.wgzimmer.ch";

/// Search endpoint, also the search form page.
pub const SEARCH_URL: &str = "https://www.wgzimmer.ch/wgzimmer/search/mate.html";

/// Page a visitor comes from when opening the search form.
pub const LANDING_URL: &str = "https://www.wgzimmer.ch/wgzimmer/search/room.html";

/// Path of the search form, relative to [`HOME_URL`].
pub const SEARCH_PATH: &str = "/wgzimmer/search/mate.html";

/// Search parameters in the order the site's own form sends them.
pub fn search_params(query: &str) -> Vec<(&'static str, String)> {
    vec![
        ("startSearch", "true".to_string()),
        ("g-recaptcha-response", String::new()),
        ("bypass-csrf", "true".to_string()),
        ("query", query.to_string()),
        ("priceMin", "200".to_string()),
        ("priceMax", "2000".to_string()),
        ("wgState", "all".to_string()),
        ("permanent", "all".to_string()),
        ("studio", "false".to_string()),
        ("student", "none".to_string()),
        ("typeofwg", "all".to_string()),
    ]
}

/// Canonical results URL for a query against `endpoint`.
pub fn build_search_url_at(endpoint: &str, query: &str) -> Result<Url, url::ParseError> {
    Url::parse_with_params(endpoint, search_params(query))
}

/// Canonical results URL for a query.
pub fn build_search_url(query: &str) -> String {
    match build_search_url_at(SEARCH_URL, query) {
        Ok(url) => url.to_string(),
        // SEARCH_URL is a constant absolute URL
        Err(_) => SEARCH_URL.to_string(),
    }
}

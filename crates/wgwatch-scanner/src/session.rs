//! Browser-driven search.
//!
//! Drives one chromium session through the site's own search form: home
//! page, consent banner, search form, CAPTCHA readiness, typed query,
//! submission, then results. Every stage that has alternatives walks an
//! ordered list of strategies and only the CAPTCHA wait is a hard stop.

use crate::error::{Result, ScanError};
use crate::parser::{listings_from_anchors, render_results_html};
use crate::source::ListingSource;
use crate::url_builder::{build_search_url, HOME_URL, SEARCH_PATH, SEARCH_URL};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use wgwatch_browser::{poll_until, BrowserActions, Launcher, Pacing, PollPolicy};
use wgwatch_core::Listing;

/// CSS selectors and scripts for the site's markup.
pub mod selectors {
    pub const CONSENT_BUTTON: &str = "p.fc-button-label";
    pub const LOGO: &str = r#"a[title="wgzimmer.ch"]"#;
    pub const SEARCH_TILE: &str = r#"a[href="/wgzimmer/search/mate.html"]"#;
    pub const QUERY_INPUT: &str = r#"input[name="query"]"#;
    pub const SEARCH_BUTTON: &str = r#"input[type="button"][value="Suchen"]"#;
    pub const RESULT_ENTRIES: &str = "#search-result-list li.search-mate-entry";
    pub const ENTRY_ANCHORS: &str = "li.search-mate-entry a";

    pub const CAPTCHA_READY: &str =
        "typeof grecaptcha !== 'undefined' && typeof grecaptcha.execute === 'function'";
    pub const SUBMIT_FORM: &str = "typeof submitForm === 'function' && (submitForm(), true)";
}

use selectors::{
    CAPTCHA_READY, CONSENT_BUTTON, ENTRY_ANCHORS, LOGO, QUERY_INPUT, RESULT_ENTRIES,
    SEARCH_BUTTON, SEARCH_TILE, SUBMIT_FORM,
};

/// Bounded waits of the flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Timings {
    pub consent: Duration,
    /// How long a click that opens another page may take to load it
    pub navigation: Duration,
    pub query_input: Duration,
    pub captcha: PollPolicy,
    pub submit_rounds: u32,
    /// Navigation allowance of one submit round
    pub submit_navigation: Duration,
    /// Extra allowance for results entries on top of `submit_navigation`
    pub submit_results: Duration,
    pub results: Duration,
    pub results_after_navigation: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            consent: Duration::from_secs(5),
            navigation: Duration::from_secs(15),
            query_input: Duration::from_secs(15),
            captcha: PollPolicy::new(Duration::from_millis(500), Duration::from_secs(30)),
            submit_rounds: 5,
            submit_navigation: Duration::from_secs(20),
            submit_results: Duration::from_secs(5),
            results: Duration::from_secs(75),
            results_after_navigation: Duration::from_secs(45),
        }
    }
}

/// Ways to submit the search form, tried in order each round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitStrategy {
    ClickSearchButton,
    CallSubmitForm,
}

impl SubmitStrategy {
    pub const ORDER: [Self; 2] = [Self::ClickSearchButton, Self::CallSubmitForm];

    async fn apply(self, page: &dyn BrowserActions) -> Result<()> {
        match self {
            Self::ClickSearchButton => page.click(SEARCH_BUTTON).await?,
            Self::CallSubmitForm => page.run_script(SUBMIT_FORM).await?,
        }
        Ok(())
    }
}

/// Ways to end up on a page showing results, tried in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultsStrategy {
    /// Wait for the submitted search to render its results
    AwaitResults,
    /// Load the canonical results URL in the page
    NavigateToResultsUrl,
    /// Fetch results over plain HTTP and render them into the page
    DirectFetch,
}

impl ResultsStrategy {
    pub const ORDER: [Self; 3] = [
        Self::AwaitResults,
        Self::NavigateToResultsUrl,
        Self::DirectFetch,
    ];
}

/// Scrapes listings through a real browser session.
pub struct BrowserScraper {
    launcher: Arc<dyn Launcher>,
    fallback: Arc<dyn ListingSource>,
    pacing: Pacing,
    timings: Timings,
}

impl BrowserScraper {
    /// `fallback` is the direct source used as the last results strategy.
    pub fn new(launcher: Arc<dyn Launcher>, fallback: Arc<dyn ListingSource>) -> Self {
        Self {
            launcher,
            fallback,
            pacing: Pacing::default(),
            timings: Timings::default(),
        }
    }

    #[must_use]
    pub fn with_pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    #[must_use]
    pub fn with_timings(mut self, timings: Timings) -> Self {
        self.timings = timings;
        self
    }

    /// Launch a session, search, extract, and close the session again
    /// whatever the outcome.
    pub async fn scrape(&self, query: &str) -> Result<Vec<Listing>> {
        let session = self.launcher.launch().await?;
        let outcome = self.drive(session.page(), query).await;
        session.close().await;

        match &outcome {
            Ok(listings) => tracing::info!("Browser search found {} listing(s)", listings.len()),
            Err(e) => tracing::warn!("Browser search failed: {}", e),
        }
        outcome
    }

    async fn drive(&self, page: &dyn BrowserActions, query: &str) -> Result<Vec<Listing>> {
        self.open_search_form(page).await?;
        self.await_captcha(page).await?;
        self.humanize(page).await;

        if self.enter_query(page, query).await {
            self.submit(page).await;
        }

        self.ensure_results(page, query).await?;
        self.extract(page).await
    }

    async fn open_search_form(&self, page: &dyn BrowserActions) -> Result<()> {
        tracing::info!("Opening {}", HOME_URL);
        if let Err(e) = page.navigate(HOME_URL).await {
            tracing::warn!("Home page navigation failed: {}", e);
        }
        self.dismiss_consent(page).await;

        self.pacing.pause().await;
        match page.click(LOGO).await {
            Ok(()) => {
                self.await_load(page).await;
                self.dismiss_consent(page).await;
            }
            Err(e) => tracing::debug!("Logo click skipped: {}", e),
        }

        if page.exists(SEARCH_TILE).await.unwrap_or(false) {
            self.pacing.pause().await;
            match page.click(SEARCH_TILE).await {
                Ok(()) => {
                    self.await_load(page).await;
                    self.dismiss_consent(page).await;
                }
                Err(e) => tracing::warn!("Search tile click failed: {}", e),
            }
        } else {
            tracing::warn!("Search tile not found, navigating to the form directly");
        }

        let url = page.current_url().await.unwrap_or_default();
        if !url.contains(SEARCH_PATH) {
            tracing::debug!("Not on the search form ({}), loading {}", url, SEARCH_URL);
            page.navigate(SEARCH_URL).await?;
            self.dismiss_consent(page).await;
        }
        Ok(())
    }

    async fn dismiss_consent(&self, page: &dyn BrowserActions) {
        if page
            .wait_for_selector(CONSENT_BUTTON, self.timings.consent)
            .await
            .is_err()
        {
            return;
        }
        self.pacing.pause().await;
        match page.click(CONSENT_BUTTON).await {
            Ok(()) => tracing::debug!("Consent banner dismissed"),
            Err(e) => tracing::debug!("Consent banner click failed: {}", e),
        }
    }

    async fn await_load(&self, page: &dyn BrowserActions) {
        if let Err(e) = page.wait_for_load(self.timings.navigation).await {
            tracing::debug!("Page load not confirmed: {}", e);
        }
    }

    async fn await_captcha(&self, page: &dyn BrowserActions) -> Result<()> {
        poll_until("grecaptcha ready", self.timings.captcha, move || async move {
            page.evaluate_bool(CAPTCHA_READY).await.unwrap_or(false)
        })
        .await
        .map_err(|e| ScanError::CaptchaNotReady(e.to_string()))?;
        tracing::debug!("CAPTCHA script ready");
        self.pacing.pause().await;
        Ok(())
    }

    async fn humanize(&self, page: &dyn BrowserActions) {
        self.pacing.pause().await;
        for _ in 0..2 {
            let (x, y) = (Pacing::jitter(100.0, 400.0), Pacing::jitter(100.0, 300.0));
            if let Err(e) = page.move_pointer(x, y).await {
                tracing::debug!("Pointer move failed: {}", e);
            }
        }
        if let Err(e) = page.scroll_by(Pacing::jitter(200.0, 400.0)).await {
            tracing::debug!("Scroll failed: {}", e);
        }
        self.pacing.pause().await;
    }

    /// Type the query into the form. Returns `false` when there is no form
    /// to submit.
    async fn enter_query(&self, page: &dyn BrowserActions, query: &str) -> bool {
        if let Err(e) = page
            .wait_for_selector(QUERY_INPUT, self.timings.query_input)
            .await
        {
            tracing::warn!("Query input not found, skipping submission: {}", e);
            return false;
        }

        self.pacing.pause().await;
        if let Err(e) = self.type_query(page, query).await {
            tracing::debug!("Typing failed ({}), filling the field at once", e);
            if let Err(e) = page.fill_field(QUERY_INPUT, query).await {
                tracing::warn!("Could not enter the query: {}", e);
            }
        }
        true
    }

    async fn type_query(&self, page: &dyn BrowserActions, query: &str) -> Result<()> {
        page.fill_field(QUERY_INPUT, "").await?;
        for ch in query.chars() {
            page.type_char(QUERY_INPUT, ch).await?;
            self.pacing.keystroke().await;
        }
        Ok(())
    }

    async fn submit(&self, page: &dyn BrowserActions) {
        let form_url = page.current_url().await.unwrap_or_default();

        for round in 1..=self.timings.submit_rounds {
            self.pacing.pause().await;
            for strategy in SubmitStrategy::ORDER {
                if let Err(e) = strategy.apply(page).await {
                    tracing::debug!("{:?} failed in round {}: {}", strategy, round, e);
                }
            }

            if self.submitted(page, &form_url).await {
                tracing::info!("Search submitted (round {})", round);
                return;
            }
            tracing::warn!(
                "No response to submission (round {}/{})",
                round,
                self.timings.submit_rounds
            );
        }
    }

    /// Wait for either success signal: a navigation away from the form to a
    /// search URL, or results entries in the page. Either one counts at any
    /// point of the round.
    async fn submitted(&self, page: &dyn BrowserActions, form_url: &str) -> bool {
        let deadline = self.timings.submit_navigation + self.timings.submit_results;

        poll_until("search submitted", PollPolicy::within(deadline), move || async move {
            let url = page.current_url().await.unwrap_or_default();
            if url != form_url && url.contains("search/mate") {
                return true;
            }
            page.exists(RESULT_ENTRIES).await.unwrap_or(false)
        })
        .await
        .is_ok()
    }

    async fn ensure_results(&self, page: &dyn BrowserActions, query: &str) -> Result<()> {
        let mut first_error = None;
        for strategy in ResultsStrategy::ORDER {
            match self.apply_results_strategy(strategy, page, query).await {
                Ok(()) => {
                    tracing::debug!("Results available via {:?}", strategy);
                    return Ok(());
                }
                Err(e) => {
                    tracing::warn!("{:?} failed: {}", strategy, e);
                    first_error.get_or_insert(e);
                }
            }
        }
        Err(first_error.unwrap_or_else(|| ScanError::Scrape("no results strategy".to_string())))
    }

    async fn apply_results_strategy(
        &self,
        strategy: ResultsStrategy,
        page: &dyn BrowserActions,
        query: &str,
    ) -> Result<()> {
        match strategy {
            ResultsStrategy::AwaitResults => {
                page.wait_for_selector(RESULT_ENTRIES, self.timings.results)
                    .await?;
            }
            ResultsStrategy::NavigateToResultsUrl => {
                page.navigate(&build_search_url(query)).await?;
                page.wait_for_selector(RESULT_ENTRIES, self.timings.results_after_navigation)
                    .await?;
            }
            ResultsStrategy::DirectFetch => {
                let listings = self.fallback.fetch(query).await?;
                if listings.is_empty() {
                    return Err(ScanError::Scrape(
                        "direct fallback returned no listings".to_string(),
                    ));
                }
                page.set_content(&render_results_html(&listings)).await?;
            }
        }
        Ok(())
    }

    async fn extract(&self, page: &dyn BrowserActions) -> Result<Vec<Listing>> {
        let anchors = page.anchors(ENTRY_ANCHORS).await?;
        let listings = listings_from_anchors(anchors);
        if listings.is_empty() {
            return Err(ScanError::Scrape("no listings found after search".to_string()));
        }
        Ok(listings)
    }
}

#[async_trait]
impl ListingSource for BrowserScraper {
    fn name(&self) -> &'static str {
        "browser"
    }

    async fn fetch(&self, query: &str) -> Result<Vec<Listing>> {
        self.scrape(query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timings() {
        let timings = Timings::default();
        assert_eq!(timings.captcha.interval, Duration::from_millis(500));
        assert_eq!(timings.captcha.deadline, Duration::from_secs(30));
        assert_eq!(timings.submit_rounds, 5);
        assert_eq!(timings.results, Duration::from_secs(75));
        assert_eq!(timings.results_after_navigation, Duration::from_secs(45));
    }

    #[test]
    fn test_strategy_order() {
        assert_eq!(SubmitStrategy::ORDER[0], SubmitStrategy::ClickSearchButton);
        assert_eq!(ResultsStrategy::ORDER[2], ResultsStrategy::DirectFetch);
    }
}

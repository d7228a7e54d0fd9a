// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Crawl Orchestrator
 * Bounded-concurrency same-domain crawl that hands every new page to the
 * page checks and form probers
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary
 */

use crate::errors::{AuditError, AuditResult, StoreError};
use crate::forms::extract_forms;
use crate::http_client::{FetchRequest, Fetcher};
use crate::scanners::{AuthChecks, FormProber};
use crate::session::ScanSession;
use crate::url_utils::{hostname, is_static_asset, normalize, same_domain};
use anyhow::Result;
use scraper::{Html, Selector};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

/// Crawl lifecycle for one run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Idle,
    Crawling,
    Drained,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    pub pages_fetched: usize,
    pub pages_redirected: usize,
    pub pages_dropped: usize,
    pub forms_probed: usize,
}

/// What one page task hands back to the orchestrator
#[derive(Debug, Default)]
struct PageOutcome {
    links: Vec<String>,
    fetched: bool,
    redirected: bool,
    forms_probed: usize,
}

/// Shared handles cloned into every page task
#[derive(Clone)]
struct PageContext {
    fetcher: Arc<dyn Fetcher>,
    prober: Arc<FormProber>,
    auth: Arc<AuthChecks>,
    session: Arc<ScanSession>,
    domain: String,
}

pub struct Crawler {
    fetcher: Arc<dyn Fetcher>,
    prober: Arc<FormProber>,
    auth: Arc<AuthChecks>,
    max_concurrency: usize,
    max_pages: usize,
    state: CrawlState,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn Fetcher>,
        prober: Arc<FormProber>,
        max_concurrency: usize,
        max_pages: usize,
    ) -> Self {
        Self {
            auth: Arc::new(AuthChecks::new(Arc::clone(&fetcher))),
            fetcher,
            prober,
            max_concurrency: max_concurrency.max(1),
            max_pages,
            state: CrawlState::Idle,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    /// Crawl from `seed` until the frontier is empty and nothing is in flight.
    ///
    /// Every URL is claimed in the session's visited set when enqueued, so it
    /// is fetched at most once. Fetch failures drop the page; store failures
    /// and cancellation stop spawning, drain in-flight tasks and are returned.
    pub async fn crawl(&mut self, seed: &str, session: Arc<ScanSession>) -> AuditResult<CrawlStats> {
        let domain = hostname(seed).ok_or_else(|| AuditError::InvalidSeed(seed.to_string()))?;
        let seed = normalize(seed, seed).ok_or_else(|| AuditError::InvalidSeed(seed.to_string()))?;

        let context = PageContext {
            fetcher: Arc::clone(&self.fetcher),
            prober: Arc::clone(&self.prober),
            auth: Arc::clone(&self.auth),
            session: Arc::clone(&session),
            domain,
        };

        self.state = CrawlState::Crawling;
        info!("[Crawler] Starting crawl of {} (concurrency {})", seed, self.max_concurrency);

        let mut stats = CrawlStats::default();
        let mut queue: VecDeque<String> = VecDeque::new();
        let mut tasks: JoinSet<(String, Result<PageOutcome>)> = JoinSet::new();
        let mut spawned = 0usize;
        let mut fatal: Option<StoreError> = None;

        session.mark_visited(&seed);
        queue.push_back(seed);

        loop {
            let halted = fatal.is_some() || session.is_cancelled();

            while !halted && tasks.len() < self.max_concurrency {
                if self.max_pages > 0 && spawned >= self.max_pages {
                    if !queue.is_empty() {
                        debug!("[Crawler] Page limit {} reached, {} URLs left unfetched", self.max_pages, queue.len());
                        queue.clear();
                    }
                    break;
                }
                let Some(url) = queue.pop_front() else { break };

                spawned += 1;
                let ctx = context.clone();
                tasks.spawn(async move {
                    let outcome = process_page(&ctx, &url).await;
                    (url, outcome)
                });
            }

            let Some(joined) = tasks.join_next().await else {
                break;
            };

            match joined {
                Ok((_, Ok(outcome))) => {
                    if outcome.fetched {
                        stats.pages_fetched += 1;
                    } else if outcome.redirected {
                        stats.pages_redirected += 1;
                    } else {
                        stats.pages_dropped += 1;
                    }
                    stats.forms_probed += outcome.forms_probed;

                    for link in outcome.links {
                        if session.mark_visited(&link) {
                            queue.push_back(link);
                        }
                    }
                }
                Ok((url, Err(e))) => match e.downcast::<StoreError>() {
                    Ok(store_error) => {
                        error!("[Crawler] Store failure while processing {}: {}", url, store_error);
                        if fatal.is_none() {
                            fatal = Some(store_error);
                        }
                    }
                    Err(e) => {
                        warn!("[Crawler] Page {} failed: {:#}", url, e);
                        stats.pages_dropped += 1;
                    }
                },
                Err(join_error) => {
                    warn!("[Crawler] Page task panicked or was aborted: {}", join_error);
                    stats.pages_dropped += 1;
                }
            }
        }

        self.state = CrawlState::Drained;

        if let Some(store_error) = fatal {
            return Err(AuditError::Store(store_error));
        }
        if session.is_cancelled() {
            info!("[Crawler] Crawl cancelled after {} pages", stats.pages_fetched);
            return Err(AuditError::cancelled("scan terminated by operator"));
        }

        info!(
            "[Crawler] Drained: {} pages fetched, {} dropped, {} forms probed",
            stats.pages_fetched, stats.pages_dropped, stats.forms_probed
        );
        Ok(stats)
    }
}

/// Fetch one page, run page-level checks, then probe its forms.
async fn process_page(ctx: &PageContext, url: &str) -> Result<PageOutcome> {
    let response = match ctx.fetcher.fetch(FetchRequest::get(url)).await {
        Ok(r) => r,
        Err(e) => {
            warn!("[Crawler] Dropping {}: {:#}", url, e);
            return Ok(PageOutcome::default());
        }
    };

    if response.is_redirect() {
        let links = response
            .location()
            .and_then(|loc| normalize(&loc, url))
            .filter(|link| is_crawlable(link, &ctx.domain))
            .into_iter()
            .collect();
        debug!("[Crawler] {} redirected ({})", url, response.status_code);
        return Ok(PageOutcome {
            links,
            redirected: true,
            ..Default::default()
        });
    }

    if !response.is_success() {
        debug!("[Crawler] Dropping {} (HTTP {})", url, response.status_code);
        return Ok(PageOutcome::default());
    }

    let session = &ctx.session;
    session.record_crawled(url).await?;
    ctx.auth
        .check_page(url, &response.set_cookies, session.recorder())
        .await?;

    let links = extract_links(&response.body, url, &ctx.domain);
    let forms = extract_forms(&response.body, url);
    debug!("[Crawler] {}: {} links, {} forms", url, links.len(), forms.len());

    let mut forms_probed = 0;
    for form in &forms {
        if session.is_cancelled() {
            break;
        }
        if !session.claim_form(form) {
            debug!("[Crawler] Form {} {} already tested, skipping", form.method, form.action_url);
            continue;
        }
        ctx.prober.probe_form(form, session).await?;
        forms_probed += 1;
    }

    Ok(PageOutcome {
        links,
        fetched: true,
        redirected: false,
        forms_probed,
    })
}

fn is_crawlable(url: &str, domain: &str) -> bool {
    same_domain(url, domain) && !is_static_asset(url)
}

/// Same-domain, non-asset links from `a[href]`, in document order
pub fn extract_links(html: &str, page_url: &str, domain: &str) -> Vec<String> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let document = Html::parse_document(html);

    let mut links: Vec<String> = Vec::new();
    for element in document.select(&selector) {
        let Some(href) = element.value().attr("href") else { continue };
        let Some(absolute) = normalize(href, page_url) else { continue };
        if is_crawlable(&absolute, domain) && !links.contains(&absolute) {
            links.push(absolute);
        }
    }
    links
}

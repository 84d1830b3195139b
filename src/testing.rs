//! In-memory stand-ins for the browser and the job-status collaborator.

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

use crate::dom;
use crate::error::{Result, SyncError};
use crate::model::champion_id;
use crate::page::{BrowserLauncher, Extractor, PageQuery};
use crate::progress::{ProgressReporter, StatusUpdate};

struct FixturePage {
    /// One document per tab; untabbed pages have exactly one.
    documents: Vec<String>,
    tabbed: bool,
}

#[derive(Default)]
struct SiteState {
    pages: HashMap<String, FixturePage>,
    failures: HashMap<String, usize>,
    visits: Vec<String>,
    launches: usize,
}

/// A canned website. Clones share state, so a test can keep a handle while
/// the pipeline owns another.
#[derive(Clone, Default)]
pub struct FixtureSite {
    state: Arc<Mutex<SiteState>>,
}

impl FixtureSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(self, url: &str, html: String) -> Self {
        self.set_page(url, html);
        self
    }

    /// A page whose content depends on the active role tab.
    pub fn tabbed_page(self, url: &str, tabs: Vec<String>) -> Self {
        self.state.lock().unwrap().pages.insert(
            url.to_string(),
            FixturePage {
                documents: tabs,
                tabbed: true,
            },
        );
        self
    }

    /// The first `n` navigations to `url` fail with a network error.
    pub fn fail_first(self, url: &str, n: usize) -> Self {
        self.state.lock().unwrap().failures.insert(url.to_string(), n);
        self
    }

    pub fn set_page(&self, url: &str, html: String) {
        self.state.lock().unwrap().pages.insert(
            url.to_string(),
            FixturePage {
                documents: vec![html],
                tabbed: false,
            },
        );
    }

    pub fn session(&self) -> FixtureSession {
        FixtureSession {
            state: Arc::clone(&self.state),
            current: Mutex::new(None),
        }
    }

    /// Navigation attempts to `url`, failed ones included.
    pub fn visits(&self, url: &str) -> usize {
        self.state.lock().unwrap().visits.iter().filter(|v| *v == url).count()
    }

    pub fn visit_log(&self) -> Vec<String> {
        self.state.lock().unwrap().visits.clone()
    }

    pub fn launches(&self) -> usize {
        self.state.lock().unwrap().launches
    }
}

#[async_trait]
impl BrowserLauncher for FixtureSite {
    async fn launch(&self) -> Result<Box<dyn PageQuery>> {
        self.state.lock().unwrap().launches += 1;
        Ok(Box::new(self.session()))
    }
}

/// One "tab" on a [`FixtureSite`].
pub struct FixtureSession {
    state: Arc<Mutex<SiteState>>,
    /// Loaded url and active tab index.
    current: Mutex<Option<(String, usize)>>,
}

#[async_trait]
impl PageQuery for FixtureSession {
    async fn open(&self, url: &str, ready_selector: Option<&str>) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.visits.push(url.to_string());

        if let Some(remaining) = state.failures.get_mut(url) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(SyncError::navigation(url, "net::ERR_CONNECTION_RESET"));
            }
        }
        let Some(page) = state.pages.get(url) else {
            return Err(SyncError::navigation(url, "net::ERR_NAME_NOT_RESOLVED"));
        };
        if let Some(css) = ready_selector {
            let ready = Selector::parse(css).unwrap();
            let doc = Html::parse_document(&page.documents[0]);
            if doc.select(&ready).next().is_none() {
                return Err(SyncError::navigation(url, format!("timed out waiting for {css}")));
            }
        }
        *self.current.lock().unwrap() = Some((url.to_string(), 0));
        Ok(())
    }

    async fn evaluate(&self, extractor: &Extractor) -> Result<Value> {
        let state = self.state.lock().unwrap();
        let mut current = self.current.lock().unwrap();
        let Some((url, tab)) = current.as_mut() else {
            return Err(SyncError::Extraction("no page loaded".to_string()));
        };
        let Some(page) = state.pages.get(url.as_str()) else {
            return Err(SyncError::Extraction(format!("{url} disappeared")));
        };

        if let Extractor::ActivateTab { index } = extractor {
            if !page.tabbed {
                return Ok(Value::Bool(true));
            }
            if *index < page.documents.len() {
                *tab = *index;
                return Ok(Value::Bool(true));
            }
            return Ok(Value::Bool(false));
        }
        dom::run(&page.documents[*tab], url.as_str(), extractor)
    }
}

/// Wraps a session and stamps every call with tokio's (possibly paused) clock.
pub struct TimedSession {
    inner: FixtureSession,
    calls: Mutex<Vec<(Instant, String)>>,
}

impl TimedSession {
    pub fn new(inner: FixtureSession) -> Self {
        Self {
            inner,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// `open <url>`, `tab <index>`, `cards`, `links` or `detail`, in call order.
    pub fn calls(&self) -> Vec<(Instant, String)> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, label: String) {
        self.calls.lock().unwrap().push((Instant::now(), label));
    }
}

#[async_trait]
impl PageQuery for TimedSession {
    async fn open(&self, url: &str, ready_selector: Option<&str>) -> Result<()> {
        self.record(format!("open {url}"));
        self.inner.open(url, ready_selector).await
    }

    async fn evaluate(&self, extractor: &Extractor) -> Result<Value> {
        let label = match extractor {
            Extractor::Links => "links".to_string(),
            Extractor::ActivateTab { index } => format!("tab {index}"),
            Extractor::TierCards { .. } => "cards".to_string(),
            Extractor::ChampionDetail => "detail".to_string(),
        };
        self.record(label);
        self.inner.evaluate(extractor).await
    }
}

/// Keeps every update for later assertions.
#[derive(Default)]
pub struct RecordingReporter {
    updates: Mutex<Vec<StatusUpdate>>,
}

impl RecordingReporter {
    pub fn updates(&self) -> Vec<StatusUpdate> {
        self.updates.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProgressReporter for RecordingReporter {
    async fn report(&self, update: StatusUpdate) {
        self.updates.lock().unwrap().push(update);
    }
}

// ============================================================================
// HTML builders
// ============================================================================

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Champion detail href used by every fixture: `/1-{id}.html`.
pub fn detail_path(name: &str) -> String {
    format!("/1-{}.html", champion_id(name))
}

pub fn homepage_html(links: &[(&str, &str)]) -> String {
    let anchors: String = links
        .iter()
        .map(|(name, href)| format!(r#"<li><a href="{}">{}</a></li>"#, escape(href), escape(name)))
        .collect();
    format!(
        r#"<html><head><title>Wild Rift Meta</title></head><body>
<nav><a href="/">Home</a><a href="/meta/">Tier List</a></nav>
<ul class="champions">{anchors}</ul>
</body></html>"#
    )
}

/// One `{prefix}-line-tier-{token}` slot on the tier-list page.
pub struct Slot {
    prefix: String,
    token: String,
    names: Vec<String>,
    hidden: bool,
}

impl Slot {
    pub fn visible(prefix: &str, token: &str, names: &[&str]) -> Self {
        Self {
            prefix: prefix.to_string(),
            token: token.to_string(),
            names: names.iter().map(|n| n.to_string()).collect(),
            hidden: false,
        }
    }

    pub fn hidden(prefix: &str, token: &str, names: &[&str]) -> Self {
        Self {
            hidden: true,
            ..Self::visible(prefix, token, names)
        }
    }
}

pub fn tier_list_html(slots: &[Slot]) -> String {
    let mut body = String::new();
    for slot in slots {
        let style = if slot.hidden { r#" style="display: none""# } else { "" };
        body.push_str(&format!(
            r#"<div class="wr-cn-slot {}-line-tier-{}"{style}>"#,
            slot.prefix, slot.token
        ));
        for (i, name) in slot.names.iter().enumerate() {
            let winrate = 50.0 + i as f64 * 0.5;
            body.push_str(&format!(
                r#"<div class="wr-tl-hero"><a class="wr-tl-link" href="{path}"><img src="/uploads/{id}.png"></a><span class="nm">{name}</span><span class="st">{winrate}%</span><span class="st">2.5%</span></div>"#,
                path = detail_path(name),
                id = champion_id(name),
                name = escape(name),
            ));
        }
        body.push_str("</div>\n");
    }
    format!(
        r#"<html><head><title>Wild Rift Tier List</title></head><body>
<div class="tabs-sel"><span>Mid</span><span>Baron</span><span>Jungle</span><span>Dragon</span><span>Support</span></div>
{body}</body></html>"#
    )
}

pub struct DetailFixture<'a> {
    pub name: &'a str,
    pub winrate: f64,
    pub pick_rate: f64,
    pub ban_rate: f64,
    pub role_tags: &'a [&'a str],
    pub threats: &'a [&'a str],
    pub synergies: &'a [&'a str],
}

fn counter_list(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| format!(r##"<div class="counter-champion"><a href="#">{}</a></div>"##, escape(n)))
        .collect()
}

pub fn detail_html(page: &DetailFixture<'_>) -> String {
    format!(
        r#"<html><head><title>Wild Rift: {name} - Build, Runes, Counters</title></head><body>
<p>Main role – {roles}.</p>
<div class="wr-cn-fs"><img class="wr-tier-ico" alt="S" src="/img/s.png">
<div class="wr-cn-fs-m">Win: {winrate}%</div><div class="wr-cn-fs-m">Pick: {pick}%</div><div class="wr-cn-fs-m">Ban: {ban}%</div></div>
<div class="tabs-box2"><h3>Extreme Threats</h3>
<div class="tabs-b2 visible">{threats}</div><div class="tabs-b2">{decoy}</div></div>
<div class="tabs-box2"><h3>Extreme Synergies</h3>
<div class="tabs-b3 visible">{synergies}</div></div>
</body></html>"#,
        name = escape(page.name),
        roles = page.role_tags.join(" / "),
        winrate = page.winrate,
        pick = page.pick_rate,
        ban = page.ban_rate,
        threats = counter_list(page.threats),
        decoy = counter_list(&["Teemo"]),
        synergies = counter_list(page.synergies),
    )
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// Which tier slots a card scan may look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotScope {
    /// Only slots the browser actually renders.
    Visible,
    /// Every slot in the DOM, hidden or not.
    Anywhere,
}

/// A unit of work run against the loaded page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extractor {
    /// All anchors on the page as [`RawLink`] rows.
    Links,
    /// Click a role tab. Returns `true` if the control existed.
    ActivateTab { index: usize },
    /// Champion cards in `{css_prefix}-line-tier-*` slots as [`RawCard`] rows.
    TierCards { css_prefix: String, scope: SlotScope },
    /// One [`RawDetail`] object.
    ChampionDetail,
}

/// Live page capability: navigate, then run extractors against the DOM.
///
/// Results come back as JSON records so crawlers stay decoupled from how the
/// page was queried; a fixture-backed fake stands in for Chrome in tests.
#[async_trait]
pub trait PageQuery: Send + Sync {
    /// Load `url` and wait until `ready_selector` (if any) appears.
    async fn open(&self, url: &str, ready_selector: Option<&str>) -> Result<()>;

    async fn evaluate(&self, extractor: &Extractor) -> Result<Value>;
}

/// Starts a browser session. Dropping the returned session closes it.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn PageQuery>>;
}

// ============================================================================
// Raw rows returned by extractors
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawLink {
    /// Absolute URL.
    pub href: String,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCard {
    pub tier_token: String,
    pub name: Option<String>,
    pub page_url: Option<String>,
    #[serde(default)]
    pub icon_url: String,
    /// Percent values of the `.st` elements in order; `None` where the text had none.
    #[serde(default)]
    pub stats: Vec<Option<f64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawDetail {
    pub name: Option<String>,
    pub winrate: Option<f64>,
    pub pick_rate: Option<f64>,
    pub ban_rate: Option<f64>,
    pub role_tags: Vec<String>,
    pub extreme_threats: Vec<String>,
    pub extreme_synergies: Vec<String>,
}

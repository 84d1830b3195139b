//! Everything this crate assumes about wr-meta.com markup.
//!
//! When the origin changes its HTML, this is the only file that should need editing.

use crate::model::Role;

// ============================================================================
// Homepage
// ============================================================================

/// Champion detail links look like `/123-ahri.html`.
pub const DETAIL_HREF_PATTERN: &str = r"/\d+-[\w-]+\.html";

/// Hrefs containing any of these are guides, not champions.
pub const NON_CHAMPION_HREF_PARTS: &[&str] = &["item", "rune", "build"];

/// Link text must be longer than this...
pub const MIN_LINK_TEXT: usize = 1;
/// ...and shorter than this to count as a champion name.
pub const MAX_LINK_TEXT: usize = 30;

// ============================================================================
// Tier list
// ============================================================================

/// Container whose `span` children are the role tabs.
pub const TAB_CONTAINER: &str = ".tabs-sel";

/// Present once any champion card has rendered.
pub const TIER_LIST_READY: &str = ".wr-tl-hero";

/// One role tab: its position in the tab bar, the role it filters, and the
/// prefix the site uses in its slot classes (`{prefix}-line-tier-{token}`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleTab {
    pub index: usize,
    pub role: Role,
    pub css_prefix: &'static str,
}

pub static ROLE_TABS: [RoleTab; 5] = [
    RoleTab { index: 0, role: Role::Mid, css_prefix: "mid" },
    RoleTab { index: 1, role: Role::Baron, css_prefix: "solo" },
    RoleTab { index: 2, role: Role::Jungle, css_prefix: "jungle" },
    RoleTab { index: 3, role: Role::Dragon, css_prefix: "duo" },
    RoleTab { index: 4, role: Role::Support, css_prefix: "support" },
];

/// Slot class token -> displayed tier. Unknown tokens are upper-cased.
pub const TIER_TOKENS: &[(&str, &str)] = &[("sp", "S+"), ("s", "S"), ("a", "A"), ("b", "B")];

pub const CARD: &str = ".wr-tl-hero";
pub const CARD_LINK: &str = "a.wr-tl-link";
pub const CARD_NAME: &str = ".nm";
pub const CARD_ICON: &str = "img";
pub const CARD_STAT: &str = ".st";

/// Attribute set by the browser on tier slots that are not rendered.
pub const HIDDEN_MARKER: &str = "data-sync-hidden";

/// Runs in the page before a visible-only scan; tags every tier slot that has no layout box.
pub const MARK_HIDDEN_SLOTS_JS: &str = r#"
(() => {
    let hidden = 0;
    document.querySelectorAll('[class*="-line-tier-"]').forEach(el => {
        const style = window.getComputedStyle(el);
        if (el.offsetParent === null || style.visibility === 'hidden') {
            el.setAttribute('data-sync-hidden', '1');
            hidden++;
        } else {
            el.removeAttribute('data-sync-hidden');
        }
    });
    return hidden;
})()
"#;

pub fn click_tab_js(index: usize) -> String {
    format!(
        r#"(() => {{
    const bar = document.querySelector('{TAB_CONTAINER}');
    if (!bar) return false;
    const tab = bar.querySelectorAll('span')[{index}];
    if (!tab) return false;
    tab.click();
    return true;
}})()"#
    )
}

// ============================================================================
// Champion detail page
// ============================================================================

pub const DETAIL_READY: &str = "body";
pub const DETAIL_METRIC: &str = ".wr-cn-fs-m";
/// Body text such as "role – Assassin / Fighter".
pub const DETAIL_ROLE_PATTERN: &str = r"(?i)role\s*[-\u{2013}\u{2014}]\s*([^.\n]+)";
/// `<title>Wild Rift: Ahri - Build ...</title>`
pub const DETAIL_TITLE_PATTERN: &str = r"Wild Rift:\s*(.+?)\s*-";
pub const COUNTER_BOX: &str = "tabs-box2";
pub const COUNTER_LINK: &str = ".counter-champion a";
pub const THREAT_HEADING: &str = "Threat";
pub const THREAT_TAB: &str = "tabs-b2";
pub const SYNERGY_HEADING: &str = "Synerg";
pub const SYNERGY_TAB: &str = "tabs-b3";

/// Percent figure inside any stat text.
pub const PERCENT_PATTERN: &str = r"([\d.]+)%";

//! HTML extraction over a rendered page snapshot.
//!
//! The browser session and the test fixtures both hand their HTML to [`run`],
//! so the selectors in [`crate::site`] are exercised the same way in both.

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::error::{Result, SyncError};
use crate::page::{Extractor, RawCard, RawDetail, RawLink, SlotScope};
use crate::site;

fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector is valid")
}

static ANCHOR: Lazy<Selector> = Lazy::new(|| selector("a[href]"));
static TITLE: Lazy<Selector> = Lazy::new(|| selector("title"));
static BODY: Lazy<Selector> = Lazy::new(|| selector("body"));
static H3: Lazy<Selector> = Lazy::new(|| selector("h3"));
static CARD: Lazy<Selector> = Lazy::new(|| selector(site::CARD));
static CARD_LINK: Lazy<Selector> = Lazy::new(|| selector(site::CARD_LINK));
static CARD_NAME: Lazy<Selector> = Lazy::new(|| selector(site::CARD_NAME));
static CARD_ICON: Lazy<Selector> = Lazy::new(|| selector(site::CARD_ICON));
static CARD_STAT: Lazy<Selector> = Lazy::new(|| selector(site::CARD_STAT));
static METRIC: Lazy<Selector> = Lazy::new(|| selector(site::DETAIL_METRIC));
static COUNTER_LINK: Lazy<Selector> = Lazy::new(|| selector(site::COUNTER_LINK));

static PERCENT: Lazy<Regex> = Lazy::new(|| Regex::new(site::PERCENT_PATTERN).expect("valid regex"));
static ROLE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(site::DETAIL_ROLE_PATTERN).expect("valid regex"));
static TITLE_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(site::DETAIL_TITLE_PATTERN).expect("valid regex"));

/// Apply `extractor` to a page snapshot loaded from `page_url`.
pub fn run(html: &str, page_url: &str, extractor: &Extractor) -> Result<Value> {
    let document = Html::parse_document(html);
    let base = Url::parse(page_url).map_err(|e| SyncError::navigation(page_url, e))?;
    let value = match extractor {
        Extractor::Links => serde_json::to_value(extract_links(&document, &base))?,
        Extractor::TierCards { css_prefix, scope } => {
            serde_json::to_value(extract_tier_cards(&document, &base, css_prefix, *scope))?
        }
        Extractor::ChampionDetail => serde_json::to_value(extract_detail(&document, &base))?,
        Extractor::ActivateTab { .. } => {
            return Err(SyncError::Extraction(
                "tab activation needs a live page".to_string(),
            ))
        }
    };
    Ok(value)
}

/// Parse the first `12.3%` figure in a text.
pub fn parse_percent(text: &str) -> Option<f64> {
    PERCENT
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

fn absolutize(base: &Url, href: &str) -> Option<String> {
    base.join(href.trim()).ok().map(|u| u.to_string())
}

fn text_of(el: ElementRef<'_>) -> String {
    el.text().collect::<String>().split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Links
// ============================================================================

pub fn extract_links(document: &Html, base: &Url) -> Vec<RawLink> {
    document
        .select(&ANCHOR)
        .filter_map(|a| {
            let href = absolutize(base, a.value().attr("href")?)?;
            Some(RawLink {
                href,
                text: text_of(a),
            })
        })
        .collect()
}

// ============================================================================
// Tier cards
// ============================================================================

fn is_hidden(el: ElementRef<'_>) -> bool {
    let own = std::iter::once(el);
    let ancestors = el.ancestors().filter_map(ElementRef::wrap);
    own.chain(ancestors).any(|e| {
        let v = e.value();
        if v.attr(site::HIDDEN_MARKER).is_some() || v.attr("hidden").is_some() {
            return true;
        }
        v.attr("style")
            .map(|s| {
                let s: String = s.chars().filter(|c| !c.is_whitespace()).collect();
                let s = s.to_lowercase();
                s.contains("display:none") || s.contains("visibility:hidden")
            })
            .unwrap_or(false)
    })
}

fn tier_token(el: ElementRef<'_>, css_prefix: &str) -> Option<String> {
    let marker = format!("{css_prefix}-line-tier-");
    el.value().classes().find_map(|class| {
        let token = class.strip_prefix(&marker)?;
        (!token.is_empty() && token.chars().all(|c| c.is_alphanumeric() || c == '_'))
            .then(|| token.to_string())
    })
}

pub fn extract_tier_cards(
    document: &Html,
    base: &Url,
    css_prefix: &str,
    scope: SlotScope,
) -> Vec<RawCard> {
    let slot_css = format!("[class*=\"{css_prefix}-line-tier-\"]");
    let Ok(slots) = Selector::parse(&slot_css) else {
        return Vec::new();
    };

    let mut cards = Vec::new();
    for slot in document.select(&slots) {
        let Some(token) = tier_token(slot, css_prefix) else {
            continue;
        };
        if scope == SlotScope::Visible && is_hidden(slot) {
            continue;
        }
        for card in slot.select(&CARD) {
            let page_url = card
                .select(&CARD_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))
                .and_then(|href| absolutize(base, href));
            let name = card
                .select(&CARD_NAME)
                .next()
                .map(text_of)
                .filter(|n| !n.is_empty());
            let icon_url = card
                .select(&CARD_ICON)
                .next()
                .and_then(|img| img.value().attr("src").or_else(|| img.value().attr("data-src")))
                .and_then(|src| absolutize(base, src))
                .unwrap_or_default();
            let stats = card
                .select(&CARD_STAT)
                .map(|st| parse_percent(&text_of(st)))
                .collect();
            cards.push(RawCard {
                tier_token: token.clone(),
                name,
                page_url,
                icon_url,
                stats,
            });
        }
    }
    cards
}

// ============================================================================
// Champion detail
// ============================================================================

fn role_tags(document: &Html) -> Vec<String> {
    let Some(body) = document.select(&BODY).next() else {
        return Vec::new();
    };
    // Tags are often links, so match against the joined text rather than single nodes.
    let text: String = body.text().collect();
    let Some(caps) = ROLE_LINE.captures(&text) else {
        return Vec::new();
    };
    caps[1]
        .split('/')
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty() && t.len() <= 20)
        .filter(|t| t.chars().all(|c| c.is_alphabetic() || c == ' '))
        .collect()
}

/// Champion names listed in the first (free) tab of the counter box under `heading`.
fn counter_names(document: &Html, heading: &str, tab_class: &str) -> Vec<String> {
    let Some(h3) = document.select(&H3).find(|h| text_of(*h).contains(heading)) else {
        return Vec::new();
    };
    let Some(counter_box) = h3
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().classes().any(|c| c == site::COUNTER_BOX))
    else {
        return Vec::new();
    };

    let active = selector(&format!(".{tab_class}.visible"));
    let any = selector(&format!(".{tab_class}"));
    let Some(tab) = counter_box
        .select(&active)
        .next()
        .or_else(|| counter_box.select(&any).next())
    else {
        return Vec::new();
    };

    tab.select(&COUNTER_LINK)
        .map(text_of)
        .filter(|n| !n.is_empty())
        .collect()
}

pub fn extract_detail(document: &Html, _base: &Url) -> RawDetail {
    let mut detail = RawDetail::default();

    for metric in document.select(&METRIC) {
        let text = text_of(metric);
        let Some(pct) = parse_percent(&text) else {
            continue;
        };
        if text.starts_with("Win") {
            detail.winrate = Some(pct);
        } else if text.starts_with("Pick") {
            detail.pick_rate = Some(pct);
        } else if text.starts_with("Ban") {
            detail.ban_rate = Some(pct);
        }
    }

    detail.name = document
        .select(&TITLE)
        .next()
        .map(text_of)
        .and_then(|title| {
            TITLE_NAME
                .captures(&title)
                .map(|c| c[1].trim().to_string())
        })
        .filter(|n| !n.is_empty());

    detail.role_tags = role_tags(document);
    detail.extreme_threats = counter_names(document, site::THREAT_HEADING, site::THREAT_TAB);
    detail.extreme_synergies = counter_names(document, site::SYNERGY_HEADING, site::SYNERGY_TAB);
    detail
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{detail_html, DetailFixture};

    const BASE: &str = "https://wr-meta.com/meta/";

    fn base() -> Url {
        Url::parse(BASE).unwrap()
    }

    #[test]
    fn percent_parsing() {
        assert_eq!(parse_percent("Win: 48.49%"), Some(48.49));
        assert_eq!(parse_percent("52%"), Some(52.0));
        assert_eq!(parse_percent("n/a"), None);
    }

    #[test]
    fn links_are_made_absolute() {
        let doc = Html::parse_document(
            r#"<a href="/12-ahri.html"> Ahri </a><a href="https://other.site/x">X</a><a>none</a>"#,
        );
        let links = extract_links(&doc, &base());
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].href, "https://wr-meta.com/12-ahri.html");
        assert_eq!(links[0].text, "Ahri");
    }

    #[test]
    fn tier_cards_read_token_and_stats() {
        let doc = Html::parse_document(
            r#"<div class="wr-cn-slot mid-line-tier-sp">
                 <div class="wr-tl-hero">
                   <a class="wr-tl-link" href="/1-ahri.html"><img src="/img/ahri.png"></a>
                   <span class="nm">Ahri</span>
                   <span class="st">WR 52.1%</span><span class="st">BR 3.4%</span>
                 </div>
                 <div class="wr-tl-hero"><span class="nm">NoLink</span></div>
               </div>
               <div class="wr-cn-slot solo-line-tier-a">
                 <div class="wr-tl-hero"><a class="wr-tl-link" href="/2-garen.html"></a><span class="nm">Garen</span></div>
               </div>"#,
        );
        let cards = extract_tier_cards(&doc, &base(), "mid", SlotScope::Visible);
        assert_eq!(cards.len(), 2);
        assert_eq!(cards[0].tier_token, "sp");
        assert_eq!(cards[0].name.as_deref(), Some("Ahri"));
        assert_eq!(cards[0].page_url.as_deref(), Some("https://wr-meta.com/1-ahri.html"));
        assert_eq!(cards[0].icon_url, "https://wr-meta.com/img/ahri.png");
        assert_eq!(cards[0].stats, vec![Some(52.1), Some(3.4)]);
        assert_eq!(cards[1].page_url, None);
    }

    #[test]
    fn visible_scope_skips_hidden_slots() {
        let doc = Html::parse_document(
            r#"<section style="display: none">
                 <div class="duo-line-tier-s"><div class="wr-tl-hero">
                   <a class="wr-tl-link" href="/3-jinx.html"></a><span class="nm">Jinx</span>
                 </div></div>
               </section>
               <div class="duo-line-tier-b" data-sync-hidden="1"><div class="wr-tl-hero">
                 <a class="wr-tl-link" href="/4-ashe.html"></a><span class="nm">Ashe</span>
               </div></div>"#,
        );
        assert!(extract_tier_cards(&doc, &base(), "duo", SlotScope::Visible).is_empty());
        let all = extract_tier_cards(&doc, &base(), "duo", SlotScope::Anywhere);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn detail_page_fields() {
        let html = detail_html(&DetailFixture {
            name: "Kai'Sa",
            winrate: 50.5,
            pick_rate: 12.25,
            ban_rate: 4.0,
            role_tags: &["Marksman", "Assassin"],
            threats: &["Caitlyn", "Draven"],
            synergies: &["Nautilus"],
        });
        let detail = extract_detail(&Html::parse_document(&html), &base());
        assert_eq!(detail.name.as_deref(), Some("Kai'Sa"));
        assert_eq!(detail.winrate, Some(50.5));
        assert_eq!(detail.pick_rate, Some(12.25));
        assert_eq!(detail.ban_rate, Some(4.0));
        assert_eq!(detail.role_tags, vec!["marksman", "assassin"]);
        assert_eq!(detail.extreme_threats, vec!["Caitlyn", "Draven"]);
        assert_eq!(detail.extreme_synergies, vec!["Nautilus"]);
    }

    #[test]
    fn role_tags_wrapped_in_links() {
        let doc = Html::parse_document(
            r#"<html><body><div class="wr-cn-fs-m">Win: 51%</div>
               <p>Main role – <a href="/tags/marksman">Marksman</a> / <a href="/tags/support">Support</a>.</p>
               </body></html>"#,
        );
        assert_eq!(role_tags(&doc), vec!["marksman", "support"]);
    }

    #[test]
    fn counter_box_prefers_the_visible_tab() {
        let doc = Html::parse_document(
            r#"<div class="tabs-box2"><h3>Threats</h3>
                 <div class="tabs-b2"><div class="counter-champion"><a>Zed</a></div></div>
                 <div class="tabs-b2 visible"><div class="counter-champion"><a>Lux</a></div></div>
               </div>"#,
        );
        assert_eq!(counter_names(&doc, "Threat", "tabs-b2"), vec!["Lux"]);
    }

    #[test]
    fn tab_activation_is_not_an_html_query() {
        assert!(run("<html></html>", BASE, &Extractor::ActivateTab { index: 0 }).is_err());
    }
}

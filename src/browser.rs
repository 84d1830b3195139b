use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions, Tab};
use serde_json::Value;
use std::ffi::OsStr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::dom;
use crate::error::{Result, SyncError};
use crate::page::{BrowserLauncher, Extractor, PageQuery, SlotScope};
use crate::site;

/// Launches headless Chrome sessions configured for polite scraping.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    user_agent: String,
    chrome_path: Option<std::path::PathBuf>,
    timeout: Duration,
}

impl ChromeLauncher {
    pub fn new(config: &Config) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            chrome_path: config.chrome_path.clone(),
            timeout: config.timeout,
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self) -> Result<Box<dyn PageQuery>> {
        let args = vec![
            OsStr::new("--no-sandbox"),
            OsStr::new("--disable-setuid-sandbox"),
            OsStr::new("--disable-dev-shm-usage"),
            OsStr::new("--disable-infobars"),
        ];

        let browser = Browser::new(LaunchOptions {
            headless: true,
            window_size: Some((1920, 1080)),
            path: self.chrome_path.clone(),
            args,
            idle_browser_timeout: self.timeout * 4,
            ..Default::default()
        })
        .map_err(|e| SyncError::Launch(e.to_string()))?;

        let tab = browser
            .new_tab()
            .map_err(|e| SyncError::Launch(e.to_string()))?;
        tab.set_default_timeout(self.timeout);
        tab.set_user_agent(&self.user_agent, Some("en-US,en"), None)
            .map_err(|e| SyncError::Launch(e.to_string()))?;

        info!(user_agent = self.user_agent.as_str(), "browser session started");
        Ok(Box::new(ChromeSession {
            _browser: browser,
            tab,
            timeout: self.timeout,
            current_url: Mutex::new(String::new()),
        }))
    }
}

/// One browser process with one tab. The process is killed when this is dropped,
/// so every exit path releases it.
pub struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
    timeout: Duration,
    current_url: Mutex<String>,
}

impl ChromeSession {
    fn snapshot(&self) -> Result<(String, String)> {
        let url = self.current_url();
        let html = self
            .tab
            .get_content()
            .map_err(|e| SyncError::navigation(&url, e))?;
        Ok((html, url))
    }

    fn current_url(&self) -> String {
        self.current_url
            .lock()
            .map(|u| u.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl PageQuery for ChromeSession {
    async fn open(&self, url: &str, ready_selector: Option<&str>) -> Result<()> {
        debug!(url, "navigating");
        self.tab
            .navigate_to(url)
            .and_then(|tab| tab.wait_until_navigated())
            .map_err(|e| SyncError::navigation(url, e))?;

        if let Some(selector) = ready_selector {
            self.tab
                .wait_for_element_with_custom_timeout(selector, self.timeout)
                .map_err(|e| SyncError::navigation(url, format!("waiting for {selector}: {e}")))?;
        }

        if let Ok(mut current) = self.current_url.lock() {
            *current = self.tab.get_url();
        }
        Ok(())
    }

    async fn evaluate(&self, extractor: &Extractor) -> Result<Value> {
        match extractor {
            Extractor::ActivateTab { index } => {
                let clicked = self
                    .tab
                    .evaluate(&site::click_tab_js(*index), false)
                    .map_err(|e| SyncError::navigation(&self.current_url(), e))?
                    .value
                    .unwrap_or(Value::Bool(false));
                Ok(clicked)
            }
            Extractor::TierCards {
                scope: SlotScope::Visible,
                ..
            } => {
                if let Err(e) = self.tab.evaluate(site::MARK_HIDDEN_SLOTS_JS, false) {
                    warn!(error = %e, "could not mark hidden slots, scanning all");
                }
                let (html, url) = self.snapshot()?;
                dom::run(&html, &url, extractor)
            }
            _ => {
                let (html, url) = self.snapshot()?;
                dom::run(&html, &url, extractor)
            }
        }
    }
}

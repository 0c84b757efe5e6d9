use crate::config::Config;
use crate::error::FetchError;
use async_trait::async_trait;
use headless_chrome::{Browser, LaunchOptions};
use std::time::Duration;

/// Capability seam for page rendering: the extraction pipeline only ever sees
/// `render(url) -> html`, so tests substitute a stub and never touch Chrome.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &str) -> Result<String, FetchError>;
}

/// Renders the listings page in a headless Chromium so content that only
/// mounts after script execution (tabbed panels, lazy-loaded sections) is
/// present in the captured DOM.
pub struct ChromeRenderer {
    user_agent: String,
    settle_delay_ms: u64,
    tab_pause_ms: u64,
    timeout_seconds: u64,
}

impl ChromeRenderer {
    pub fn new(user_agent: &str, settle_delay_ms: u64, tab_pause_ms: u64, timeout_seconds: u64) -> Self {
        Self {
            user_agent: user_agent.to_string(),
            settle_delay_ms,
            tab_pause_ms,
            timeout_seconds,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.user_agent,
            config.settle_delay_ms,
            config.tab_pause_ms,
            config.render_timeout_seconds,
        )
    }
}

#[async_trait]
impl PageRenderer for ChromeRenderer {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        let url = url.to_string();
        let user_agent = self.user_agent.clone();
        let settle_delay_ms = self.settle_delay_ms;
        let tab_pause_ms = self.tab_pause_ms;

        // The CDP client is blocking; keep it off the async workers and put
        // the whole render under one overall deadline.
        let render = tokio::task::spawn_blocking(move || {
            render_blocking(&url, &user_agent, settle_delay_ms, tab_pause_ms)
        });

        match tokio::time::timeout(Duration::from_secs(self.timeout_seconds), render).await {
            Err(_) => Err(FetchError::Timeout(self.timeout_seconds)),
            Ok(Err(join_err)) => Err(FetchError::Browser(join_err.to_string())),
            Ok(Ok(result)) => result,
        }
    }
}

/// Drives one browser session to a fully-settled DOM serialization. The
/// `Browser` handle closes the Chromium process on drop, so every early
/// return still tears the session down.
fn render_blocking(
    url: &str,
    user_agent: &str,
    settle_delay_ms: u64,
    tab_pause_ms: u64,
) -> Result<String, FetchError> {
    let browser = Browser::new(LaunchOptions {
        headless: true,
        ..Default::default()
    })
    .map_err(|e| FetchError::Browser(e.to_string()))?;

    let tab = browser
        .new_tab()
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    if let Err(e) = tab.set_user_agent(user_agent, None, None) {
        tracing::debug!("Failed to set user agent: {}", e);
    }

    tab.navigate_to(url).map_err(|e| FetchError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    })?;
    tab.wait_until_navigated().map_err(|e| FetchError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    })?;

    // Let the initial network burst quiesce before prodding the page.
    std::thread::sleep(Duration::from_millis(settle_delay_ms));

    activate_tab_controls(&tab, tab_pause_ms);
    trigger_lazy_loaders(&tab);

    std::thread::sleep(Duration::from_millis(settle_delay_ms));

    let html = tab
        .get_content()
        .map_err(|e| FetchError::Browser(e.to_string()))?;

    if html.trim().is_empty() {
        return Err(FetchError::EmptyDocument);
    }

    tracing::debug!("Rendered {} ({} bytes)", url, html.len());
    Ok(html)
}

/// Clicks every tab-like control on the page one at a time, pausing after
/// each so newly revealed panels get a chance to mount. Rate tables on
/// floorplan pages commonly hide half their cards behind these.
fn activate_tab_controls(tab: &std::sync::Arc<headless_chrome::Tab>, pause_ms: u64) {
    let script = format!(
        r#"
        (async () => {{
            const delay = (ms) => new Promise((resolve) => setTimeout(resolve, ms));
            const controls = document.querySelectorAll(
                "[role='tab'], [data-toggle='tab'], [data-tab], .tab-link, .tabs a, ul.tabs li"
            );
            for (const control of controls) {{
                control.click();
                await delay({pause_ms});
            }}
            return controls.length;
        }})()
        "#
    );

    match tab.evaluate(&script, true) {
        Ok(result) => {
            let count = result
                .value
                .as_ref()
                .and_then(|v| v.as_u64())
                .unwrap_or(0);
            tracing::debug!("Activated {} tab controls", count);
        }
        Err(e) => tracing::debug!("Tab activation script failed: {}", e),
    }
}

/// Scroll plus a synthetic pointer move, for listeners that only fire on
/// user interaction.
fn trigger_lazy_loaders(tab: &std::sync::Arc<headless_chrome::Tab>) {
    let _ = tab.evaluate("window.scrollTo(0, document.body.scrollHeight);", false);
    let _ = tab.evaluate(
        "document.dispatchEvent(new MouseEvent('mousemove', { bubbles: true, clientX: 240, clientY: 320 }));",
        false,
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renderer_from_config_carries_timings() {
        let config = Config::default();
        let renderer = ChromeRenderer::from_config(&config);
        assert_eq!(renderer.settle_delay_ms, config.settle_delay_ms);
        assert_eq!(renderer.tab_pause_ms, config.tab_pause_ms);
        assert_eq!(renderer.timeout_seconds, config.render_timeout_seconds);
    }

    #[tokio::test]
    async fn test_stub_renderer_satisfies_trait() {
        struct FixedRenderer;

        #[async_trait]
        impl PageRenderer for FixedRenderer {
            async fn render(&self, _url: &str) -> Result<String, FetchError> {
                Ok("<html><body></body></html>".to_string())
            }
        }

        let renderer: Box<dyn PageRenderer> = Box::new(FixedRenderer);
        let html = renderer.render("https://example.com").await.unwrap();
        assert!(html.contains("<body>"));
    }
}

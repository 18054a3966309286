// src/linkedin/navigator.rs
use headless_chrome::protocol::cdp::Network::CookieParam;
use headless_chrome::{Browser, LaunchOptions, Tab};
use scraper::Html;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const LOGIN_URL: &str = "https://www.linkedin.com/login";
const CHECKPOINT_URL: &str = "https://www.linkedin.com/checkpoint/lg/login-submit";
const REMEMBER_PROMPT: &str = "#remember-me-prompt__form-primary";
const SESSION_COOKIE: &str = "li_at";
const COOKIE_DOMAIN: &str = ".linkedin.com";

/// Element only rendered for an authenticated session.
pub const SIGNED_IN_MARKER: &str = ".global-nav__primary-link";

#[derive(Debug, Error)]
pub enum NavigationError {
    #[error("could not load {url}: {reason}")]
    Unreachable { url: String, reason: String },
    #[error("element '{selector}' not found within {timeout:?}")]
    ElementNotFound { selector: String, timeout: Duration },
    #[error("browser error: {0}")]
    Browser(String),
}

/// The browser session every extractor drives in turn.
pub trait Navigator {
    fn load(&mut self, url: &str) -> Result<(), NavigationError>;

    /// Block until `css` matches or `timeout` expires. Callers treat
    /// `ElementNotFound` as "feature absent".
    fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<(), NavigationError>;

    /// Parsed copy of the current page.
    fn snapshot(&mut self) -> Result<Html, NavigationError>;

    fn execute(&mut self, script: &str) -> Result<(), NavigationError>;

    fn fill(&mut self, css: &str, value: &str) -> Result<(), NavigationError>;

    /// Block until a navigation started by the last action has finished.
    fn wait_for_navigation(&mut self) -> Result<(), NavigationError>;

    fn current_url(&self) -> String;

    fn pause(&mut self, duration: Duration);

    fn close(&mut self);

    /// Submit the form owning the element matched by `css`.
    fn submit(&mut self, css: &str) -> Result<(), NavigationError> {
        let target = serde_json::to_string(css).map_err(|e| NavigationError::Browser(e.to_string()))?;
        self.execute(&format!(
            "(() => {{ const el = document.querySelector({target}); (el.form || el).submit(); }})()"
        ))
    }

    fn set_cookie(&mut self, name: &str, value: &str) -> Result<(), NavigationError> {
        let cookie = serde_json::to_string(&format!("{name}={value}; domain={COOKIE_DOMAIN}; path=/"))
            .map_err(|e| NavigationError::Browser(e.to_string()))?;
        self.execute(&format!("document.cookie = {cookie};"))
    }

    /// Scroll to `scrollHeight / divisor` to trigger lazy-loaded lists.
    fn scroll_to_fraction(&mut self, divisor: f64) -> Result<(), NavigationError> {
        self.execute(&format!(
            "window.scrollTo(0, Math.ceil(document.body.scrollHeight/{divisor}));"
        ))
    }

    /// The navigation bar renders after the page settles, so give it up to
    /// `timeout` to appear.
    fn is_signed_in(&mut self, timeout: Duration) -> bool {
        self.wait_for(SIGNED_IN_MARKER, timeout).is_ok()
    }
}

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub session_cookie: Option<String>,
}

/// Log the browser session in, by cookie when one is configured, otherwise
/// through the login form.
pub fn login<N: Navigator>(
    navigator: &mut N,
    credentials: &Credentials,
    timeout: Duration,
) -> Result<(), NavigationError> {
    info!("Logging in...");
    navigator.load(LOGIN_URL)?;

    if let Some(cookie) = &credentials.session_cookie {
        debug!("Using session cookie");
        return navigator.set_cookie(SESSION_COOKIE, cookie);
    }

    navigator.wait_for("#username", Duration::from_secs(10))?;
    navigator.fill("#username", &credentials.email)?;
    navigator.fill("#password", &credentials.password)?;
    navigator.submit("#password")?;
    navigator.wait_for_navigation()?;

    if navigator.current_url() == CHECKPOINT_URL {
        match navigator.wait_for(REMEMBER_PROMPT, Duration::from_secs(2)) {
            Ok(()) => {
                navigator.submit(REMEMBER_PROMPT)?;
                navigator.wait_for_navigation()?;
            }
            Err(e) => debug!("No remember-me prompt: {}", e),
        }
    }

    navigator.wait_for(SIGNED_IN_MARKER, timeout)
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub headless: bool,
    pub wait_timeout: Duration,
    pub settle: Duration,
}

/// Navigator backed by a Chrome tab.
pub struct ChromeNavigator {
    // Dropping the browser terminates the Chrome process.
    _browser: Browser,
    tab: Arc<Tab>,
}

fn browser_error(e: impl std::fmt::Display) -> NavigationError {
    NavigationError::Browser(e.to_string())
}

fn unreachable(url: &str, e: impl std::fmt::Display) -> NavigationError {
    NavigationError::Unreachable {
        url: url.to_string(),
        reason: e.to_string(),
    }
}

impl ChromeNavigator {
    pub fn launch(settings: &BrowserSettings) -> Result<Self, NavigationError> {
        let options = LaunchOptions::default_builder()
            .headless(settings.headless)
            .window_size(Some((1280, 1024)))
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(browser_error)?;

        let browser = Browser::new(options).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        info!("Browser session started (headless: {})", settings.headless);

        Ok(Self {
            _browser: browser,
            tab,
        })
    }
}

impl Navigator for ChromeNavigator {
    fn load(&mut self, url: &str) -> Result<(), NavigationError> {
        self.tab.navigate_to(url).map_err(|e| unreachable(url, e))?;
        self.tab.wait_until_navigated().map_err(|e| unreachable(url, e))?;
        debug!("Loaded {}", url);
        Ok(())
    }

    fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<(), NavigationError> {
        self.tab
            .wait_for_element_with_custom_timeout(css, timeout)
            .map(|_| ())
            .map_err(|_| NavigationError::ElementNotFound {
                selector: css.to_string(),
                timeout,
            })
    }

    fn snapshot(&mut self) -> Result<Html, NavigationError> {
        let content = self.tab.get_content().map_err(browser_error)?;
        Ok(Html::parse_document(&content))
    }

    fn execute(&mut self, script: &str) -> Result<(), NavigationError> {
        self.tab.evaluate(script, false).map_err(browser_error)?;
        Ok(())
    }

    fn fill(&mut self, css: &str, value: &str) -> Result<(), NavigationError> {
        let element = self.tab.wait_for_element(css).map_err(browser_error)?;
        element.click().map_err(browser_error)?;
        self.tab.type_str(value).map_err(browser_error)?;
        Ok(())
    }

    fn wait_for_navigation(&mut self) -> Result<(), NavigationError> {
        self.tab.wait_until_navigated().map_err(browser_error)?;
        Ok(())
    }

    fn set_cookie(&mut self, name: &str, value: &str) -> Result<(), NavigationError> {
        self.tab
            .set_cookies(vec![CookieParam {
                name: name.to_string(),
                value: value.to_string(),
                url: None,
                domain: Some(COOKIE_DOMAIN.to_string()),
                path: Some("/".to_string()),
                secure: Some(true),
                http_only: None,
                same_site: None,
                expires: None,
                priority: None,
                same_party: None,
                source_scheme: None,
                source_port: None,
                partition_key: None,
            }])
            .map_err(browser_error)?;
        debug!("Set cookie {} for {}", name, COOKIE_DOMAIN);
        Ok(())
    }

    fn current_url(&self) -> String {
        self.tab.get_url()
    }

    fn pause(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn close(&mut self) {
        if let Err(e) = self.tab.close(true) {
            warn!("Failed to close browser tab: {}", e);
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use crate::linkedin::dom;
    use std::collections::{HashMap, VecDeque};

    /// Serves fixture HTML per URL.
    #[derive(Debug, Default)]
    pub struct StaticNavigator {
        pages: HashMap<String, String>,
        // Replaces a page's HTML the first time something waits on it.
        late_renders: HashMap<String, String>,
        // Targets of the navigations that successive submits start.
        redirects: VecDeque<String>,
        pending: Option<String>,
        current: Option<String>,
        pub visits: Vec<String>,
        pub scripts: Vec<String>,
        pub filled: Vec<(String, String)>,
        pub submitted: Vec<String>,
        pub waits: Vec<(String, Duration)>,
        pub closed: bool,
    }

    impl StaticNavigator {
        pub fn with_page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        /// Serve `html` at `url` only once the page has been waited on.
        pub fn with_late_render(mut self, url: &str, html: &str) -> Self {
            self.late_renders.insert(url.to_string(), html.to_string());
            self
        }

        /// The next submit navigates to `url`, visible after
        /// `wait_for_navigation`.
        pub fn with_redirect_on_submit(mut self, url: &str) -> Self {
            self.redirects.push_back(url.to_string());
            self
        }
    }

    impl Navigator for StaticNavigator {
        fn load(&mut self, url: &str) -> Result<(), NavigationError> {
            self.visits.push(url.to_string());
            if !self.pages.contains_key(url) {
                return Err(NavigationError::Unreachable {
                    url: url.to_string(),
                    reason: "no fixture".to_string(),
                });
            }
            self.current = Some(url.to_string());
            Ok(())
        }

        fn wait_for(&mut self, css: &str, timeout: Duration) -> Result<(), NavigationError> {
            self.waits.push((css.to_string(), timeout));
            if let Some(url) = self.current.clone() {
                if let Some(html) = self.late_renders.remove(&url) {
                    self.pages.insert(url, html);
                }
            }
            let document = self.snapshot()?;
            match dom::find_in(&document, css) {
                Some(_) => Ok(()),
                None => Err(NavigationError::ElementNotFound {
                    selector: css.to_string(),
                    timeout,
                }),
            }
        }

        fn snapshot(&mut self) -> Result<Html, NavigationError> {
            let html = self
                .current
                .as_ref()
                .and_then(|url| self.pages.get(url))
                .map(String::as_str)
                .unwrap_or("");
            Ok(Html::parse_document(html))
        }

        fn execute(&mut self, script: &str) -> Result<(), NavigationError> {
            self.scripts.push(script.to_string());
            Ok(())
        }

        fn fill(&mut self, css: &str, value: &str) -> Result<(), NavigationError> {
            self.filled.push((css.to_string(), value.to_string()));
            Ok(())
        }

        fn submit(&mut self, css: &str) -> Result<(), NavigationError> {
            self.submitted.push(css.to_string());
            self.pending = self.redirects.pop_front();
            Ok(())
        }

        fn wait_for_navigation(&mut self) -> Result<(), NavigationError> {
            if let Some(url) = self.pending.take() {
                self.visits.push(url.clone());
                self.current = Some(url);
            }
            Ok(())
        }

        fn current_url(&self) -> String {
            self.current.clone().unwrap_or_default()
        }

        fn pause(&mut self, _duration: Duration) {}

        fn close(&mut self) {
            self.closed = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StaticNavigator;
    use super::*;

    fn credentials(cookie: Option<&str>) -> Credentials {
        Credentials {
            email: "scraper@example.com".to_string(),
            password: "hunter2".to_string(),
            session_cookie: cookie.map(str::to_string),
        }
    }

    #[test]
    fn test_cookie_login_skips_form() {
        let mut navigator = StaticNavigator::default().with_page(LOGIN_URL, "<form></form>");
        login(&mut navigator, &credentials(Some("abc")), Duration::from_secs(1)).unwrap();

        assert!(navigator.filled.is_empty());
        assert_eq!(navigator.scripts.len(), 1);
        assert!(navigator.scripts[0].contains("li_at=abc"));
    }

    #[test]
    fn test_form_login_fills_and_verifies() {
        let page = r#"<form><input id="username"><input id="password"></form>
                      <a class="global-nav__primary-link">Home</a>"#;
        let mut navigator = StaticNavigator::default().with_page(LOGIN_URL, page);
        login(&mut navigator, &credentials(None), Duration::from_secs(1)).unwrap();

        assert_eq!(
            navigator.filled,
            vec![
                ("#username".to_string(), "scraper@example.com".to_string()),
                ("#password".to_string(), "hunter2".to_string()),
            ]
        );
        assert_eq!(navigator.submitted, vec!["#password".to_string()]);
        assert!(navigator.is_signed_in(Duration::from_secs(1)));
    }

    #[test]
    fn test_checkpoint_confirms_remember_prompt() {
        let login_page = r#"<form><input id="username"><input id="password"></form>"#;
        let checkpoint = r#"<form><button id="remember-me-prompt__form-primary">Yes</button></form>
                            <a class="global-nav__primary-link">Home</a>"#;
        let mut navigator = StaticNavigator::default()
            .with_page(LOGIN_URL, login_page)
            .with_page(CHECKPOINT_URL, checkpoint)
            .with_redirect_on_submit(CHECKPOINT_URL);
        login(&mut navigator, &credentials(None), Duration::from_secs(1)).unwrap();

        assert_eq!(
            navigator.submitted,
            vec!["#password".to_string(), REMEMBER_PROMPT.to_string()]
        );
        assert_eq!(navigator.current_url(), CHECKPOINT_URL);
    }

    #[test]
    fn test_signed_in_waits_for_late_navigation_bar() {
        let mut navigator = StaticNavigator::default()
            .with_page(LOGIN_URL, "<main></main>")
            .with_late_render(LOGIN_URL, r#"<a class="global-nav__primary-link">Home</a>"#);
        navigator.load(LOGIN_URL).unwrap();

        assert!(navigator.is_signed_in(Duration::from_secs(5)));
        assert_eq!(
            navigator.waits,
            vec![(SIGNED_IN_MARKER.to_string(), Duration::from_secs(5))]
        );
    }

    #[test]
    fn test_signed_in_is_false_without_marker() {
        let mut navigator = StaticNavigator::default().with_page(LOGIN_URL, "<main></main>");
        navigator.load(LOGIN_URL).unwrap();
        assert!(!navigator.is_signed_in(Duration::from_millis(1)));
    }

    #[test]
    fn test_form_login_without_marker_fails() {
        let page = r#"<form><input id="username"><input id="password"></form>"#;
        let mut navigator = StaticNavigator::default().with_page(LOGIN_URL, page);
        let err = login(&mut navigator, &credentials(None), Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, NavigationError::ElementNotFound { .. }));
    }
}

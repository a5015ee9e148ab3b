use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::browser::login::LoginCredentials;

pub const CONFIG_FILE: &str = "config.properties";

const DEFAULT_KIOSK_URL: &str = "https://arjun-up.ryarramsetti.axiadids.net:8442/user";
const DEFAULT_USERNAME: &str = "arun10";
const DEFAULT_PASSWORD: &str = "test";
const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Browser requested by configuration. The driver speaks CDP, so chrome and
/// edge map to Chromium executables; firefox is rejected at session launch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
}

impl BrowserKind {
    /// Unrecognized values fall back to chrome.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "firefox" => BrowserKind::Firefox,
            "edge" => BrowserKind::Edge,
            _ => BrowserKind::Chrome,
        }
    }
}

impl std::fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub kiosk_url: String,
    pub username: String,
    pub password: String,
    pub browser: BrowserKind,
    pub headless: bool,
    pub timeout_secs: u64,
}

impl Config {
    /// Load from `config.properties` in the working directory. A missing or
    /// unreadable file yields the built-in defaults, not an error.
    pub fn load() -> Self {
        Self::from_file(Path::new(CONFIG_FILE))
    }

    pub fn from_file(path: &Path) -> Self {
        let props = match fs::read_to_string(path) {
            Ok(contents) => parse_properties(&contents),
            Err(_) => {
                tracing::warn!("config file {} not found, using defaults", path.display());
                HashMap::new()
            }
        };
        Self::from_properties(&props)
    }

    fn from_properties(props: &HashMap<String, String>) -> Self {
        let defaults = Config::default();
        Self {
            kiosk_url: props
                .get("kiosk.url")
                .cloned()
                .unwrap_or(defaults.kiosk_url),
            username: props.get("username").cloned().unwrap_or(defaults.username),
            password: props.get("password").cloned().unwrap_or(defaults.password),
            browser: props
                .get("browser")
                .map(|s| BrowserKind::parse(s))
                .unwrap_or(defaults.browser),
            // Only the literal "true" (any case) enables headless
            headless: props
                .get("headless")
                .map(|s| s.trim().eq_ignore_ascii_case("true"))
                .unwrap_or(defaults.headless),
            timeout_secs: props
                .get("timeout")
                .and_then(|s| s.trim().parse().ok())
                .unwrap_or(defaults.timeout_secs),
        }
    }

    /// Per-locator visibility timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn credentials(&self) -> LoginCredentials {
        LoginCredentials {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }

    /// Password masked for log output.
    pub fn masked_password(&self) -> String {
        "*".repeat(self.password.chars().count())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kiosk_url: DEFAULT_KIOSK_URL.to_string(),
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            browser: BrowserKind::Chrome,
            headless: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// `KEY=VALUE` lines; `#` and `!` start comment lines.
fn parse_properties(contents: &str) -> HashMap<String, String> {
    let mut props = HashMap::new();
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            props.insert(key.trim().to_string(), value.trim().to_string());
        }
    }
    props
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let config = Config::from_file(Path::new("/nonexistent/config.properties"));
        assert_eq!(config.kiosk_url, DEFAULT_KIOSK_URL);
        assert_eq!(config.username, "arun10");
        assert_eq!(config.password, "test");
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert!(!config.headless);
        assert_eq!(config.timeout_secs, 15);
    }

    #[test]
    fn parses_properties_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.properties");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "# kiosk portal settings").unwrap();
        writeln!(file, "kiosk.url = https://example.test/login").unwrap();
        writeln!(file, "username=operator").unwrap();
        writeln!(file, "password=s3cret").unwrap();
        writeln!(file, "browser=edge").unwrap();
        writeln!(file, "headless=true").unwrap();
        writeln!(file, "timeout=30").unwrap();

        let config = Config::from_file(&path);
        assert_eq!(config.kiosk_url, "https://example.test/login");
        assert_eq!(config.username, "operator");
        assert_eq!(config.password, "s3cret");
        assert_eq!(config.browser, BrowserKind::Edge);
        assert!(config.headless);
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn bad_values_fall_back_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.properties");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "timeout=soon").unwrap();
        writeln!(file, "browser=netscape").unwrap();
        writeln!(file, "headless=yes").unwrap();
        writeln!(file, "username=operator").unwrap();

        let config = Config::from_file(&path);
        assert_eq!(config.timeout_secs, 15);
        assert_eq!(config.browser, BrowserKind::Chrome);
        assert!(!config.headless, "only the literal true enables headless");
        assert_eq!(config.username, "operator");
    }

    #[test]
    fn comments_and_blank_lines_are_skipped() {
        let props = parse_properties("\n# comment\n! also a comment\n  \nusername=u\nnot a pair\n");
        assert_eq!(props.len(), 1);
        assert_eq!(props.get("username").map(String::as_str), Some("u"));
    }

    #[test]
    fn masked_password_hides_every_character() {
        let config = Config {
            password: "hunter2".to_string(),
            ..Config::default()
        };
        assert_eq!(config.masked_password(), "*******");
    }

    #[test]
    fn browser_kind_parse() {
        assert_eq!(BrowserKind::parse("Chrome"), BrowserKind::Chrome);
        assert_eq!(BrowserKind::parse("FIREFOX"), BrowserKind::Firefox);
        assert_eq!(BrowserKind::parse(" edge "), BrowserKind::Edge);
        assert_eq!(BrowserKind::parse("netscape"), BrowserKind::Chrome);
    }
}

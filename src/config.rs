use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "http://localhost:3001";

#[derive(Clone, Debug)]
pub struct Config {
    pub api_url: String,
    pub session_file: PathBuf,
    pub http_timeout: Duration,
    pub page_size: usize,
    pub profile: String,
}

impl Config {
    pub fn from_env() -> Self {
        let profile = env::var("PROFILE").unwrap_or_else(|_| "default".to_string());

        let session_file = env::var("LIBRARY_SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| default_session_file(&profile));

        Self {
            api_url: env::var("LIBRARY_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string()),
            session_file,
            http_timeout: Duration::from_secs(
                env::var("LIBRARY_HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            page_size: env::var("LIBRARY_PAGE_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(5),
            profile,
        }
    }

    /// Apply command-line overrides. A new profile moves the session file
    /// unless LIBRARY_SESSION_FILE pins it.
    pub fn with_overrides(mut self, api_url: Option<String>, profile: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if let Some(profile) = profile {
            if env::var("LIBRARY_SESSION_FILE").is_err() {
                self.session_file = default_session_file(&profile);
            }
            self.profile = profile;
        }
        self
    }
}

/// Get the path to the session file
fn default_session_file(profile: &str) -> PathBuf {
    let filename = if profile == "default" {
        "session.json".to_string()
    } else {
        format!("session_{}.json", profile)
    };
    // On macOS: ~/Library/Caches/libris/session.json
    // On Linux: ~/.cache/libris/session.json
    // On Windows: %LOCALAPPDATA%\libris\session.json

    #[cfg(target_os = "macos")]
    let base = env::var("HOME")
        .map(|home| PathBuf::from(home).join("Library").join("Caches"))
        .ok();

    #[cfg(target_os = "windows")]
    let base = env::var("LOCALAPPDATA").map(PathBuf::from).ok();

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let base = env::var("XDG_CACHE_HOME")
        .map(PathBuf::from)
        .or_else(|_| env::var("HOME").map(|home| PathBuf::from(home).join(".cache")))
        .ok();

    base.unwrap_or_else(|| PathBuf::from("."))
        .join("libris")
        .join(filename)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const KEYS: [&str; 5] = [
        "PROFILE",
        "LIBRARY_API_URL",
        "LIBRARY_SESSION_FILE",
        "LIBRARY_HTTP_TIMEOUT_SECS",
        "LIBRARY_PAGE_SIZE",
    ];

    fn clear_env() {
        for key in KEYS {
            // SAFETY: tests touching the environment are serialized
            unsafe { env::remove_var(key) };
        }
    }

    #[test]
    #[serial]
    fn defaults() {
        clear_env();
        let config = Config::from_env();

        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.page_size, 5);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
        assert!(config.session_file.ends_with("libris/session.json"));
    }

    #[test]
    #[serial]
    fn reads_overrides() {
        clear_env();
        unsafe {
            env::set_var("PROFILE", "branch2");
            env::set_var("LIBRARY_API_URL", "http://books.internal:8080");
            env::set_var("LIBRARY_PAGE_SIZE", "0");
            env::set_var("LIBRARY_HTTP_TIMEOUT_SECS", "3");
        }

        let config = Config::from_env();
        assert_eq!(config.api_url, "http://books.internal:8080");
        assert_eq!(config.page_size, 5);
        assert_eq!(config.http_timeout, Duration::from_secs(3));
        assert!(config.session_file.ends_with("session_branch2.json"));

        clear_env();
    }

    #[test]
    #[serial]
    fn cli_profile_moves_session_file() {
        clear_env();
        let config = Config::from_env()
            .with_overrides(Some("http://10.0.0.5:3001".into()), Some("desk".into()));

        assert_eq!(config.api_url, "http://10.0.0.5:3001");
        assert_eq!(config.profile, "desk");
        assert!(config.session_file.ends_with("session_desk.json"));
    }

    #[test]
    #[serial]
    fn pinned_session_file_survives_profile() {
        clear_env();
        unsafe { env::set_var("LIBRARY_SESSION_FILE", "/tmp/libris-pinned.json") };

        let config = Config::from_env().with_overrides(None, Some("desk".into()));
        assert_eq!(config.session_file, PathBuf::from("/tmp/libris-pinned.json"));
        assert_eq!(config.api_url, DEFAULT_API_URL);

        clear_env();
    }
}

use super::*;

/// # Safety
/// Env-mutating tests share process globals; keep them serial with
/// `--test-threads=1` if more are added.
unsafe fn clear_client_env() {
    unsafe {
        std::env::remove_var("GOPHORA_API_URL");
        std::env::remove_var("GOPHORA_REQUEST_TIMEOUT_SECS");
        std::env::remove_var("GOPHORA_CONNECT_TIMEOUT_SECS");
        std::env::remove_var("GOPHORA_STORAGE_PATH");
    }
}

// =============================================================================
// from_env
// =============================================================================

#[test]
fn from_env_reads_overrides_and_falls_back() {
    unsafe {
        clear_client_env();
        std::env::set_var("GOPHORA_API_URL", "https://api.gophora.test/");
        std::env::set_var("GOPHORA_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("GOPHORA_CONNECT_TIMEOUT_SECS", "not-a-number");
        std::env::set_var("GOPHORA_STORAGE_PATH", "/tmp/gophora-test/storage.json");
    }

    let cfg = ClientConfig::from_env().unwrap();
    assert_eq!(cfg.api_url, "https://api.gophora.test");
    assert_eq!(cfg.timeouts, HttpTimeouts { request_secs: 42, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS });
    assert_eq!(cfg.storage_path, PathBuf::from("/tmp/gophora-test/storage.json"));

    unsafe { clear_client_env() };
}

// =============================================================================
// normalize_api_url
// =============================================================================

#[test]
fn api_url_defaults_to_localhost() {
    assert_eq!(normalize_api_url(None).unwrap(), DEFAULT_API_URL);
}

#[test]
fn api_url_trims_whitespace_and_trailing_slashes() {
    assert_eq!(normalize_api_url(Some("  http://backend:8000//  ")).unwrap(), "http://backend:8000");
}

#[test]
fn api_url_rejects_non_http_scheme() {
    let err = normalize_api_url(Some("ftp://backend")).unwrap_err();
    assert!(matches!(err, SessionError::Config(_)));
    assert!(err.to_string().contains("ftp://backend"));
}

#[test]
fn with_api_url_validates() {
    let cfg = ClientConfig {
        api_url: DEFAULT_API_URL.into(),
        timeouts: HttpTimeouts::default(),
        storage_path: PathBuf::from("storage.json"),
    };
    assert!(cfg.clone().with_api_url("backend:8000").is_err());
    assert_eq!(cfg.with_api_url("https://x.test/").unwrap().api_url, "https://x.test");
}

// =============================================================================
// default_storage_path
// =============================================================================

#[test]
fn storage_path_under_home() {
    assert_eq!(default_storage_path(Some("/home/ada")), PathBuf::from("/home/ada/.gophora/storage.json"));
}

#[test]
fn storage_path_relative_without_home() {
    assert_eq!(default_storage_path(None), PathBuf::from(".gophora/storage.json"));
    assert_eq!(default_storage_path(Some("")), PathBuf::from(".gophora/storage.json"));
}

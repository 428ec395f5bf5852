use super::*;

fn session() -> Session {
    Session {
        user_id: "u-1".into(),
        email: "ada@example.com".into(),
        role: Role::Seeker,
        access_token: "access-secret".into(),
        refresh_token: "refresh-secret".into(),
    }
}

// =============================================================================
// Role
// =============================================================================

#[test]
fn role_parses_lowercase_names() {
    assert_eq!("seeker".parse::<Role>().unwrap(), Role::Seeker);
    assert_eq!("provider".parse::<Role>().unwrap(), Role::Provider);
}

#[test]
fn role_rejects_unknown_and_mixed_case() {
    assert_eq!("admin".parse::<Role>().unwrap_err(), UnknownRole("admin".into()));
    assert!("Seeker".parse::<Role>().is_err());
    assert!("".parse::<Role>().is_err());
}

#[test]
fn role_home_is_own_dashboard() {
    assert_eq!(Role::Seeker.home().path(), "/seeker/dashboard");
    assert_eq!(Role::Provider.home().path(), "/provider/dashboard");
}

#[test]
fn role_serializes_lowercase() {
    assert_eq!(serde_json::to_string(&Role::Provider).unwrap(), "\"provider\"");
}

// =============================================================================
// Session
// =============================================================================

#[test]
fn session_debug_redacts_tokens() {
    let debug = format!("{:?}", session());
    assert!(debug.contains("ada@example.com"));
    assert!(!debug.contains("access-secret"));
    assert!(!debug.contains("refresh-secret"));
}

#[test]
fn session_serialize_omits_tokens() {
    let json = serde_json::to_value(session()).unwrap();
    assert_eq!(json["role"], "seeker");
    assert!(json.get("access_token").is_none());
    assert!(json.get("refresh_token").is_none());
}

// =============================================================================
// AuthPhase
// =============================================================================

#[test]
fn phase_session_only_when_authenticated() {
    assert!(AuthPhase::Initializing.session().is_none());
    assert!(AuthPhase::Anonymous.session().is_none());
    assert_eq!(AuthPhase::Authenticated(session()).session().unwrap().user_id, "u-1");
}

#[test]
fn phase_loading_only_while_initializing() {
    assert!(AuthPhase::Initializing.is_loading());
    assert!(!AuthPhase::Anonymous.is_loading());
    assert_eq!(AuthPhase::Authenticated(session()).label(), "authenticated");
}

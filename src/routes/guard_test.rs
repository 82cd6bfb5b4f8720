use super::*;

// =============================================================================
// decide — rule table
// =============================================================================

#[test]
fn protected_without_marker_redirects_to_login() {
    assert_eq!(decide("/me", false), GuardDecision::RedirectToLogin);
    assert_eq!(decide("/dashboard", false), GuardDecision::RedirectToLogin);
}

#[test]
fn protected_subpaths_are_protected() {
    assert_eq!(decide("/dashboard/settings", false), GuardDecision::RedirectToLogin);
    assert_eq!(decide("/me/edit", false), GuardDecision::RedirectToLogin);
}

#[test]
fn protected_with_marker_is_allowed() {
    assert_eq!(decide("/me", true), GuardDecision::Allow);
    assert_eq!(decide("/dashboard", true), GuardDecision::Allow);
}

#[test]
fn login_with_marker_redirects_to_dashboard() {
    assert_eq!(decide("/login", true), GuardDecision::RedirectToDashboard);
}

#[test]
fn login_without_marker_is_allowed() {
    assert_eq!(decide("/login", false), GuardDecision::Allow);
}

#[test]
fn root_is_always_allowed() {
    assert_eq!(decide("/", false), GuardDecision::Allow);
    assert_eq!(decide("/", true), GuardDecision::Allow);
}

#[test]
fn api_paths_are_other() {
    assert_eq!(decide("/api/users/me", false), GuardDecision::Allow);
    assert_eq!(decide("/api/users/login", true), GuardDecision::Allow);
}

#[test]
fn lookalike_paths_are_other() {
    assert_eq!(decide("/metrics", false), GuardDecision::Allow);
    assert_eq!(decide("/members", false), GuardDecision::Allow);
    assert_eq!(decide("/dashboards", false), GuardDecision::Allow);
    assert_eq!(decide("/login-help", true), GuardDecision::Allow);
}

#[test]
fn login_subpaths_are_other() {
    assert_eq!(decide("/login/reset", true), GuardDecision::Allow);
}

#[test]
fn trailing_slash_stays_protected() {
    assert_eq!(decide("/me/", false), GuardDecision::RedirectToLogin);
    assert_eq!(decide("/dashboard/", false), GuardDecision::RedirectToLogin);
}

// =============================================================================
// location
// =============================================================================

#[test]
fn decision_locations() {
    assert_eq!(GuardDecision::Allow.location(), None);
    assert_eq!(GuardDecision::RedirectToLogin.location(), Some("/login"));
    assert_eq!(GuardDecision::RedirectToDashboard.location(), Some("/dashboard"));
}

//! Client route classification.
//!
//! Protected views verify the session before rendering; guest-only views are
//! the authentication pages themselves, which bounce already-signed-in users
//! to the dashboard. Everything else (marketing pages, the public contact
//! lookup) renders with no session check at all.

/// Paths that require a live session
const PROTECTED: &[&str] = &["/dashboard", "/profile", "/settings", "/cart", "/my-qr-tags"];

/// Paths only shown to signed-out visitors
const GUEST_ONLY: &[&str] = &["/login", "/signup", "/verify-email"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteClass {
    Public,
    Protected,
    GuestOnly,
}

/// Classify a client path, ignoring any query string
pub fn classify(path: &str) -> RouteClass {
    let path = path.split('?').next().unwrap_or(path);

    if matches_any(path, PROTECTED) {
        RouteClass::Protected
    } else if matches_any(path, GUEST_ONLY) {
        RouteClass::GuestOnly
    } else {
        RouteClass::Public
    }
}

fn matches_any(path: &str, prefixes: &[&str]) -> bool {
    prefixes
        .iter()
        .any(|p| path == *p || path.starts_with(&format!("{}/", p)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_paths() {
        assert_eq!(classify("/dashboard"), RouteClass::Protected);
        assert_eq!(classify("/my-qr-tags"), RouteClass::Protected);
        assert_eq!(classify("/settings/security"), RouteClass::Protected);
    }

    #[test]
    fn test_guest_only_paths_with_query() {
        assert_eq!(classify("/login"), RouteClass::GuestOnly);
        assert_eq!(
            classify("/verify-email?email=a@b.com"),
            RouteClass::GuestOnly
        );
    }

    #[test]
    fn test_public_paths() {
        assert_eq!(classify("/"), RouteClass::Public);
        assert_eq!(classify("/qr-tags"), RouteClass::Public);
        assert_eq!(classify("/contact/TL-1042"), RouteClass::Public);
        assert_eq!(classify("/pricing"), RouteClass::Public);
        // Prefix matching is per-segment, not substring.
        assert_eq!(classify("/dashboard-tour"), RouteClass::Public);
    }
}

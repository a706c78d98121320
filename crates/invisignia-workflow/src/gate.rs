//! Route-access gate.
//!
//! A pure decision function callable from any host routing layer. Fails
//! closed: protected paths without a live session go to login; auth pages
//! with a live session go to the protected area.

pub const APP_PATH: &str = "/app";
pub const LOGIN_PATH: &str = "/login";
pub const REGISTER_PATH: &str = "/register";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allow,
    RedirectTo(&'static str),
}

pub fn decide_access(has_session: bool, requested_path: &str) -> Access {
    if requested_path.starts_with(APP_PATH) && !has_session {
        return Access::RedirectTo(LOGIN_PATH);
    }
    if (requested_path == LOGIN_PATH || requested_path == REGISTER_PATH) && has_session {
        return Access::RedirectTo(APP_PATH);
    }
    Access::Allow
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protected_paths_fail_closed() {
        assert_eq!(decide_access(false, "/app"), Access::RedirectTo(LOGIN_PATH));
        assert_eq!(
            decide_access(false, "/app/upload"),
            Access::RedirectTo(LOGIN_PATH)
        );
        assert_eq!(decide_access(true, "/app/verify"), Access::Allow);
    }

    #[test]
    fn auth_pages_redirect_when_logged_in() {
        assert_eq!(decide_access(true, "/login"), Access::RedirectTo(APP_PATH));
        assert_eq!(decide_access(true, "/register"), Access::RedirectTo(APP_PATH));
        assert_eq!(decide_access(false, "/login"), Access::Allow);
        assert_eq!(decide_access(false, "/register"), Access::Allow);
    }

    #[test]
    fn public_paths_are_always_allowed() {
        assert_eq!(decide_access(false, "/"), Access::Allow);
        assert_eq!(decide_access(true, "/"), Access::Allow);
    }
}

//! Request context for attributing activity log entries.
//!
//! The caller passes the acting user and request metadata explicitly; there
//! is no global session or request state.

/// Who is acting, and from where.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    /// Authenticated user id, `None` for anonymous or system actions.
    pub user_id: Option<i64>,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestContext {
    /// A context without an authenticated user.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn for_user(user_id: i64) -> Self {
        Self {
            user_id: Some(user_id),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = Some(ip.into());
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// The acting user, if any. A zero id counts as unauthenticated.
    #[must_use]
    pub fn authenticated_user(&self) -> Option<i64> {
        self.user_id.filter(|id| *id != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_has_no_user() {
        assert_eq!(RequestContext::anonymous().authenticated_user(), None);
    }

    #[test]
    fn zero_user_is_not_authenticated() {
        assert_eq!(RequestContext::for_user(0).authenticated_user(), None);
    }

    #[test]
    fn builder_sets_request_fields() {
        let ctx = RequestContext::for_user(3)
            .with_ip("10.0.0.1")
            .with_user_agent("curl/8.0");
        assert_eq!(ctx.authenticated_user(), Some(3));
        assert_eq!(ctx.ip.as_deref(), Some("10.0.0.1"));
        assert_eq!(ctx.user_agent.as_deref(), Some("curl/8.0"));
    }
}

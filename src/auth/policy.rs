/// What an endpoint requires of the caller's (already trusted) identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Any caller with a valid, consistent token pair
    Anonymous,
    /// Only the named user
    SelfOnly { username: String },
    /// Only callers with the admin role
    AdminOnly,
    /// Only callers whose email is in the set
    MemberOf { emails: Vec<String> },
}

impl AuthPolicy {
    pub fn self_only(username: impl Into<String>) -> Self {
        AuthPolicy::SelfOnly {
            username: username.into(),
        }
    }

    pub fn member_of<I, S>(emails: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AuthPolicy::MemberOf {
            emails: emails.into_iter().map(Into::into).collect(),
        }
    }

    /// Short label for logs
    pub fn name(&self) -> &'static str {
        match self {
            AuthPolicy::Anonymous => "anonymous",
            AuthPolicy::SelfOnly { .. } => "self_only",
            AuthPolicy::AdminOnly => "admin_only",
            AuthPolicy::MemberOf { .. } => "member_of",
        }
    }
}

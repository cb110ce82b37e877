use shared::domain::UserProfile;

/// The client-held credential pair: an opaque bearer token and the profile
/// it resolves to. Invariant: a user is never present without a token. The
/// converse is allowed while a stored-token resolution is still in flight.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<UserProfile>,
}

impl Session {
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.token.is_none() && self.user.is_none()
    }

    /// Token restored from storage, profile resolution still pending.
    pub(crate) fn set_resolving(&mut self, token: String) {
        self.token = Some(token);
        self.user = None;
    }

    pub(crate) fn establish(&mut self, token: String, user: UserProfile) {
        self.token = Some(token);
        self.user = Some(user);
    }

    pub(crate) fn clear(&mut self) {
        self.token = None;
        self.user = None;
    }
}

/// Supplies the bearer credential for authenticated calls.
///
/// Acquiring the token is someone else's job; the gateway only asks for it
/// right before each request.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;

    fn apply_to_request(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.bearer_token() {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

/// A token handed in at startup.
pub struct StaticToken(String);

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl CredentialProvider for StaticToken {
    fn bearer_token(&self) -> Option<String> {
        let token = self.0.trim();
        if token.is_empty() { None } else { Some(token.to_string()) }
    }
}

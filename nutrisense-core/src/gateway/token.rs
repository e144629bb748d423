//! Bearer token source.

/// Supplies the bearer token for remote calls, if the user is signed in.
pub trait TokenProvider: Send + Sync {
    fn token(&self) -> Option<String>;
}

/// A token fixed for the whole session (e.g. from config).
#[derive(Clone, Default)]
pub struct StaticToken(Option<String>);

impl StaticToken {
    pub fn new(token: Option<String>) -> Self {
        // Blank tokens are treated as signed out.
        Self(token.filter(|t| !t.trim().is_empty()))
    }

    pub fn none() -> Self {
        Self(None)
    }
}

impl TokenProvider for StaticToken {
    fn token(&self) -> Option<String> {
        self.0.clone()
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("StaticToken(****)"),
            None => f.write_str("StaticToken(None)"),
        }
    }
}

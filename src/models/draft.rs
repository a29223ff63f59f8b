use crate::error::{DeckError, Result};
use crate::secret::OneTimePassword;

use super::EngineKind;

/// Form state of the create dialog. Dropped on successful submit or cancel.
#[derive(Debug, Default)]
pub struct NewInstanceDraft {
    pub name: String,
    pub user: String,
    pub password: OneTimePassword,
    pub engine: EngineKind,
}

impl NewInstanceDraft {
    pub fn new(name: impl Into<String>, user: impl Into<String>, password: &str, engine: EngineKind) -> Self {
        Self {
            name: name.into(),
            user: user.into(),
            password: OneTimePassword::new(password),
            engine,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() || self.user.trim().is_empty() || self.password.is_empty() {
            return Err(DeckError::validation("Please fill in all fields"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_requires_all_fields() {
        assert!(NewInstanceDraft::new("shop", "admin", "secret1", EngineKind::Mysql)
            .validate()
            .is_ok());
        for draft in [
            NewInstanceDraft::new("", "admin", "secret1", EngineKind::Mysql),
            NewInstanceDraft::new("shop", " ", "secret1", EngineKind::Mysql),
            NewInstanceDraft::new("shop", "admin", "", EngineKind::Mysql),
        ] {
            let err = draft.validate().unwrap_err();
            assert!(err.is_validation());
        }
    }
}

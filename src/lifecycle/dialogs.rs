use crate::error::{DeckError, Result};
use crate::models::DatabaseInstance;
use crate::secret::OneTimePassword;

/// A delete the user has been asked about but not yet agreed to.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingDeletion {
    id: i64,
    name: String,
}

impl PendingDeletion {
    pub(super) fn new(id: i64, name: String) -> Self {
        Self { id, name }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn prompt(&self) -> String {
        format!(
            "Are you sure you want to delete database \"{}\"? This action cannot be undone!",
            self.name
        )
    }

    pub fn confirm(self) -> ConfirmedDeletion {
        ConfirmedDeletion(self)
    }
}

/// Proof of explicit confirmation. The only way to reach `delete`.
#[derive(Debug)]
pub struct ConfirmedDeletion(PendingDeletion);

impl ConfirmedDeletion {
    pub fn id(&self) -> i64 {
        self.0.id
    }

    pub fn name(&self) -> &str {
        &self.0.name
    }
}

/// State of the change-password dialog.
#[derive(Debug)]
pub struct RotationDialog {
    pub target_id: i64,
    pub target_name: String,
    pub password: OneTimePassword,
    pub error: Option<String>,
    submitting: bool,
    open: bool,
}

impl RotationDialog {
    pub fn open(db: &DatabaseInstance) -> Self {
        Self {
            target_id: db.id,
            target_name: db.name.clone(),
            password: OneTimePassword::default(),
            error: None,
            submitting: false,
            open: true,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn generate(&mut self) {
        self.password = OneTimePassword::generate();
    }

    /// Validates and moves the password out for a single request.
    pub fn begin_submit(&mut self) -> Result<(i64, OneTimePassword)> {
        if self.submitting {
            return Err(DeckError::validation("Password change already in progress"));
        }
        if self.password.is_empty() {
            let err = DeckError::validation("Please enter a new password");
            self.error = Some(err.to_string());
            return Err(err);
        }
        self.submitting = true;
        self.error = None;
        Ok((self.target_id, self.password.take()))
    }

    pub fn finish(&mut self, outcome: Result<()>) {
        self.submitting = false;
        self.password.clear();
        match outcome {
            Ok(()) => {
                self.error = None;
                self.open = false;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
    }

    pub fn close(&mut self) {
        self.password.clear();
        self.open = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::instance::sample;
    use crate::models::EngineKind;

    #[test]
    fn test_begin_submit_takes_password() {
        let mut dialog = RotationDialog::open(&sample(4, "shop", EngineKind::Mysql, 0.0));
        dialog.generate();
        let (id, pw) = dialog.begin_submit().unwrap();
        assert_eq!(id, 4);
        assert_eq!(pw.len(), 16);
        assert!(dialog.password.is_empty());
        assert!(dialog.is_submitting());
        assert!(dialog.begin_submit().is_err());
    }

    #[test]
    fn test_close_wipes_password() {
        let mut dialog = RotationDialog::open(&sample(4, "shop", EngineKind::Mysql, 0.0));
        dialog.password.push('x');
        dialog.close();
        assert!(!dialog.is_open());
        assert!(dialog.password.is_empty());
    }
}

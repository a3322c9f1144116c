use std::sync::RwLock;

use crate::models::Credential;

/// Source of the current WebDAV credential. `None` means remote storage has
/// not been configured yet, which is a normal state.
pub trait AuthorizationProvider: Send + Sync {
    fn current_credential(&self) -> Option<Credential>;
}

/// Credential held in memory, typically loaded from configuration.
/// It can be replaced or cleared at runtime when the user edits settings.
#[derive(Debug, Default)]
pub struct StaticAuthorization {
    credential: RwLock<Option<Credential>>,
}

impl StaticAuthorization {
    pub fn new(credential: Option<Credential>) -> Self {
        Self {
            credential: RwLock::new(credential),
        }
    }

    /// Builds a credential only when both parts are present and non-empty
    pub fn from_parts(username: Option<String>, password: Option<String>) -> Self {
        let credential = match (username, password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some(Credential::new(user, pass))
            }
            _ => None,
        };
        Self::new(credential)
    }

    pub fn set(&self, credential: Option<Credential>) {
        let mut guard = self.credential.write().unwrap_or_else(|e| e.into_inner());
        *guard = credential;
    }
}

impl AuthorizationProvider for StaticAuthorization {
    fn current_credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

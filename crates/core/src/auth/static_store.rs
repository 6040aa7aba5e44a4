use super::{CredentialError, CredentialStore, Credentials};

/// Credential store holding a fixed username/password pair,
/// typically taken from the config file or its environment overrides.
pub struct StaticCredentialStore {
    credentials: Credentials,
}

impl StaticCredentialStore {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialStore for StaticCredentialStore {
    fn credentials(&self) -> Result<Credentials, CredentialError> {
        if self.credentials.username.is_empty() {
            return Err(CredentialError::Unavailable(
                "username is empty".to_string(),
            ));
        }
        Ok(self.credentials.clone())
    }
}

mod none;
mod session;
mod traits;
mod types;

pub use none::*;
pub use session::*;
pub use traits::*;
pub use types::*;

use std::sync::Arc;

use crate::config::{AuthConfig, AuthMethod};

/// Factory function to create an authenticator from config. The session
/// store is only consulted for the session method.
pub fn create_authenticator(
    config: &AuthConfig,
    sessions: Arc<dyn SessionStore>,
) -> Box<dyn Authenticator> {
    match config.method {
        AuthMethod::None => Box::new(NoneAuthenticator::new()),
        AuthMethod::Session => Box::new(SessionAuthenticator::new(sessions)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_authenticator_none() {
        let sessions: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::in_memory().unwrap());
        let config = AuthConfig {
            method: AuthMethod::None,
            session_ttl_hours: 720,
        };
        let auth = create_authenticator(&config, sessions);
        assert_eq!(auth.method_name(), "none");
    }

    #[test]
    fn test_create_authenticator_session() {
        let sessions: Arc<dyn SessionStore> = Arc::new(SqliteSessionStore::in_memory().unwrap());
        let config = AuthConfig {
            method: AuthMethod::Session,
            session_ttl_hours: 720,
        };
        let auth = create_authenticator(&config, sessions);
        assert_eq!(auth.method_name(), "session");
    }
}

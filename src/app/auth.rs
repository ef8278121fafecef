// src/app/auth.rs: placeholder login gate
use std::rc::Rc;

use tracing::{info, warn};

use super::observable::Subject;
use super::store::KeyValueStore;

pub const LOGIN_KEY: &str = "isLoggedIn";

// Placeholder credentials; there is no real account backend.
const VALID_USERNAME: &str = "admin";
const VALID_PASSWORD: &str = "pass123";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoginError {
    MissingFields,
    InvalidCredentials,
}

impl LoginError {
    pub const fn message(self) -> &'static str {
        match self {
            Self::MissingFields => "Please enter a username and password.",
            Self::InvalidCredentials => "Incorrect username or password.",
        }
    }
}

pub struct AuthState {
    logged_in: Subject<bool>,
    store: Rc<dyn KeyValueStore>,
}

impl AuthState {
    pub fn new(store: Rc<dyn KeyValueStore>) -> Self {
        let logged_in = store.load(LOGIN_KEY).as_deref() == Some("true");
        Self {
            logged_in: Subject::new(logged_in),
            store,
        }
    }

    pub fn is_logged_in(&self) -> bool {
        self.logged_in.get()
    }

    pub fn login(&self, username: &str, password: &str) -> Result<(), LoginError> {
        if username.is_empty() || password.is_empty() {
            warn!("login form incomplete");
            return Err(LoginError::MissingFields);
        }
        if username == VALID_USERNAME && password == VALID_PASSWORD {
            self.logged_in.set(true);
            if let Err(e) = self.store.save(LOGIN_KEY, "true") {
                warn!("failed to persist login state: {e}");
            }
            info!("user `{username}` logged in");
            Ok(())
        } else {
            self.clear();
            warn!("failed login attempt for `{username}`");
            Err(LoginError::InvalidCredentials)
        }
    }

    pub fn logout(&self) {
        self.clear();
        info!("logged out");
    }

    fn clear(&self) {
        self.logged_in.set(false);
        if let Err(e) = self.store.remove(LOGIN_KEY) {
            warn!("failed to clear login state: {e}");
        }
    }
}

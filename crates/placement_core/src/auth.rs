//! crates/placement_core/src/auth.rs
//!
//! Account creation and credential checks. Passwords are stored only as salted
//! hashes produced by the `PasswordHasher` port.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::{NewUser, User};
use crate::error::{require, GuidanceResult};
use crate::ports::{PasswordHasher, PortError, UserStore};

#[derive(Clone)]
pub struct Authenticator {
    users: Arc<dyn UserStore>,
    hasher: Arc<dyn PasswordHasher>,
}

impl Authenticator {
    pub fn new(users: Arc<dyn UserStore>, hasher: Arc<dyn PasswordHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn signup(
        &self,
        email: &str,
        password: &str,
        full_name: &str,
    ) -> GuidanceResult<User> {
        require(full_name, "Full name")?;
        require(email, "Email")?;
        require(password, "Password")?;

        let password_hash = self.hasher.hash(password)?;
        let user = self
            .users
            .create_user(NewUser {
                email: normalize_email(email),
                full_name: full_name.trim().to_string(),
                password_hash,
            })
            .await?;
        info!("Created user {}.", user.user_id);
        Ok(user)
    }

    /// Unknown email and wrong password both yield `PortError::Unauthorized`.
    pub async fn login(&self, email: &str, password: &str) -> GuidanceResult<User> {
        require(email, "Email")?;
        require(password, "Password")?;

        let credentials = match self.users.get_user_by_email(&normalize_email(email)).await {
            Ok(c) => c,
            Err(PortError::NotFound(_)) => return Err(PortError::Unauthorized.into()),
            Err(e) => return Err(e.into()),
        };

        if !self.hasher.verify(password, &credentials.password_hash)? {
            warn!("Failed login for user {}.", credentials.user_id);
            return Err(PortError::Unauthorized.into());
        }

        Ok(self.users.get_user_by_id(credentials.user_id).await?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use crate::errors::{AppError, AppResult, StoreResult};
use crate::models::{AuthOutcome, RegisterForm, User};
use super::flat_file;

pub const USER_HEADER: [&str; 2] = ["username", "password"];

// The column keeps its historical name; it holds the bcrypt hash.
#[derive(Debug, Serialize, Deserialize)]
struct UserRecord {
    username: String,
    password: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        User {
            username: record.username,
            password_hash: record.password,
        }
    }
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        UserRecord {
            username: user.username.clone(),
            password: user.password_hash.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CredentialStore {
    path: PathBuf,
    bcrypt_cost: u32,
    lock: Arc<Mutex<()>>,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>, bcrypt_cost: u32) -> Self {
        Self {
            path: path.into(),
            bcrypt_cost,
            lock: Arc::new(Mutex::new(())),
        }
    }

    #[cfg(test)]
    pub fn path(&self) -> &std::path::Path {
        &self.path
    }

    pub fn load_users(&self) -> StoreResult<Vec<User>> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        self.read_all()
    }

    /// Appends a user without checking for duplicates; see [`Self::register`].
    pub fn save_user(&self, username: &str, password: &str) -> StoreResult<User> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut users = self.read_all()?;
        self.append_user(&mut users, username, password)
    }

    /// Validates a registration form and stores the new user. The duplicate
    /// check and the append happen under one lock.
    pub fn register(&self, form: &RegisterForm) -> AppResult<User> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut users = self.read_all()?;
        if users.iter().any(|u| u.username == form.username) {
            return Err(AppError::Validation("Username exists.".into()));
        }
        if form.password != form.confirm_password {
            return Err(AppError::Validation("Passwords do not match.".into()));
        }
        if form.username.is_empty() || form.password.is_empty() {
            return Err(AppError::Validation("Username and password required.".into()));
        }

        Ok(self.append_user(&mut users, &form.username, &form.password)?)
    }

    pub fn authenticate(&self, username: &str, password: &str) -> StoreResult<AuthOutcome> {
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let mut users = self.read_all()?;
        let Some(idx) = users.iter().position(|u| u.username == username) else {
            tracing::info!("Login failed, unknown user {}", username);
            return Ok(AuthOutcome::UserNotFound);
        };

        let user = &users[idx];
        if user.has_legacy_password() {
            if user.password_hash != password {
                tracing::info!("Login failed, wrong password for {}", username);
                return Ok(AuthOutcome::WrongPassword);
            }
            // Upgrade the plaintext row now that we know the password.
            tracing::warn!("Re-hashing plaintext password for {}", username);
            users[idx].password_hash = hash(password, self.bcrypt_cost)?;
            self.write_all(&users)?;
        } else if !verify(password, &user.password_hash)? {
            tracing::info!("Login failed, wrong password for {}", username);
            return Ok(AuthOutcome::WrongPassword);
        }

        tracing::info!("User {} authenticated", username);
        Ok(AuthOutcome::Success(username.to_string()))
    }

    // Caller holds the lock.
    fn append_user(&self, users: &mut Vec<User>, username: &str, password: &str) -> StoreResult<User> {
        let user = User {
            username: username.to_string(),
            password_hash: hash(password, self.bcrypt_cost)?,
        };
        users.push(user.clone());
        self.write_all(users)?;

        tracing::info!("Saved user {}", username);
        Ok(user)
    }

    fn read_all(&self) -> StoreResult<Vec<User>> {
        Ok(flat_file::read_records::<UserRecord>(&self.path, &USER_HEADER)?
            .unwrap_or_default()
            .into_iter()
            .map(User::from)
            .collect())
    }

    fn write_all(&self, users: &[User]) -> StoreResult<()> {
        let records: Vec<UserRecord> = users.iter().map(UserRecord::from).collect();
        flat_file::write_records(&self.path, &USER_HEADER, &records)
    }
}

//! Credential store backed by the users document.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use crate::{
    error::AppError,
    models::User,
    services::{
        auth_service::{self, HashScheme},
        json_store,
    },
};

#[derive(Debug)]
pub struct UserStore {
    path: PathBuf,
    initial_balance: f64,
    users: BTreeMap<String, User>,
}

fn seed_users(initial_balance: f64) -> Result<BTreeMap<String, User>, AppError> {
    let mut users = BTreeMap::new();
    for (name, password, is_admin) in [("admin", "admin123", true), ("user1", "test123", false)] {
        users.insert(
            name.to_string(),
            User {
                username: name.to_string(),
                password_hash: auth_service::hash_password(HashScheme::Sha256, password)?,
                is_admin,
                initial_balance,
                balance: initial_balance,
            },
        );
    }
    Ok(users)
}

fn validate(path: &Path, users: &BTreeMap<String, User>) -> Result<(), AppError> {
    for (name, u) in users {
        let reason = if name.trim().is_empty() {
            Some("empty username".to_string())
        } else if u.password_hash.is_empty() {
            Some(format!("user {name:?} has no password hash"))
        } else if !u.balance.is_finite() || u.balance < 0.0 {
            Some(format!("user {name:?} has invalid balance {}", u.balance))
        } else if !u.initial_balance.is_finite() || u.initial_balance < 0.0 {
            Some(format!("user {name:?} has invalid initial_balance {}", u.initial_balance))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(AppError::StoreCorrupt {
                path: path.to_path_buf(),
                reason,
            });
        }
    }
    Ok(())
}

impl UserStore {
    /// Loads the users document. When it does not exist yet the store starts
    /// empty, or with the `admin`/`user1` demo accounts when `seed` is set.
    /// Seeded accounts are only written once something changes.
    pub fn load(path: &Path, initial_balance: f64, seed: bool) -> Result<Self, AppError> {
        let users = match json_store::load::<BTreeMap<String, User>>(path)? {
            Some(mut users) => {
                for (name, u) in users.iter_mut() {
                    u.username = name.clone();
                }
                validate(path, &users)?;
                tracing::info!(count = users.len(), path = %path.display(), "loaded users");
                users
            }
            None if seed => {
                tracing::info!(path = %path.display(), "no users file, seeding demo accounts");
                seed_users(initial_balance)?
            }
            None => BTreeMap::new(),
        };

        Ok(UserStore {
            path: path.to_path_buf(),
            initial_balance,
            users,
        })
    }

    pub fn get(&self, username: &str) -> Option<&User> {
        self.users.get(username)
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn balance(&self, username: &str) -> Result<f64, AppError> {
        self.get(username)
            .map(|u| u.balance)
            .ok_or_else(|| AppError::UnknownUser(username.to_string()))
    }

    /// Adds a user with the starting balance and saves the document.
    /// On a failed write the user is not kept.
    pub fn register(&mut self, username: &str, password_hash: String) -> Result<&User, AppError> {
        if self.users.contains_key(username) {
            return Err(AppError::DuplicateUser(username.to_string()));
        }

        self.users.insert(
            username.to_string(),
            User {
                username: username.to_string(),
                password_hash,
                is_admin: false,
                initial_balance: self.initial_balance,
                balance: self.initial_balance,
            },
        );

        if let Err(e) = self.save() {
            self.users.remove(username);
            return Err(e);
        }

        self.get(username)
            .ok_or_else(|| AppError::UnknownUser(username.to_string()))
    }

    /// Unknown users and wrong passwords fail the same way.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<&User, AppError> {
        match self.users.get(username) {
            Some(u) if auth_service::verify_password(password, &u.password_hash) => Ok(u),
            _ => Err(AppError::InvalidCredentials),
        }
    }

    pub(crate) fn set_balance(&mut self, username: &str, balance: f64) -> Result<(), AppError> {
        let user = self
            .users
            .get_mut(username)
            .ok_or_else(|| AppError::UnknownUser(username.to_string()))?;
        user.balance = balance;
        Ok(())
    }

    pub fn save(&self) -> Result<(), AppError> {
        json_store::save(&self.path, &self.users)
    }
}

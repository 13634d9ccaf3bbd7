use std::sync::Mutex;

use async_trait::async_trait;
use time::OffsetDateTime;

use super::store::{NewUser, ProfilePatch, StoreError, User, UserStore};

/// In-memory store backing unit and integration tests. Enforces the same
/// email/username uniqueness the Postgres schema does.
#[derive(Default)]
pub struct MemoryUserStore {
    inner: Mutex<Vec<User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<User>> {
        self.inner.lock().expect("user store mutex poisoned")
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, new: NewUser<'_>) -> Result<User, StoreError> {
        let mut users = self.lock();
        if users
            .iter()
            .any(|u| u.email == new.email || u.username == new.username)
        {
            return Err(StoreError::Duplicate);
        }
        let user = User {
            id: users.len() as i64 + 1,
            username: new.username.to_string(),
            email: new.email.to_string(),
            password_hash: new.password_hash.to_string(),
            age: None,
            weight: None,
            dietary_goals: None,
            allergies: None,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        Ok(self.lock().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> anyhow::Result<Option<User>> {
        Ok(self.lock().iter().find(|u| u.id == id).cloned())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> anyhow::Result<()> {
        if let Some(user) = self.lock().iter_mut().find(|u| u.id == id) {
            user.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn update_profile(&self, id: i64, patch: &ProfilePatch) -> anyhow::Result<bool> {
        let mut users = self.lock();
        let Some(user) = users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        if let Some(age) = patch.age {
            user.age = Some(age);
        }
        if let Some(weight) = patch.weight {
            user.weight = Some(weight);
        }
        if let Some(goals) = &patch.dietary_goals {
            user.dietary_goals = Some(goals.clone());
        }
        if let Some(allergies) = &patch.allergies {
            user.allergies = Some(allergies.clone());
        }
        Ok(true)
    }
}

//! One use case per user intent.
//!
//! These are named seams between the view-model and the repository;
//! each forwards straight to the repository with the same contract.

use std::sync::Arc;

use super::repository::{ResourceStream, UserRepository};
use crate::state::data::User;
use crate::state::library::StoreResult;

#[derive(Clone)]
pub struct GetUsers {
    repository: Arc<dyn UserRepository>,
}

impl GetUsers {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub fn invoke(&self) -> ResourceStream<Vec<User>> {
        self.repository.get_users()
    }
}

#[derive(Clone)]
pub struct AddUser {
    repository: Arc<dyn UserRepository>,
}

impl AddUser {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn invoke(&self, user: User) -> StoreResult<()> {
        self.repository.add_user(user).await
    }
}

#[derive(Clone)]
pub struct DeleteUser {
    repository: Arc<dyn UserRepository>,
}

impl DeleteUser {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn invoke(&self, user: &User) -> StoreResult<()> {
        self.repository.delete_user(user).await
    }
}

#[derive(Clone)]
pub struct ClearUsers {
    repository: Arc<dyn UserRepository>,
}

impl ClearUsers {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub async fn invoke(&self) -> StoreResult<()> {
        self.repository.clear_users().await
    }
}

#[derive(Clone)]
pub struct SearchUsers {
    repository: Arc<dyn UserRepository>,
}

impl SearchUsers {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self { repository }
    }

    pub fn invoke(&self, query: &str) -> ResourceStream<Vec<User>> {
        self.repository.search_users(query)
    }
}

/// All use cases, wired to one repository
#[derive(Clone)]
pub struct UseCases {
    pub get_users: GetUsers,
    pub add_user: AddUser,
    pub delete_user: DeleteUser,
    pub clear_users: ClearUsers,
    pub search_users: SearchUsers,
}

impl UseCases {
    pub fn new(repository: Arc<dyn UserRepository>) -> Self {
        Self {
            get_users: GetUsers::new(Arc::clone(&repository)),
            add_user: AddUser::new(Arc::clone(&repository)),
            delete_user: DeleteUser::new(Arc::clone(&repository)),
            clear_users: ClearUsers::new(Arc::clone(&repository)),
            search_users: SearchUsers::new(repository),
        }
    }
}

impl std::fmt::Debug for UseCases {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UseCases").finish_non_exhaustive()
    }
}

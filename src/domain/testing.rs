//! Test double for the repository seam.

use async_stream::stream;
use async_trait::async_trait;
use futures::StreamExt;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use super::repository::{LocalUserRepository, ResourceStream, UserRepository};
use crate::state::data::{Resource, User};
use crate::state::library::{StoreError, StoreResult, UserStore};

/// Wraps a real in-memory repository and adds fault injection,
/// call recording and gated search results.
pub struct FakeRepository {
    store: Arc<UserStore>,
    inner: LocalUserRepository,
    search_calls: Mutex<Vec<String>>,
    write_fault: Mutex<Option<String>>,
    read_fault: Mutex<Option<String>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
}

impl FakeRepository {
    pub fn new() -> Self {
        let store = Arc::new(UserStore::in_memory().expect("in-memory store"));
        Self {
            inner: LocalUserRepository::new(Arc::clone(&store)),
            store,
            search_calls: Mutex::new(Vec::new()),
            write_fault: Mutex::new(None),
            read_fault: Mutex::new(None),
            gates: Mutex::new(HashMap::new()),
        }
    }

    pub fn seed(&self, name: &str, email: &str) -> User {
        let id = self
            .store
            .upsert(&User::new(name, email, None))
            .expect("seed user");
        User {
            id,
            ..User::new(name, email, None)
        }
    }

    pub fn stored_users(&self) -> Vec<User> {
        self.store.all_users().expect("read users")
    }

    /// Live queries currently subscribed to the store
    pub fn live_queries(&self) -> usize {
        self.store.subscriber_count()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.lock().unwrap().clone()
    }

    /// Every following write fails with `message`
    pub fn fail_writes(&self, message: &str) {
        *self.write_fault.lock().unwrap() = Some(message.to_string());
    }

    pub fn heal_writes(&self) {
        *self.write_fault.lock().unwrap() = None;
    }

    /// Every following live query emits `Loading` then `Error(message)`
    pub fn fail_reads(&self, message: &str) {
        *self.read_fault.lock().unwrap() = Some(message.to_string());
    }

    /// Searches for `query` emit `Loading`, then wait for the returned
    /// notify before emitting rows.
    pub fn hold_search(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(query.to_string(), Arc::clone(&gate));
        gate
    }

    fn check_write(&self) -> StoreResult<()> {
        match self.write_fault.lock().unwrap().clone() {
            Some(message) => Err(StoreError::Task(message)),
            None => Ok(()),
        }
    }

    fn failing_read(&self) -> Option<ResourceStream<Vec<User>>> {
        let message = self.read_fault.lock().unwrap().clone()?;
        Some(Box::pin(stream! {
            yield Resource::Loading;
            yield Resource::Error(message);
        }))
    }
}

#[async_trait]
impl UserRepository for FakeRepository {
    fn get_users(&self) -> ResourceStream<Vec<User>> {
        self.failing_read().unwrap_or_else(|| self.inner.get_users())
    }

    async fn add_user(&self, user: User) -> StoreResult<()> {
        self.check_write()?;
        self.inner.add_user(user).await
    }

    async fn delete_user(&self, user: &User) -> StoreResult<()> {
        self.check_write()?;
        self.inner.delete_user(user).await
    }

    async fn clear_users(&self) -> StoreResult<()> {
        self.check_write()?;
        self.inner.clear_users().await
    }

    fn search_users(&self, query: &str) -> ResourceStream<Vec<User>> {
        self.search_calls.lock().unwrap().push(query.to_string());

        if let Some(failing) = self.failing_read() {
            return failing;
        }

        let mut rows = self.inner.search_users(query);
        match self.gates.lock().unwrap().get(query).cloned() {
            Some(gate) => Box::pin(stream! {
                yield Resource::Loading;
                gate.notified().await;
                while let Some(resource) = rows.next().await {
                    if resource != Resource::Loading {
                        yield resource;
                    }
                }
            }),
            None => rows,
        }
    }
}

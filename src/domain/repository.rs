use async_stream::stream;
use async_trait::async_trait;
use futures::stream::BoxStream;
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::state::data::{Resource, User};
use crate::state::library::{StoreError, StoreResult, UserStore};

/// A live query: `Loading`, then one `Success` per store revision
pub type ResourceStream<T> = BoxStream<'static, Resource<T>>;

/// Shown when a fault carries no text of its own
pub const UNKNOWN_ERROR: &str = "Unknown error occurred";

/// User-facing text for a fault
pub fn fault_message(err: &impl Display) -> String {
    let message = err.to_string();
    if message.trim().is_empty() {
        UNKNOWN_ERROR.to_string()
    } else {
        message
    }
}

/// Access to the stored users.
///
/// Reads never fail across this boundary: a broken subscription is
/// reported as a final `Resource::Error`. Writes return the store fault
/// untouched.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Live view of every user
    fn get_users(&self) -> ResourceStream<Vec<User>>;

    /// Insert, or replace the user with the same id
    async fn add_user(&self, user: User) -> StoreResult<()>;

    async fn delete_user(&self, user: &User) -> StoreResult<()>;

    async fn clear_users(&self) -> StoreResult<()>;

    /// Live view of users whose name or email contains `query`
    fn search_users(&self, query: &str) -> ResourceStream<Vec<User>>;
}

/// Repository backed by the local SQLite store
#[derive(Debug, Clone)]
pub struct LocalUserRepository {
    store: Arc<UserStore>,
}

impl LocalUserRepository {
    pub fn new(store: Arc<UserStore>) -> Self {
        Self { store }
    }

    /// Re-run `query` every time the store publishes a new revision
    fn live_query<F>(&self, label: &'static str, query: F) -> ResourceStream<Vec<User>>
    where
        F: Fn(&UserStore) -> StoreResult<Vec<User>> + Send + Sync + 'static,
    {
        let store = Arc::clone(&self.store);
        let query = Arc::new(query);

        Box::pin(stream! {
            yield Resource::Loading;

            let mut revisions = store.subscribe();
            loop {
                let revision = *revisions.borrow_and_update();
                let query = Arc::clone(&query);

                match run_blocking(Arc::clone(&store), move |store: &UserStore| query(store)).await {
                    Ok(users) => {
                        debug!("{} query: {} rows at revision {}", label, users.len(), revision);
                        yield Resource::Success(users);
                    }
                    Err(err) => {
                        warn!("{} query failed: {}", label, err);
                        yield Resource::Error(fault_message(&err));
                        break;
                    }
                }

                if revisions.changed().await.is_err() {
                    break;
                }
            }
        })
    }
}

/// SQLite calls block, so they run on tokio's blocking pool
async fn run_blocking<T, F>(store: Arc<UserStore>, op: F) -> StoreResult<T>
where
    F: FnOnce(&UserStore) -> StoreResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(move || op(&store))
        .await
        .map_err(|err| StoreError::Task(err.to_string()))?
}

#[async_trait]
impl UserRepository for LocalUserRepository {
    fn get_users(&self) -> ResourceStream<Vec<User>> {
        self.live_query("users", |store| store.all_users())
    }

    async fn add_user(&self, user: User) -> StoreResult<()> {
        run_blocking(Arc::clone(&self.store), move |store: &UserStore| {
            store.upsert(&user).map(|_| ())
        })
        .await
    }

    async fn delete_user(&self, user: &User) -> StoreResult<()> {
        let user = user.clone();
        run_blocking(Arc::clone(&self.store), move |store: &UserStore| store.delete(&user)).await
    }

    async fn clear_users(&self) -> StoreResult<()> {
        run_blocking(Arc::clone(&self.store), |store: &UserStore| store.clear()).await
    }

    fn search_users(&self, query: &str) -> ResourceStream<Vec<User>> {
        let query = query.to_string();
        self.live_query("search", move |store| store.search_users(&query))
    }
}

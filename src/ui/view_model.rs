use futures::future::BoxFuture;
use futures::StreamExt;
use std::fmt::Display;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::validation::{field_failure_message, is_non_blank, is_present};
use crate::domain::repository::fault_message;
use crate::domain::use_cases::UseCases;
use crate::state::data::{Resource, SnackbarEffect, User, UserIntent, ViewState};

/// Receiving end of the one-shot effect queue, drained by the UI
pub type EffectReceiver = mpsc::UnboundedReceiver<SnackbarEffect>;

type WriteJob = BoxFuture<'static, ()>;

/// Where background tasks publish their results
#[derive(Clone)]
struct Outputs {
    state: Arc<watch::Sender<ViewState>>,
    effects: mpsc::UnboundedSender<SnackbarEffect>,
}

impl Outputs {
    /// Apply one transition atomically
    fn update(&self, transition: impl FnOnce(&mut ViewState)) {
        self.state.send_modify(transition);
    }

    /// Apply a transition only while `mine` is still the newest search.
    /// Returns whether it was applied.
    fn update_if_current(
        &self,
        generation: &AtomicU64,
        mine: u64,
        transition: impl FnOnce(&mut ViewState),
    ) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|state| {
            if generation.load(Ordering::SeqCst) != mine {
                return false;
            }
            transition(state);
            applied = true;
            true
        });
        applied
    }

    fn notify(&self, effect: SnackbarEffect) {
        if self.effects.send(effect).is_err() {
            debug!("effect dropped, nobody is listening");
        }
    }

    fn notify_fault(&self, context: &str, err: &impl Display) {
        let message = format!("{}: {}", context, fault_message(err));
        warn!("{}", message);
        self.notify(SnackbarEffect::message(message));
    }
}

/// Folds user intents and repository results into a single `ViewState`.
///
/// Reads (load, search) run as independent tasks. Writes (add, delete,
/// clear, undo) go through one FIFO lane, so their effects arrive in the
/// order the intents were dispatched.
pub struct UserListViewModel {
    use_cases: UseCases,
    outputs: Outputs,
    runtime: Handle,
    /// Last user removed, kept for undo (never cleared by undo itself)
    recently_deleted_user: Mutex<Option<User>>,
    search_job: Mutex<Option<JoinHandle<()>>>,
    /// Bumped by every search intent; stale search tasks compare against it
    search_generation: Arc<AtomicU64>,
    /// Live subscription of the newest load; a new load replaces it
    load_job: Mutex<Option<JoinHandle<()>>>,
    write_lane: mpsc::UnboundedSender<WriteJob>,
    write_worker: JoinHandle<()>,
}

impl UserListViewModel {
    /// Build the view-model on `runtime`. The returned receiver is the
    /// only consumer of the effect queue.
    pub fn new(use_cases: UseCases, runtime: Handle, initial: ViewState) -> (Self, EffectReceiver) {
        let (state, _) = watch::channel(initial);
        let (effects, effect_rx) = mpsc::unbounded_channel();
        let (write_lane, mut write_rx) = mpsc::unbounded_channel::<WriteJob>();

        let write_worker = runtime.spawn(async move {
            while let Some(job) = write_rx.recv().await {
                job.await;
            }
        });

        info!("🎛️  User list view-model ready");

        let view_model = UserListViewModel {
            use_cases,
            outputs: Outputs {
                state: Arc::new(state),
                effects,
            },
            runtime,
            recently_deleted_user: Mutex::new(None),
            search_job: Mutex::new(None),
            search_generation: Arc::new(AtomicU64::new(0)),
            load_job: Mutex::new(None),
            write_lane,
            write_worker,
        };
        (view_model, effect_rx)
    }

    /// Observe the view state
    pub fn state(&self) -> watch::Receiver<ViewState> {
        self.outputs.state.subscribe()
    }

    /// Copy of the current view state
    pub fn current_state(&self) -> ViewState {
        self.outputs.state.borrow().clone()
    }

    /// Handle one intent from the UI
    pub fn dispatch(&self, intent: UserIntent) {
        debug!("intent: {:?}", intent);

        match intent {
            UserIntent::LoadUsers => self.load_users(),
            UserIntent::AddUser {
                name,
                email,
                image_path,
            } => self.add_user(name, email, image_path),
            UserIntent::DeleteUser(user) => self.delete_user(user),
            UserIntent::ClearUsers => self.clear_users(),
            UserIntent::SearchUser(query) => self.search_users(query),
            UserIntent::UpdateName(name) => self.outputs.update(|state| {
                state.name_error = !is_non_blank(&name);
                state.name = name;
            }),
            UserIntent::UpdateEmail(email) => self.outputs.update(|state| {
                state.email_error = !is_non_blank(&email);
                state.email = email;
            }),
            UserIntent::UndoDelete => self.undo_delete(),
            UserIntent::SelectImage(path) => self.outputs.update(|state| state.selected_image_uri = path),
            UserIntent::ToggleTheme => self.outputs.update(|state| state.is_dark_theme = !state.is_dark_theme),
        }
    }

    fn load_users(&self) {
        let mut rows = self.use_cases.get_users.invoke();
        let outputs = self.outputs.clone();

        let job = self.runtime.spawn(async move {
            while let Some(resource) = rows.next().await {
                match resource {
                    Resource::Loading => outputs.update(|state| state.is_loading = true),
                    Resource::Success(users) => outputs.update(|state| {
                        // The active search filter is not reapplied here
                        state.is_loading = false;
                        state.filtered_user_list = users.clone();
                        state.users = users;
                    }),
                    Resource::Error(message) => {
                        outputs.update(|state| state.is_loading = false);
                        outputs.notify_fault("Error loading users", &message);
                    }
                }
            }
        });

        let previous = self
            .load_job
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(job);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    fn search_users(&self, query: String) {
        let generation = Arc::clone(&self.search_generation);
        let mut mine = 0;
        self.outputs.update(|state| {
            mine = generation.fetch_add(1, Ordering::SeqCst) + 1;
            state.search_query = query.clone();
            if query.is_empty() {
                state.filtered_user_list = state.users.clone();
                state.is_loading = false;
            }
        });

        let mut search_job = self.search_job.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = search_job.take() {
            previous.abort();
        }
        if query.is_empty() {
            return;
        }

        let mut results = self.use_cases.search_users.invoke(&query);
        let outputs = self.outputs.clone();

        *search_job = Some(self.runtime.spawn(async move {
            while let Some(resource) = results.next().await {
                let applied = match resource {
                    Resource::Loading => {
                        outputs.update_if_current(&generation, mine, |state| state.is_loading = true)
                    }
                    Resource::Success(users) => outputs.update_if_current(&generation, mine, |state| {
                        state.is_loading = false;
                        state.filtered_user_list = users;
                    }),
                    Resource::Error(message) => {
                        let applied = outputs.update_if_current(&generation, mine, |state| state.is_loading = false);
                        if applied {
                            outputs.notify_fault("Error searching users", &message);
                        }
                        applied
                    }
                };

                if !applied {
                    debug!("search for {:?} superseded", query);
                    break;
                }
            }
        }));
    }

    fn add_user(&self, name: String, email: String, image_path: Option<String>) {
        let name_error = !is_non_blank(&name);
        let email_error = !is_non_blank(&email);
        let image_error = !is_present(image_path.as_deref());

        if let Some(message) = field_failure_message(name_error, email_error, image_error) {
            self.outputs.update(|state| {
                state.name_error = name_error;
                state.email_error = email_error;
            });
            self.outputs.notify(SnackbarEffect::message(message));
            return;
        }

        self.outputs.update(|state| state.is_loading = true);

        let add_user = self.use_cases.add_user.clone();
        let outputs = self.outputs.clone();
        let user = User::new(name, email, image_path);

        self.submit_write(async move {
            match add_user.invoke(user).await {
                Ok(()) => {
                    outputs.update(|state| {
                        state.is_loading = false;
                        state.name.clear();
                        state.email.clear();
                        state.name_error = false;
                        state.email_error = false;
                        state.selected_image_uri = None;
                    });
                    outputs.notify(SnackbarEffect::message("User added successfully!"));
                }
                Err(err) => {
                    outputs.update(|state| state.is_loading = false);
                    outputs.notify_fault("Error adding user", &err);
                }
            }
        });
    }

    fn delete_user(&self, user: User) {
        *self
            .recently_deleted_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        self.outputs.update(|state| {
            state.is_loading = true;
            state.recently_deleted_user = Some(user.clone());
        });

        let delete_user = self.use_cases.delete_user.clone();
        let outputs = self.outputs.clone();

        self.submit_write(async move {
            match delete_user.invoke(&user).await {
                Ok(()) => {
                    outputs.update(|state| state.is_loading = false);
                    outputs.notify(SnackbarEffect::with_action("User deleted", "Undo"));
                }
                Err(err) => {
                    outputs.update(|state| state.is_loading = false);
                    outputs.notify_fault("Error deleting user", &err);
                }
            }
        });
    }

    fn clear_users(&self) {
        self.outputs.update(|state| state.is_loading = true);

        let clear_users = self.use_cases.clear_users.clone();
        let outputs = self.outputs.clone();

        self.submit_write(async move {
            match clear_users.invoke().await {
                Ok(()) => {
                    outputs.update(|state| state.is_loading = false);
                    outputs.notify(SnackbarEffect::message("All users cleared!"));
                }
                Err(err) => {
                    outputs.update(|state| state.is_loading = false);
                    outputs.notify_fault("Error clearing users", &err);
                }
            }
        });
    }

    fn undo_delete(&self) {
        let remembered = self
            .recently_deleted_user
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(user) = remembered else {
            debug!("nothing to undo");
            return;
        };

        let add_user = self.use_cases.add_user.clone();
        let outputs = self.outputs.clone();

        self.submit_write(async move {
            match add_user.invoke(user).await {
                Ok(()) => outputs.notify(SnackbarEffect::message("User restored successfully!")),
                Err(err) => outputs.notify_fault("Error restoring user", &err),
            }
        });
    }

    /// Queue a write behind every write dispatched before it.
    ///
    /// The lane is shared, so a store call that never returns stalls all
    /// later adds, deletes, clears and undos, not only its own intent.
    fn submit_write(&self, job: impl Future<Output = ()> + Send + 'static) {
        if self.write_lane.send(Box::pin(job)).is_err() {
            warn!("write lane is closed, dropping job");
        }
    }
}

impl Drop for UserListViewModel {
    fn drop(&mut self) {
        if let Some(job) = self
            .load_job
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            job.abort();
        }
        if let Some(job) = self
            .search_job
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            job.abort();
        }
        self.write_worker.abort();
    }
}

impl std::fmt::Debug for UserListViewModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UserListViewModel")
            .field("state", &*self.outputs.state.borrow())
            .field("search_generation", &self.search_generation.load(Ordering::SeqCst))
            .finish_non_exhaustive()
    }
}

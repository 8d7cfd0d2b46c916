use iced::widget::{column, container, horizontal_rule};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio_stream::wrappers::{UnboundedReceiverStream, WatchStream};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod domain;
mod state;
mod ui;

use config::{Config, ConfigError};
use domain::repository::LocalUserRepository;
use domain::use_cases::UseCases;
use state::data::{SnackbarEffect, User, UserIntent, ViewState};
use state::library::{StoreError, UserStore};
use ui::view_model::UserListViewModel;

/// Anything that can stop the application from starting
#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("failed to start the async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error(transparent)]
    Ui(#[from] iced::Error),
}

/// Main application state
struct UserRoster {
    /// Owns the observable state and runs the store calls
    view_model: UserListViewModel,
    /// Latest snapshot received from the view-model
    view_state: ViewState,
    /// Notification currently shown to the user
    snackbar: Option<SnackbarEffect>,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// The view-model published a new state snapshot
    StateChanged(ViewState),
    /// The view-model asked for a notification
    Effect(SnackbarEffect),
    NameChanged(String),
    EmailChanged(String),
    SearchChanged(String),
    /// User clicked the "Pick Image" button
    PickImage,
    AddUser,
    DeleteUser(User),
    ClearUsers,
    UndoDelete,
    DismissSnackbar,
    ToggleTheme,
}

impl UserRoster {
    /// Create a new instance of the application
    fn new(store: Arc<UserStore>, runtime: Handle, config: Config) -> (Self, Task<Message>) {
        let repository = Arc::new(LocalUserRepository::new(store));
        let initial = ViewState {
            is_dark_theme: config.dark_theme,
            ..ViewState::default()
        };
        let (view_model, effects) = UserListViewModel::new(UseCases::new(repository), runtime, initial);

        // Forward state snapshots and effects into the iced event loop
        let states = WatchStream::new(view_model.state());
        let effects = UnboundedReceiverStream::new(effects);

        view_model.dispatch(UserIntent::LoadUsers);
        let view_state = view_model.current_state();

        (
            UserRoster {
                view_model,
                view_state,
                snackbar: None,
            },
            Task::batch([
                Task::run(states, Message::StateChanged),
                Task::run(effects, Message::Effect),
            ]),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::StateChanged(state) => {
                self.view_state = state;
                return Task::none();
            }
            Message::Effect(effect) => {
                self.snackbar = Some(effect);
                return Task::none();
            }
            Message::NameChanged(name) => self.view_model.dispatch(UserIntent::UpdateName(name)),
            Message::EmailChanged(email) => self.view_model.dispatch(UserIntent::UpdateEmail(email)),
            Message::SearchChanged(query) => self.view_model.dispatch(UserIntent::SearchUser(query)),
            Message::PickImage => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select a Picture")
                    .add_filter("Images", &["png", "jpg", "jpeg", "gif", "bmp", "webp"])
                    .pick_file();

                if let Some(path) = picked {
                    let path = path.to_string_lossy().into_owned();
                    self.view_model.dispatch(UserIntent::SelectImage(Some(path)));
                }
            }
            Message::AddUser => {
                let form = self.view_model.current_state();
                self.view_model.dispatch(UserIntent::AddUser {
                    name: form.name,
                    email: form.email,
                    image_path: form.selected_image_uri,
                });
            }
            Message::DeleteUser(user) => self.view_model.dispatch(UserIntent::DeleteUser(user)),
            Message::ClearUsers => self.view_model.dispatch(UserIntent::ClearUsers),
            Message::UndoDelete => {
                self.snackbar = None;
                self.view_model.dispatch(UserIntent::UndoDelete);
            }
            Message::DismissSnackbar => {
                self.snackbar = None;
            }
            Message::ToggleTheme => self.view_model.dispatch(UserIntent::ToggleTheme),
        }

        // The forwarded snapshot arrives a pass later, and text inputs build
        // their next value from what was last rendered
        self.view_state = self.view_model.current_state();

        Task::none()
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let state = &self.view_state;

        let content = column![
            ui::user_list::header(state),
            ui::user_list::form(state),
            horizontal_rule(1),
            ui::user_list::toolbar(state),
            ui::user_list::user_list(state),
        ]
        .push_maybe(self.snackbar.as_ref().map(ui::user_list::snackbar))
        .spacing(16)
        .padding(24)
        .max_width(720);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        if self.view_state.is_dark_theme {
            Theme::Dark
        } else {
            Theme::Light
        }
    }
}

fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::load()?;

    // Background store work runs here; it must outlive the UI loop
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .thread_name("user-roster-worker")
        .build()?;

    let store = Arc::new(UserStore::open(&config.db_path)?);
    info!("🎨 User Roster initialized with {} users", store.user_count()?);

    let handle = runtime.handle().clone();
    iced::application("User Roster", UserRoster::update, UserRoster::view)
        .theme(UserRoster::theme)
        .centered()
        .run_with(move || UserRoster::new(store, handle, config))?;

    Ok(())
}

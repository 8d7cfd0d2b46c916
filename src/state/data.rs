/// Shared data structures for the application state
///
/// These types flow between the database layer, the view-model
/// and the UI layer.

/// Represents a single user in the roster
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct User {
    /// Unique database ID (0 = not yet assigned, SQLite picks one on insert)
    pub id: i64,
    /// Display name
    pub name: String,
    /// Email address
    pub email: String,
    /// Local path to the user's picture (None if no image was picked)
    pub image_url: Option<String>,
}

impl User {
    /// Create a user that has not been stored yet
    pub fn new(name: impl Into<String>, email: impl Into<String>, image_url: Option<String>) -> Self {
        Self {
            id: 0,
            name: name.into(),
            email: email.into(),
            image_url,
        }
    }
}

/// Three-state envelope produced by every live read.
///
/// Consumers must match all three arms; there is no catch-all.
#[derive(Debug, Clone, PartialEq)]
pub enum Resource<T> {
    /// The query has started but no rows have arrived yet
    Loading,
    /// The latest snapshot of the query
    Success(T),
    /// The subscription failed and will not emit again
    Error(String),
}

/// Snapshot rendered by the UI. Owned by the view-model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewState {
    pub is_loading: bool,
    /// Every user in the store, as of the last live query emission
    pub users: Vec<User>,
    /// Users currently displayed (the search result, or `users`)
    pub filtered_user_list: Vec<User>,
    /// Name input text
    pub name: String,
    /// Email input text
    pub email: String,
    pub name_error: bool,
    pub email_error: bool,
    pub search_query: String,
    pub is_dark_theme: bool,
    /// Last user removed through a delete intent (for undo)
    pub recently_deleted_user: Option<User>,
    /// Image picked for the user being added
    pub selected_image_uri: Option<String>,
}

/// One-shot instruction for the UI, delivered at most once
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnackbarEffect {
    /// Show a dismissible notification, optionally with an action button
    ShowSnackbar {
        message: String,
        action_label: Option<String>,
    },
}

impl SnackbarEffect {
    /// A notification without an action
    pub fn message(message: impl Into<String>) -> Self {
        SnackbarEffect::ShowSnackbar {
            message: message.into(),
            action_label: None,
        }
    }

    /// A notification with an action button
    pub fn with_action(message: impl Into<String>, action_label: impl Into<String>) -> Self {
        SnackbarEffect::ShowSnackbar {
            message: message.into(),
            action_label: Some(action_label.into()),
        }
    }
}

/// Everything the UI can ask the view-model to do
#[derive(Debug, Clone, PartialEq)]
pub enum UserIntent {
    LoadUsers,
    AddUser {
        name: String,
        email: String,
        image_path: Option<String>,
    },
    DeleteUser(User),
    ClearUsers,
    SearchUser(String),
    UpdateName(String),
    UpdateEmail(String),
    UndoDelete,
    /// Remember the image picked for the next add
    SelectImage(Option<String>),
    ToggleTheme,
}

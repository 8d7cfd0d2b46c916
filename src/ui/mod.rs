/// User interface module
///
/// - The view-model that owns the observable view state (view_model.rs)
/// - Form validation rules and messages (validation.rs)
/// - iced widgets that render the view state (user_list.rs)

pub mod view_model;
pub mod validation;
pub mod user_list;

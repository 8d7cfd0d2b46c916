use iced::widget::{
    button, column, container, horizontal_space, image, row, scrollable, text, text_input, Column, Space,
};
use iced::{Alignment, Element, Length};

use crate::state::data::{SnackbarEffect, User, ViewState};
use crate::Message;

/// Size of the avatar thumbnail in the list (square)
const AVATAR_SIZE: f32 = 48.0;

/// Header with the title and the theme switch
pub fn header(state: &ViewState) -> Element<'_, Message> {
    let theme_label = if state.is_dark_theme { "Light mode" } else { "Dark mode" };

    row![
        text("User Roster").size(32),
        horizontal_space(),
        button(theme_label).on_press(Message::ToggleTheme).padding(8),
    ]
    .align_y(Alignment::Center)
    .into()
}

/// Name/email inputs, image picker and the add button
pub fn form(state: &ViewState) -> Element<'_, Message> {
    let image_label = match &state.selected_image_uri {
        Some(path) => text(path).size(12),
        None => text("No image selected").size(12),
    };

    // Adding is disabled while a store call is in flight
    let add = button("Add User")
        .on_press_maybe((!state.is_loading).then_some(Message::AddUser))
        .padding(10);

    column![
        text_input("Name", &state.name)
            .on_input(Message::NameChanged)
            .padding(8),
    ]
    .push_maybe(state.name_error.then(|| text("Name is required").size(12).style(text::danger)))
    .push(
        text_input("Email", &state.email)
            .on_input(Message::EmailChanged)
            .padding(8),
    )
    .push_maybe(state.email_error.then(|| text("Email is required").size(12).style(text::danger)))
    .push(
        row![button("Pick Image").on_press(Message::PickImage).padding(8), image_label]
            .spacing(10)
            .align_y(Alignment::Center),
    )
    .push(add)
    .spacing(8)
    .into()
}

/// Search field, clear button and loading indicator
pub fn toolbar(state: &ViewState) -> Element<'_, Message> {
    let status = if state.is_loading {
        text("Loading...").size(14)
    } else {
        text(format!("{} of {} users", state.filtered_user_list.len(), state.users.len())).size(14)
    };

    row![
        text_input("Search by name or email", &state.search_query)
            .on_input(Message::SearchChanged)
            .padding(8)
            .width(Length::Fill),
        status,
        button("Clear All")
            .on_press(Message::ClearUsers)
            .style(button::danger)
            .padding(8),
    ]
    .spacing(10)
    .align_y(Alignment::Center)
    .into()
}

/// The displayed users, or a placeholder when there are none
pub fn user_list(state: &ViewState) -> Element<'_, Message> {
    if state.filtered_user_list.is_empty() {
        let placeholder = if state.search_query.is_empty() {
            "No users yet. Add one above."
        } else {
            "No users match your search."
        };
        return container(text(placeholder)).padding(20).into();
    }

    scrollable(Column::with_children(state.filtered_user_list.iter().map(user_row)).spacing(6))
        .height(Length::Fill)
        .into()
}

fn user_row(user: &User) -> Element<'_, Message> {
    let avatar: Element<'_, Message> = match &user.image_url {
        Some(path) => image(image::Handle::from_path(path))
            .width(Length::Fixed(AVATAR_SIZE))
            .height(Length::Fixed(AVATAR_SIZE))
            .into(),
        None => Space::new(Length::Fixed(AVATAR_SIZE), Length::Fixed(AVATAR_SIZE)).into(),
    };

    let details = column![text(&user.name).size(16), text(&user.email).size(12)].spacing(2);

    container(
        row![
            avatar,
            details,
            horizontal_space(),
            button("Delete")
                .on_press(Message::DeleteUser(user.clone()))
                .style(button::danger)
                .padding(6),
        ]
        .spacing(12)
        .align_y(Alignment::Center),
    )
    .padding(8)
    .style(container::rounded_box)
    .into()
}

/// One-shot notification with its optional action
pub fn snackbar(effect: &SnackbarEffect) -> Element<'_, Message> {
    let SnackbarEffect::ShowSnackbar {
        message,
        action_label,
    } = effect;

    let mut bar = row![text(message).width(Length::Fill)]
        .spacing(12)
        .align_y(Alignment::Center);

    // Undo is the only action the view-model offers
    if let Some(label) = action_label {
        bar = bar.push(button(text(label)).on_press(Message::UndoDelete).padding(6));
    }
    bar = bar.push(button("Dismiss").on_press(Message::DismissSnackbar).padding(6));

    container(bar).padding(12).style(container::rounded_box).into()
}

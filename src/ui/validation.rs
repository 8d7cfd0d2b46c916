//! Input validation for the add-user form

pub const ALL_FIELDS_REQUIRED: &str = "Name, email, and image are required.";
pub const NAME_AND_EMAIL_REQUIRED: &str = "Name and email are required.";
pub const NAME_REQUIRED: &str = "Name is required and must have at least 3 characters.";
pub const INVALID_EMAIL: &str = "Invalid email address.";
pub const IMAGE_REQUIRED: &str = "Please select or capture an image.";

/// A field is valid when it has at least one non-whitespace character
pub fn is_non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Same rule for optional input; a missing value is blank
pub fn is_present(value: Option<&str>) -> bool {
    value.is_some_and(is_non_blank)
}

/// Pick the single message describing which fields failed.
/// First matching case wins.
pub fn field_failure_message(name_error: bool, email_error: bool, image_error: bool) -> Option<&'static str> {
    match (name_error, email_error, image_error) {
        (true, true, true) => Some(ALL_FIELDS_REQUIRED),
        (true, true, false) => Some(NAME_AND_EMAIL_REQUIRED),
        (true, false, _) => Some(NAME_REQUIRED),
        (false, true, _) => Some(INVALID_EMAIL),
        (false, false, true) => Some(IMAGE_REQUIRED),
        (false, false, false) => None,
    }
}

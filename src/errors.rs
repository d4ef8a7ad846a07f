use thiserror::Error;

use crate::data_types::canteen_data_types::{Category, MenuItemId};

/// Rejections of user actions; the message is shown in the chat as-is
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CanteenError {
    #[error("Please log in first with /start")]
    NotLoggedIn,
    #[error("This command is only available to the canteen admin (/admin)")]
    AdminOnly,
    #[error("The 9:00 PM deadline has passed. Your selection for tomorrow is final.")]
    DeadlinePassed,
    #[error("Your selection is empty. Choose items from the /menu first.")]
    EmptySelection,
    #[error("There is no menu item with id {0}")]
    UnknownItem(MenuItemId),
    #[error("Your selection is already confirmed. Use /modify to change it.")]
    AlreadyConfirmed,
    #[error("You already opted out. Use /modify to order after all.")]
    AlreadyOptedOut,
    #[error("There is no confirmed selection to modify.")]
    NothingToModify,
    #[error("You have not confirmed a meal for tomorrow yet.")]
    NoCoupon,
    #[error("Only one {0} item can be selected")]
    CategoryCapExceeded(Category),
    #[error("Invalid menu item: {0}")]
    InvalidMenuItem(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LoginError {
    #[error("Both email and phone number are required.")]
    MissingFields,
    #[error("Please use your @gmail.com email to log in.")]
    InvalidEmail,
    #[error("Please enter a valid phone number.")]
    InvalidPhone,
}

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("Gemini API key is not configured")]
    Unconfigured,
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini returned no usable content")]
    EmptyResponse,
    #[error("No image data found in the response")]
    NoImageData,
    #[error("Gemini returned malformed data: {0}")]
    Malformed(String),
}

#[derive(Debug, Error)]
pub enum CouponError {
    #[error("Could not encode coupon: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("Could not fetch the QR code: {0}")]
    Fetch(#[from] reqwest::Error),
    #[error("Invalid QR service url: {0}")]
    Url(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MenuCommandError {
    #[error("Expected {expected} fields separated by '|', got {got}")]
    FieldCount { expected: usize, got: usize },
    #[error("{0}")]
    Category(String),
    #[error("Invalid price '{0}'")]
    Price(String),
    #[error("Invalid item id '{0}'")]
    Id(String),
}

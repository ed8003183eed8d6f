//! Google API Client Module
//!
//! Thin clients for the Workspace REST APIs used by the command handlers.
//! Every client wraps a shared, already-authenticated `GoogleClient`.

pub mod calendar_api;
pub mod client;
pub mod cloudsearch;
pub mod common;
pub mod directory;
pub mod drive;
pub mod drive_activity;
pub mod forms;
pub mod gmail;
pub mod keep;
pub mod sheets;

pub use calendar_api::CalendarApi;
pub use client::{GoogleClient, ListField};
pub use cloudsearch::CloudSearchApi;
pub use directory::DirectoryApi;
pub use drive::DriveApi;
pub use drive_activity::DriveActivityApi;
pub use forms::FormsApi;
pub use gmail::GmailApi;
pub use keep::KeepApi;
pub use sheets::SheetsApi;

/// Macro to implement the standard Google API wrapper constructor pattern.
/// Each API struct wraps a `GoogleClient` and provides `new(client)`.
macro_rules! google_api_wrapper {
    ($name:ident) => {
        impl $name {
            /// Create a new API client on top of an authenticated `GoogleClient`
            pub fn new(client: crate::google::client::GoogleClient) -> Self {
                Self { client }
            }
        }
    };
}

pub(crate) use google_api_wrapper;

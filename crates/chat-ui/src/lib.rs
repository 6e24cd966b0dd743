//! egui panels for the chat client.
//!
//! The panels are thin: they read the session store directly, keep
//! transient widget state in `UiState`, and hand every mutation back to
//! the app as an action value. No panel ever mutates the store.

pub mod panels;
pub mod state;
pub mod theme;

#[cfg(test)]
mod tests;

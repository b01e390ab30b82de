//! UI layer for the map GUI: app shell, map canvas, list, popup and prompt.

pub mod app;
mod credential_prompt;
mod list_view;
mod map_canvas;
mod popup;

pub use app::RentalMapApp;

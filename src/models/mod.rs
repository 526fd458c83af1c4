//! Data models for the Bionary club backend.
//!
//! Field names serialize in camelCase to match the website's fetch code.

mod blog;
mod department;
mod entry;
mod event;
mod gallery;
mod leaderboard;
mod revision;
mod user;

pub use blog::*;
pub use department::*;
pub use entry::*;
pub use event::*;
pub use gallery::*;
pub use leaderboard::*;
pub use revision::*;
pub use user::*;

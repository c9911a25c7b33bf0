//! Types shared between the API server, its client and the tester.

pub mod documents;
pub mod payloads;
pub mod views;

pub use documents::{Comment, Education, Experience, Like, Post, Profile, Social, User};
pub use views::{ProfileView, RepoSummary, UserSummary, UserView};

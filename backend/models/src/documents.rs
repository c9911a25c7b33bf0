//! # Documents
//!
//! Persisted shapes. Each top level document is stored whole, with its
//! sub-entities embedded inline.
//!
//! - **User**: identity and credentials, keyed by id
//! - **Profile**: one per user, keyed by the owner's id
//! - **Post**: keyed by id, embeds likes and comments
//!
//! Embedded lists are ordered most-recent-first. New entries go to index 0,
//! removal by id keeps the relative order of the rest.
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    /// PHC encoded password hash, never the plaintext.
    pub password: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Social {
    pub youtube: Option<String>,
    pub twitter: Option<String>,
    pub facebook: Option<String>,
    pub linkedin: Option<String>,
    pub instagram: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Experience {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub from: NaiveDate,
    /// `None` while the position is current.
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Education {
    pub id: Uuid,
    pub school: String,
    pub degree: String,
    #[serde(rename = "fieldofstudy")]
    pub field_of_study: String,
    pub from: NaiveDate,
    pub to: Option<NaiveDate>,
    pub current: bool,
    pub description: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Owning user, also the storage key.
    pub user: Uuid,
    pub company: Option<String>,
    pub website: Option<String>,
    pub location: Option<String>,
    pub bio: Option<String>,
    pub status: String,
    #[serde(rename = "githubusername")]
    pub github_username: Option<String>,
    pub skills: Vec<String>,
    pub social: Social,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub date: DateTime<Utc>,
}

impl Profile {
    pub fn new(user: Uuid, status: String) -> Self {
        Self {
            user,
            company: None,
            website: None,
            location: None,
            bio: None,
            status,
            github_username: None,
            skills: Vec::new(),
            social: Social::default(),
            experience: Vec::new(),
            education: Vec::new(),
            date: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Like {
    pub user: Uuid,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    pub user: Uuid,
    pub text: String,
    pub name: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: Uuid,
    /// Author.
    pub user: Uuid,
    pub text: String,
    /// Author name and avatar as they were when the post was created.
    pub name: String,
    pub avatar: String,
    pub likes: Vec<Like>,
    pub comments: Vec<Comment>,
    pub date: DateTime<Utc>,
}

impl Post {
    pub fn liked_by(&self, user: Uuid) -> bool {
        self.likes.iter().any(|like| like.user == user)
    }
}

/// List element addressed by a generated id within its parent.
pub trait Embedded {
    fn id(&self) -> Uuid;
}

impl Embedded for Experience {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Embedded for Education {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Embedded for Comment {
    fn id(&self) -> Uuid {
        self.id
    }
}

pub fn push_front<T>(list: &mut Vec<T>, entry: T) {
    list.insert(0, entry);
}

/// Removes the entry with `id`, returning whether one was present.
pub fn remove_by_id<T: Embedded>(list: &mut Vec<T>, id: Uuid) -> bool {
    match list.iter().position(|entry| entry.id() == id) {
        Some(index) => {
            list.remove(index);
            true
        }
        None => false,
    }
}

pub fn find_by_id<T: Embedded>(list: &[T], id: Uuid) -> Option<&T> {
    list.iter().find(|entry| entry.id() == id)
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::documents::{Education, Experience, Profile, Social, User};

/// User record as returned to clients, without the password hash.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub avatar: String,
    pub date: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            avatar: user.avatar.clone(),
            date: user.date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub name: Option<String>,
    pub avatar: Option<String>,
}

/// Profile with the owner's name and avatar filled in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfileView {
    pub user: UserSummary,
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

impl ProfileView {
    /// `owner` is `None` when the user record is gone.
    pub fn new(profile: Profile, owner: Option<&User>) -> Self {
        Self {
            user: UserSummary {
                id: profile.user,
                name: owner.map(|user| user.name.clone()),
                avatar: owner.map(|user| user.avatar.clone()),
            },
            company: profile.company,
            website: profile.website,
            location: profile.location,
            bio: profile.bio,
            status: profile.status,
            github_username: profile.github_username,
            skills: profile.skills,
            social: profile.social,
            experience: profile.experience,
            education: profile.education,
            date: profile.date,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RepoSummary {
    pub name: String,
    pub html_url: String,
    pub description: Option<String>,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub forks_count: u64,
}

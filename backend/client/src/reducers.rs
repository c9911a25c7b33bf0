//! # Client State
//!
//! One state slice per concern, each with a pure reducer. A reducer takes the
//! previous slice and an [`Action`] and returns the next slice; unknown
//! actions return the slice unchanged.
use models::{Comment, Like, Post, ProfileView, RepoSummary, UserView};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Danger,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Alert {
    pub id: Uuid,
    pub message: String,
    pub kind: AlertKind,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RequestError {
    pub message: String,
    pub status: Option<u16>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Action {
    SetAlert(Alert),
    RemoveAlert(Uuid),

    RegisterSuccess { token: String },
    RegisterFail,
    LoginSuccess { token: String },
    LoginFail,
    UserLoaded(UserView),
    AuthError,
    Logout,
    AccountDeleted,

    GetProfile(ProfileView),
    UpdateProfile(ProfileView),
    GetProfiles(Vec<ProfileView>),
    GetRepos(Vec<RepoSummary>),
    ProfileError(RequestError),
    ClearProfile,
    ClearProfiles,
    ClearRepos,

    GetPosts(Vec<Post>),
    GetPost(Post),
    AddPost(Post),
    DeletePost(Uuid),
    UpdateLikes { id: Uuid, likes: Vec<Like> },
    AddComment(Vec<Comment>),
    RemoveComment(Uuid),
    PostError(RequestError),
}

#[derive(Clone, Debug, PartialEq)]
pub struct AuthState {
    pub token: Option<String>,
    pub is_authenticated: bool,
    pub loading: bool,
    pub user: Option<UserView>,
}

impl Default for AuthState {
    fn default() -> Self {
        Self {
            token: None,
            is_authenticated: false,
            loading: true,
            user: None,
        }
    }
}

pub fn reduce_auth(state: AuthState, action: &Action) -> AuthState {
    match action {
        Action::UserLoaded(user) => AuthState {
            is_authenticated: true,
            loading: false,
            user: Some(user.clone()),
            ..state
        },
        Action::RegisterSuccess { token } | Action::LoginSuccess { token } => AuthState {
            token: Some(token.clone()),
            is_authenticated: true,
            loading: false,
            ..state
        },
        Action::RegisterFail
        | Action::LoginFail
        | Action::AuthError
        | Action::Logout
        | Action::AccountDeleted => AuthState {
            token: None,
            is_authenticated: false,
            loading: false,
            user: None,
        },
        _ => state,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ProfileState {
    pub profile: Option<ProfileView>,
    pub profiles: Vec<ProfileView>,
    pub repos: Vec<RepoSummary>,
    pub loading: bool,
    pub error: Option<RequestError>,
}

impl Default for ProfileState {
    fn default() -> Self {
        Self {
            profile: None,
            profiles: Vec::new(),
            repos: Vec::new(),
            loading: true,
            error: None,
        }
    }
}

pub fn reduce_profile(state: ProfileState, action: &Action) -> ProfileState {
    match action {
        Action::GetProfile(profile) | Action::UpdateProfile(profile) => ProfileState {
            profile: Some(profile.clone()),
            loading: false,
            ..state
        },
        Action::GetProfiles(profiles) => ProfileState {
            profiles: profiles.clone(),
            loading: false,
            ..state
        },
        Action::GetRepos(repos) => ProfileState {
            repos: repos.clone(),
            loading: false,
            ..state
        },
        Action::ProfileError(error) => ProfileState {
            error: Some(error.clone()),
            loading: false,
            ..state
        },
        Action::ClearProfile => ProfileState {
            profile: None,
            repos: Vec::new(),
            loading: true,
            ..state
        },
        Action::ClearProfiles => ProfileState {
            profiles: Vec::new(),
            loading: true,
            ..state
        },
        Action::ClearRepos => ProfileState {
            repos: Vec::new(),
            ..state
        },
        _ => state,
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PostState {
    pub posts: Vec<Post>,
    pub post: Option<Post>,
    pub loading: bool,
    pub error: Option<RequestError>,
}

impl Default for PostState {
    fn default() -> Self {
        Self {
            posts: Vec::new(),
            post: None,
            loading: true,
            error: None,
        }
    }
}

pub fn reduce_post(state: PostState, action: &Action) -> PostState {
    let loaded = |state: PostState| PostState {
        error: None,
        loading: false,
        ..state
    };

    match action {
        Action::GetPosts(posts) => loaded(PostState {
            posts: posts.clone(),
            ..state
        }),
        Action::GetPost(post) => loaded(PostState {
            post: Some(post.clone()),
            ..state
        }),
        Action::AddPost(post) => {
            let mut posts = Vec::with_capacity(state.posts.len() + 1);
            posts.push(post.clone());
            posts.extend(state.posts.iter().cloned());

            loaded(PostState { posts, ..state })
        }
        Action::DeletePost(id) => {
            let posts = state.posts.iter().filter(|p| p.id != *id).cloned().collect();

            loaded(PostState { posts, ..state })
        }
        Action::UpdateLikes { id, likes } => {
            let posts = state
                .posts
                .iter()
                .map(|post| {
                    if post.id == *id {
                        Post {
                            likes: likes.clone(),
                            ..post.clone()
                        }
                    } else {
                        post.clone()
                    }
                })
                .collect();

            loaded(PostState { posts, ..state })
        }
        Action::AddComment(comments) => {
            let post = state.post.clone().map(|post| Post {
                comments: comments.clone(),
                ..post
            });

            loaded(PostState { post, ..state })
        }
        Action::RemoveComment(comment) => {
            let post = state.post.clone().map(|mut post| {
                post.comments.retain(|c| c.id != *comment);
                post
            });

            loaded(PostState { post, ..state })
        }
        Action::PostError(error) => PostState {
            error: Some(error.clone()),
            loading: false,
            ..state
        },
        _ => state,
    }
}

pub fn reduce_alerts(mut alerts: Vec<Alert>, action: &Action) -> Vec<Alert> {
    match action {
        Action::SetAlert(alert) => {
            alerts.push(alert.clone());
            alerts
        }
        Action::RemoveAlert(id) => {
            alerts.retain(|alert| alert.id != *id);
            alerts
        }
        _ => alerts,
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub profile: ProfileState,
    pub post: PostState,
    pub alerts: Vec<Alert>,
}

/// Root reducer.
pub fn reduce(state: AppState, action: &Action) -> AppState {
    AppState {
        auth: reduce_auth(state.auth, action),
        profile: reduce_profile(state.profile, action),
        post: reduce_post(state.post, action),
        alerts: reduce_alerts(state.alerts, action),
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn post(text: &str) -> Post {
        Post {
            id: Uuid::new_v4(),
            user: Uuid::new_v4(),
            text: text.to_string(),
            name: "A".to_string(),
            avatar: String::new(),
            likes: Vec::new(),
            comments: Vec::new(),
            date: Utc::now(),
        }
    }

    fn comment(text: &str) -> Comment {
        Comment {
            id: Uuid::new_v4(),
            user: Uuid::new_v4(),
            text: text.to_string(),
            name: "A".to_string(),
            avatar: String::new(),
            date: Utc::now(),
        }
    }

    #[test]
    fn test_login_then_logout() {
        let state = reduce_auth(
            AuthState::default(),
            &Action::LoginSuccess {
                token: "t".to_string(),
            },
        );
        assert!(state.is_authenticated);
        assert_eq!(state.token.as_deref(), Some("t"));

        let state = reduce_auth(state, &Action::Logout);
        assert!(!state.is_authenticated);
        assert!(state.token.is_none());
        assert!(!state.loading);
    }

    #[test]
    fn test_add_post_prepends() {
        let old = post("old");
        let new = post("new");
        let state = PostState {
            posts: vec![old.clone()],
            ..Default::default()
        };

        let state = reduce_post(state, &Action::AddPost(new.clone()));
        assert_eq!(state.posts, [new, old]);
        assert!(!state.loading);
    }

    #[test]
    fn test_delete_post_filters() {
        let keep = post("keep");
        let gone = post("gone");
        let state = PostState {
            posts: vec![keep.clone(), gone.clone()],
            ..Default::default()
        };

        let state = reduce_post(state, &Action::DeletePost(gone.id));
        assert_eq!(state.posts, [keep]);
    }

    #[test]
    fn test_update_likes_touches_one_post() {
        let liked = post("liked");
        let other = post("other");
        let state = PostState {
            posts: vec![liked.clone(), other.clone()],
            ..Default::default()
        };
        let likes = vec![Like { user: Uuid::new_v4() }];

        let state = reduce_post(
            state,
            &Action::UpdateLikes {
                id: liked.id,
                likes: likes.clone(),
            },
        );

        assert_eq!(state.posts[0].likes, likes);
        assert!(state.posts[1].likes.is_empty());
    }

    #[test]
    fn test_comments_on_current_post() {
        let first = comment("first");
        let second = comment("second");
        let state = PostState {
            post: Some(post("hello")),
            ..Default::default()
        };

        let state = reduce_post(
            state,
            &Action::AddComment(vec![second.clone(), first.clone()]),
        );
        assert_eq!(state.post.as_ref().unwrap().comments.len(), 2);

        let state = reduce_post(state, &Action::RemoveComment(second.id));
        assert_eq!(state.post.unwrap().comments, [first]);
    }

    #[test]
    fn test_post_error_keeps_posts() {
        let state = PostState {
            posts: vec![post("hello")],
            ..Default::default()
        };
        let error = RequestError {
            message: "Post not found".to_string(),
            status: Some(404),
        };

        let state = reduce_post(state, &Action::PostError(error.clone()));
        assert_eq!(state.error, Some(error));
        assert_eq!(state.posts.len(), 1);
    }

    #[test]
    fn test_clear_profile() {
        let state = ProfileState {
            repos: vec![RepoSummary {
                name: "r".to_string(),
                html_url: String::new(),
                description: None,
                stargazers_count: 0,
                watchers_count: 0,
                forks_count: 0,
            }],
            loading: false,
            ..Default::default()
        };

        let state = reduce_profile(state, &Action::ClearProfile);
        assert!(state.repos.is_empty());
        assert!(state.loading);
    }

    #[test]
    fn test_alerts() {
        let alert = Alert {
            id: Uuid::new_v4(),
            message: "Post created".to_string(),
            kind: AlertKind::Success,
        };

        let alerts = reduce_alerts(Vec::new(), &Action::SetAlert(alert.clone()));
        assert_eq!(alerts, [alert.clone()]);

        let alerts = reduce_alerts(alerts, &Action::RemoveAlert(alert.id));
        assert!(alerts.is_empty());
    }

    #[test]
    fn test_account_deleted_resets_auth() {
        let state = AppState {
            auth: AuthState {
                token: Some("t".to_string()),
                is_authenticated: true,
                loading: false,
                user: None,
            },
            ..Default::default()
        };

        let state = reduce(state, &Action::AccountDeleted);
        assert!(state.auth.token.is_none());
        assert!(!state.auth.is_authenticated);
    }
}

//! # Payloads
//!
//! Request and response bodies shared by the server and the client.
//!
//! Missing request fields deserialize to empty values so that the server can
//! report every absent field at once instead of failing on the first.
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Body of post creation, post edits and comments.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TextRequest {
    pub text: String,
}

/// Profile upsert. Empty fields leave the stored value untouched.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileRequest {
    pub company: String,
    pub website: String,
    pub location: String,
    pub bio: String,
    pub status: String,
    #[serde(rename = "githubusername")]
    pub github_username: String,
    /// Comma separated.
    pub skills: String,
    pub youtube: String,
    pub twitter: String,
    pub facebook: String,
    pub linkedin: String,
    pub instagram: String,
}

/// Dates are `YYYY-MM-DD`, an empty `to` means current.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperienceRequest {
    pub title: String,
    pub company: String,
    pub location: String,
    pub from: String,
    pub to: String,
    pub current: bool,
    pub description: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EducationRequest {
    pub school: String,
    pub degree: String,
    #[serde(rename = "fieldofstudy")]
    pub field_of_study: String,
    pub from: String,
    pub to: String,
    pub current: bool,
    pub description: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorEntry {
    pub message: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ErrorsResponse {
    pub errors: Vec<ErrorEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: RegisterRequest = serde_json::from_str(r#"{"name":"A"}"#).unwrap();

        assert_eq!(request.name, "A");
        assert!(request.email.is_empty());
        assert!(request.password.is_empty());
    }

    #[test]
    fn test_profile_request_field_names() {
        let request: ProfileRequest =
            serde_json::from_str(r#"{"status":"Dev","skills":"rust, go","githubusername":"octo"}"#)
                .unwrap();

        assert_eq!(request.github_username, "octo");
        assert_eq!(request.skills, "rust, go");
        assert!(request.company.is_empty());
    }

    #[test]
    fn test_education_request_field_names() {
        let request: EducationRequest = serde_json::from_str(
            r#"{"school":"MIT","degree":"BSc","fieldofstudy":"CS","from":"2010-09-01","current":true}"#,
        )
        .unwrap();

        assert_eq!(request.field_of_study, "CS");
        assert!(request.current);
        assert!(request.to.is_empty());
    }
}

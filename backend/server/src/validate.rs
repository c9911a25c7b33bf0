use std::sync::LazyLock;

use axum::{
    Json,
    extract::{FromRequest, Request},
};
use chrono::NaiveDate;
use models::payloads::{
    EducationRequest, ExperienceRequest, LoginRequest, ProfileRequest, RegisterRequest,
    TextRequest,
};
use regex::Regex;
use serde::de::DeserializeOwned;

use crate::error::AppError;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Field checks run on a request body before it reaches any store.
pub trait Validate {
    fn validate(&self, checks: &mut Checks);
}

/// Collects every failed check so they can be reported together.
#[derive(Default)]
pub struct Checks(Vec<String>);

impl Checks {
    pub fn require(&mut self, value: &str, message: &str) {
        if value.trim().is_empty() {
            self.0.push(message.to_string());
        }
    }

    pub fn email(&mut self, value: &str, message: &str) {
        if !EMAIL.is_match(value.trim()) {
            self.0.push(message.to_string());
        }
    }

    pub fn min_len(&mut self, value: &str, min: usize, message: &str) {
        if value.chars().count() < min {
            self.0.push(message.to_string());
        }
    }

    pub fn date(&mut self, value: &str, message: &str) {
        if parse_date(value).is_none() {
            self.0.push(message.to_string());
        }
    }

    /// Blank is allowed, anything else must be a date.
    pub fn optional_date(&mut self, value: &str, message: &str) {
        if !value.trim().is_empty() {
            self.date(value, message);
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.0))
        }
    }
}

pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).ok()
}

/// `None` for blank input.
pub fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

pub fn split_skills(skills: &str) -> Vec<String> {
    skills
        .split(',')
        .map(str::trim)
        .filter(|skill| !skill.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl Validate for RegisterRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.require(&self.name, "Name is required");
        checks.email(&self.email, "Please include a valid email");
        checks.min_len(
            &self.password,
            6,
            "Please enter a password with 6 or more characters",
        );
    }
}

impl Validate for LoginRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.email(&self.email, "Please include a valid email");
        checks.require(&self.password, "Password is required");
    }
}

impl Validate for TextRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.require(&self.text, "Text is required");
    }
}

impl Validate for ProfileRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.require(&self.status, "Status is required");
        checks.require(&self.skills, "Skills is required");
    }
}

impl Validate for ExperienceRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.require(&self.title, "Title is required");
        checks.require(&self.company, "Company is required");
        checks.date(&self.from, "From date is required (YYYY-MM-DD)");
        checks.optional_date(&self.to, "To date must be YYYY-MM-DD");
    }
}

impl Validate for EducationRequest {
    fn validate(&self, checks: &mut Checks) {
        checks.require(&self.school, "School is required");
        checks.require(&self.degree, "Degree is required");
        checks.require(&self.field_of_study, "Field of study is required");
        checks.date(&self.from, "From date is required (YYYY-MM-DD)");
        checks.optional_date(&self.to, "To date must be YYYY-MM-DD");
    }
}

/// JSON body that has passed its [`Validate`] checks.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::validation(rejection.body_text()))?;

        let mut checks = Checks::default();
        value.validate(&mut checks);
        checks.finish()?;

        Ok(ValidJson(value))
    }
}

use models::{
    Education, Experience, Post, Profile, ProfileView, User,
    documents::{push_front, remove_by_id},
    payloads::{EducationRequest, ExperienceRequest, ProfileRequest},
};
use tracing::info;
use uuid::Uuid;

use crate::{
    database::{Database, Versioned},
    error::AppError,
    users,
    validate::{non_empty, parse_date, split_skills},
};

async fn view(db: &Database, profile: Profile) -> Result<ProfileView, AppError> {
    let owner = db.find::<User>(&profile.user.to_string()).await?;

    Ok(ProfileView::new(profile, owner.as_deref()))
}

async fn find_own(db: &Database, identity: Uuid) -> Result<Versioned<Profile>, AppError> {
    db.find::<Profile>(&identity.to_string())
        .await?
        .ok_or(AppError::NoProfile)
}

pub async fn get_own(db: &Database, identity: Uuid) -> Result<ProfileView, AppError> {
    let profile = find_own(db, identity).await?;

    view(db, profile.into_inner()).await
}

pub async fn get_by_user(db: &Database, user: Uuid) -> Result<ProfileView, AppError> {
    let profile = db
        .find::<Profile>(&user.to_string())
        .await?
        .ok_or(AppError::NotFound("Profile not found"))?;

    view(db, profile.into_inner()).await
}

pub async fn list_all(db: &Database) -> Result<Vec<ProfileView>, AppError> {
    let mut profiles = db.all::<Profile>().await?;
    profiles.sort_by(|a, b| b.date.cmp(&a.date));

    let mut views = Vec::with_capacity(profiles.len());
    for profile in profiles {
        views.push(view(db, profile).await?);
    }

    Ok(views)
}

fn overwrite(field: &mut Option<String>, value: &str) {
    if let Some(value) = non_empty(value) {
        *field = Some(value);
    }
}

/// Applies the non-empty fields of `request` to `profile`.
fn apply(profile: &mut Profile, request: &ProfileRequest) {
    overwrite(&mut profile.company, &request.company);
    overwrite(&mut profile.website, &request.website);
    overwrite(&mut profile.location, &request.location);
    overwrite(&mut profile.bio, &request.bio);
    overwrite(&mut profile.github_username, &request.github_username);

    if let Some(status) = non_empty(&request.status) {
        profile.status = status;
    }

    let skills = split_skills(&request.skills);
    if !skills.is_empty() {
        profile.skills = skills;
    }

    let social = &mut profile.social;
    overwrite(&mut social.youtube, &request.youtube);
    overwrite(&mut social.twitter, &request.twitter);
    overwrite(&mut social.facebook, &request.facebook);
    overwrite(&mut social.linkedin, &request.linkedin);
    overwrite(&mut social.instagram, &request.instagram);
}

/// Creates the caller's profile or updates it in place.
pub async fn upsert(
    db: &Database,
    identity: Uuid,
    request: ProfileRequest,
) -> Result<ProfileView, AppError> {
    users::get_by_id(db, identity).await?;

    let mut profile = match db.find::<Profile>(&identity.to_string()).await? {
        Some(existing) => existing,
        None => {
            info!("Creating profile for {identity}");
            Versioned::new(Profile::new(identity, String::new()))
        }
    };

    apply(&mut profile, &request);
    db.save(&mut profile).await?;

    view(db, profile.into_inner()).await
}

fn experience_entry(request: ExperienceRequest) -> Result<Experience, AppError> {
    let from = parse_date(&request.from)
        .ok_or_else(|| AppError::validation("From date is required (YYYY-MM-DD)"))?;
    let to = if request.current {
        None
    } else {
        parse_date(&request.to)
    };

    Ok(Experience {
        id: Uuid::new_v4(),
        title: request.title.trim().to_string(),
        company: request.company.trim().to_string(),
        location: non_empty(&request.location),
        from,
        current: request.current || to.is_none(),
        to,
        description: non_empty(&request.description),
    })
}

fn education_entry(request: EducationRequest) -> Result<Education, AppError> {
    let from = parse_date(&request.from)
        .ok_or_else(|| AppError::validation("From date is required (YYYY-MM-DD)"))?;
    let to = if request.current {
        None
    } else {
        parse_date(&request.to)
    };

    Ok(Education {
        id: Uuid::new_v4(),
        school: request.school.trim().to_string(),
        degree: request.degree.trim().to_string(),
        field_of_study: request.field_of_study.trim().to_string(),
        from,
        current: request.current || to.is_none(),
        to,
        description: non_empty(&request.description),
    })
}

pub async fn add_experience(
    db: &Database,
    identity: Uuid,
    request: ExperienceRequest,
) -> Result<ProfileView, AppError> {
    let entry = experience_entry(request)?;
    users::get_by_id(db, identity).await?;
    let mut profile = find_own(db, identity).await?;

    push_front(&mut profile.experience, entry);
    db.save(&mut profile).await?;

    view(db, profile.into_inner()).await
}

/// Absent ids are not an error.
pub async fn remove_experience(
    db: &Database,
    identity: Uuid,
    entry: Uuid,
) -> Result<ProfileView, AppError> {
    let mut profile = find_own(db, identity).await?;

    if remove_by_id(&mut profile.experience, entry) {
        db.save(&mut profile).await?;
    }

    view(db, profile.into_inner()).await
}

pub async fn add_education(
    db: &Database,
    identity: Uuid,
    request: EducationRequest,
) -> Result<ProfileView, AppError> {
    let entry = education_entry(request)?;
    users::get_by_id(db, identity).await?;
    let mut profile = find_own(db, identity).await?;

    push_front(&mut profile.education, entry);
    db.save(&mut profile).await?;

    view(db, profile.into_inner()).await
}

pub async fn remove_education(
    db: &Database,
    identity: Uuid,
    entry: Uuid,
) -> Result<ProfileView, AppError> {
    let mut profile = find_own(db, identity).await?;

    if remove_by_id(&mut profile.education, entry) {
        db.save(&mut profile).await?;
    }

    view(db, profile.into_inner()).await
}

/// Deletes the caller's posts, then their profile, then the user record.
///
/// Each step stands alone: a failure part way through leaves the earlier
/// deletions in place.
pub async fn delete_account(db: &Database, identity: Uuid) -> Result<(), AppError> {
    let posts = db.all::<Post>().await?;
    let mut removed = 0;
    for post in posts.iter().filter(|post| post.user == identity) {
        db.remove::<Post>(&post.id.to_string()).await?;
        removed += 1;
    }

    db.remove::<Profile>(&identity.to_string()).await?;
    users::delete(db, identity).await?;

    info!("Deleted account {identity} with {removed} posts");
    Ok(())
}

#[cfg(test)]
mod tests {
    use models::payloads::RegisterRequest;

    use super::*;

    async fn user(db: &Database) -> Uuid {
        users::register(
            db,
            RegisterRequest {
                name: "A".to_string(),
                email: format!("{}@x.com", Uuid::new_v4()),
                password: "secret1".to_string(),
            },
        )
        .await
        .unwrap()
        .id
    }

    fn profile_request() -> ProfileRequest {
        ProfileRequest {
            status: "Developer".to_string(),
            skills: "rust, go ,python".to_string(),
            company: "Acme".to_string(),
            twitter: "https://twitter.com/a".to_string(),
            ..Default::default()
        }
    }

    fn experience(title: &str) -> ExperienceRequest {
        ExperienceRequest {
            title: title.to_string(),
            company: "Acme".to_string(),
            from: "2020-01-01".to_string(),
            to: "2021-01-01".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_merges() {
        let db = Database::memory();
        let identity = user(&db).await;

        let created = upsert(&db, identity, profile_request()).await.unwrap();
        assert_eq!(created.skills, ["rust", "go", "python"]);
        assert_eq!(created.company.as_deref(), Some("Acme"));
        assert_eq!(created.user.name.as_deref(), Some("A"));

        let updated = upsert(
            &db,
            identity,
            ProfileRequest {
                status: "Senior".to_string(),
                skills: "rust".to_string(),
                bio: "hello".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.status, "Senior");
        assert_eq!(updated.skills, ["rust"]);
        assert_eq!(updated.company.as_deref(), Some("Acme"));
        assert_eq!(updated.social.twitter.as_deref(), Some("https://twitter.com/a"));
        assert_eq!(db.all::<Profile>().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let db = Database::memory();
        let identity = user(&db).await;

        assert!(matches!(get_own(&db, identity).await, Err(AppError::NoProfile)));
        assert!(matches!(
            get_by_user(&db, identity).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            add_experience(&db, identity, experience("Engineer")).await,
            Err(AppError::NoProfile)
        ));
    }

    #[tokio::test]
    async fn test_experience_order_and_removal() {
        let db = Database::memory();
        let identity = user(&db).await;
        upsert(&db, identity, profile_request()).await.unwrap();

        for title in ["first", "second", "third"] {
            add_experience(&db, identity, experience(title)).await.unwrap();
        }

        let profile = get_own(&db, identity).await.unwrap();
        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["third", "second", "first"]);

        let middle = profile.experience[1].id;
        let profile = remove_experience(&db, identity, middle).await.unwrap();
        let titles: Vec<_> = profile.experience.iter().map(|e| e.title.as_str()).collect();
        assert_eq!(titles, ["third", "first"]);

        let profile = remove_experience(&db, identity, Uuid::new_v4()).await.unwrap();
        assert_eq!(profile.experience.len(), 2);
    }

    #[tokio::test]
    async fn test_current_experience_has_no_end() {
        let db = Database::memory();
        let identity = user(&db).await;
        upsert(&db, identity, profile_request()).await.unwrap();

        let mut request = experience("Engineer");
        request.current = true;
        let profile = add_experience(&db, identity, request).await.unwrap();

        assert!(profile.experience[0].current);
        assert!(profile.experience[0].to.is_none());
    }

    #[tokio::test]
    async fn test_education_order_and_removal() {
        let db = Database::memory();
        let identity = user(&db).await;
        upsert(&db, identity, profile_request()).await.unwrap();

        for school in ["MIT", "CMU"] {
            add_education(
                &db,
                identity,
                EducationRequest {
                    school: school.to_string(),
                    degree: "BSc".to_string(),
                    field_of_study: "CS".to_string(),
                    from: "2010-09-01".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        }

        let profile = get_own(&db, identity).await.unwrap();
        assert_eq!(profile.education[0].school, "CMU");

        let profile = remove_education(&db, identity, profile.education[0].id)
            .await
            .unwrap();
        assert_eq!(profile.education.len(), 1);
        assert_eq!(profile.education[0].school, "MIT");
    }

    #[tokio::test]
    async fn test_delete_account_cascades() {
        let db = Database::memory();
        let identity = user(&db).await;
        let other = user(&db).await;
        upsert(&db, identity, profile_request()).await.unwrap();

        crate::posts::create(&db, identity, "mine").await.unwrap();
        crate::posts::create(&db, other, "theirs").await.unwrap();

        delete_account(&db, identity).await.unwrap();

        let posts = db.all::<Post>().await.unwrap();
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].user, other);
        assert!(matches!(
            get_by_user(&db, identity).await,
            Err(AppError::NotFound(_))
        ));
        assert!(users::get_by_id(&db, identity).await.is_err());
    }

    #[tokio::test]
    async fn test_deleted_account_cannot_write_profile() {
        let db = Database::memory();
        let identity = user(&db).await;
        upsert(&db, identity, profile_request()).await.unwrap();

        delete_account(&db, identity).await.unwrap();

        assert!(matches!(
            upsert(&db, identity, profile_request()).await,
            Err(AppError::NotFound("User not found"))
        ));
        assert!(matches!(
            add_experience(&db, identity, experience("Engineer")).await,
            Err(AppError::NotFound("User not found"))
        ));
        assert!(db.all::<Profile>().await.unwrap().is_empty());
    }
}

use models::{Comment, Post};
use uuid::Uuid;

use crate::error::AppError;

/// A resource with an owning user.
pub trait Owned {
    fn owner(&self) -> Uuid;
}

impl Owned for Post {
    fn owner(&self) -> Uuid {
        self.user
    }
}

impl Owned for Comment {
    fn owner(&self) -> Uuid {
        self.user
    }
}

/// Rejects with [`AppError::NotOwner`] unless `caller` owns `resource`.
pub fn ensure_owner<R: Owned + ?Sized>(resource: &R, caller: Uuid) -> Result<(), AppError> {
    if resource.owner() == caller {
        Ok(())
    } else {
        Err(AppError::NotOwner)
    }
}

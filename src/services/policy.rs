use uuid::Uuid;

use crate::{
    error::ApiError,
    models::{Course, Group},
};

/// A record with a single owning user.
pub trait Owned {
    fn owner_id(&self) -> Uuid;
}

impl Owned for Course {
    fn owner_id(&self) -> Uuid {
        self.uploaded_by
    }
}

impl Owned for Group {
    fn owner_id(&self) -> Uuid {
        self.created_by
    }
}

/// Ownership predicate shared by course and group mutations. Role plays no part here.
pub fn is_owner<R: Owned>(resource: &R, caller_id: Uuid) -> bool {
    resource.owner_id() == caller_id
}

/// `Forbidden("Not authorized to <action>")` unless `caller_id` owns `resource`.
pub fn authorize_owner<R: Owned>(resource: &R, caller_id: Uuid, action: &str) -> Result<(), ApiError> {
    if is_owner(resource, caller_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(format!("Not authorized to {action}")))
    }
}

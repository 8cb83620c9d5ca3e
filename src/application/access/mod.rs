use crate::application::error::ServiceError;
use crate::application::ports::business_repository::BusinessRepository;
use crate::domain::users::user::UserRole;

/// Authenticated caller as seen by use cases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i64,
    pub role: UserRole,
}

impl Actor {
    pub fn new(user_id: i64, role: UserRole) -> Self {
        Self { user_id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn ensure_self_or_admin(&self, user_id: i64) -> Result<(), ServiceError> {
        if self.user_id == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("not allowed to act on another user"))
        }
    }

    pub fn ensure_admin(&self) -> Result<(), ServiceError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::forbidden("admin role required"))
        }
    }
}

// Presentation layer is responsible for building Actor from HTTP inputs.

/// Members of a business and admins may manage it and its products.
pub async fn ensure_business_manager<B>(
    businesses: &B,
    actor: &Actor,
    business_id: i64,
) -> Result<(), ServiceError>
where
    B: BusinessRepository + ?Sized,
{
    if actor.is_admin() {
        return Ok(());
    }
    if businesses.is_member(actor.user_id, business_id).await? {
        Ok(())
    } else {
        Err(ServiceError::forbidden("not a member of this business"))
    }
}

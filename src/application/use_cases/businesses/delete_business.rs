use crate::application::access::{Actor, ensure_business_manager};
use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::business_repository::{BusinessDeletion, BusinessRepository};
use crate::application::ports::file_store::FileStore;

pub struct DeleteBusiness<'a, R, F>
where
    R: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub repo: &'a R,
    pub files: &'a F,
}

impl<'a, R, F> DeleteBusiness<'a, R, F>
where
    R: BusinessRepository + ?Sized,
    F: FileStore + ?Sized,
{
    pub async fn execute(&self, actor: &Actor, id: i64) -> ServiceResult<()> {
        if self.repo.get(id).await?.is_none() {
            return Err(ServiceError::not_found("business not found"));
        }
        ensure_business_manager(self.repo, actor, id).await?;
        let images = match self.repo.delete(id).await? {
            BusinessDeletion::Deleted(images) => images,
            BusinessDeletion::NotFound => return Err(ServiceError::not_found("business not found")),
            BusinessDeletion::Ordered => {
                return Err(ServiceError::conflict(
                    "business has products that appear in orders",
                ));
            }
        };
        tracing::info!(business_id = id, by = actor.user_id, "business_deleted");
        for image in images {
            if let Err(err) = self.files.delete(&image.file_key).await {
                tracing::warn!(business_id = id, key = %image.file_key, error = ?err, "failed to remove product image object");
            }
        }
        Ok(())
    }
}

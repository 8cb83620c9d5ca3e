use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::file_store::{FileArea, FileStore, StoredObject, Upload};
use crate::application::use_cases::products::store_image;

pub const MAX_FILES_PER_UPLOAD: usize = 10;

pub struct UploadImages<'a, F: FileStore + ?Sized> {
    pub files: &'a F,
}

impl<'a, F: FileStore + ?Sized> UploadImages<'a, F> {
    pub async fn execute(
        &self,
        area: FileArea,
        uploads: Vec<Upload>,
    ) -> ServiceResult<Vec<StoredObject>> {
        if uploads.is_empty() {
            return Err(ServiceError::bad_request("no files uploaded"));
        }
        if uploads.len() > MAX_FILES_PER_UPLOAD {
            return Err(ServiceError::bad_request(format!(
                "at most {MAX_FILES_PER_UPLOAD} files per request"
            )));
        }
        if uploads.iter().any(|u| !u.is_image()) {
            return Err(ServiceError::bad_request("only image uploads are accepted"));
        }
        let mut stored = Vec::with_capacity(uploads.len());
        for upload in uploads {
            stored.push(store_image(self.files, area, upload).await?);
        }
        Ok(stored)
    }
}

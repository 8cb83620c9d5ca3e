pub mod add_product_image;
pub mod add_review;
pub mod add_review_image;
pub mod create_product;
pub mod delete_product;
pub mod delete_product_image;
pub mod get_product;
pub mod list_categories;
pub mod list_product_images;
pub mod list_reviews;
pub mod search_products;
pub mod update_product;
pub mod upload_images;

use rust_decimal::Decimal;

use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::file_store::{FileArea, FileStore, StoredObject, Upload};
use crate::domain::products::product::{ProductDraft, max_amount};

/// Validates the draft and sanitizes its rich-text description in place.
pub(crate) fn prepare_draft(draft: &mut ProductDraft) -> ServiceResult<()> {
    draft.title = draft.title.trim().to_string();
    if draft.title.is_empty() {
        return Err(ServiceError::bad_request("title is required"));
    }
    if draft.price < Decimal::ZERO {
        return Err(ServiceError::bad_request("price cannot be negative"));
    }
    if draft.quantity < 0 {
        return Err(ServiceError::bad_request("quantity cannot be negative"));
    }
    if !(0..=100).contains(&draft.discount) {
        return Err(ServiceError::bad_request("discount must be between 0 and 100"));
    }
    if let Some(specs) = &draft.specifications {
        if specs.iter().any(|s| s.name.trim().is_empty()) {
            return Err(ServiceError::bad_request("specification name is required"));
        }
    }
    draft.price = draft.price.round_dp(2);
    if draft.price > max_amount() {
        return Err(ServiceError::bad_request(format!(
            "price cannot exceed {}",
            max_amount()
        )));
    }
    draft.description = ammonia::clean(&draft.description);
    Ok(())
}

pub(crate) async fn store_image<F: FileStore + ?Sized>(
    files: &F,
    area: FileArea,
    upload: Upload,
) -> ServiceResult<StoredObject> {
    if upload.bytes.is_empty() {
        return Err(ServiceError::bad_request("empty file"));
    }
    if !upload.is_image() {
        return Err(ServiceError::bad_request("only image uploads are accepted"));
    }
    files
        .put(area, upload)
        .await
        .map_err(|e| ServiceError::upstream("failed to store file", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::products::product::{ProductCategory, ProductSpecification};

    fn draft() -> ProductDraft {
        ProductDraft {
            business_id: 1,
            price: Decimal::new(123456, 3),
            title: "  Kettle ".into(),
            description: "<p>Steel</p><script>alert(1)</script>".into(),
            quantity: 3,
            discount: 5,
            category: ProductCategory::Home,
            brand: None,
            sku: None,
            estimated_delivery: None,
            specifications: Some(vec![ProductSpecification {
                name: "Volume".into(),
                value: "1.7 l".into(),
            }]),
        }
    }

    #[test]
    fn draft_is_normalized_and_sanitized() {
        let mut d = draft();
        prepare_draft(&mut d).unwrap();
        assert_eq!(d.title, "Kettle");
        assert_eq!(d.price, Decimal::new(12346, 2));
        assert!(d.description.contains("<p>Steel</p>"));
        assert!(!d.description.contains("script"));
    }

    #[test]
    fn draft_rejects_out_of_range_values() {
        let mut d = draft();
        d.discount = 101;
        assert!(matches!(prepare_draft(&mut d), Err(ServiceError::BadRequest(_))));

        let mut d = draft();
        d.quantity = -1;
        assert!(prepare_draft(&mut d).is_err());

        let mut d = draft();
        d.title = "   ".into();
        assert!(prepare_draft(&mut d).is_err());
    }

    #[test]
    fn price_must_fit_the_money_column() {
        let mut d = draft();
        d.price = Decimal::new(999_999_999_999, 2);
        prepare_draft(&mut d).unwrap();

        let mut d = draft();
        d.price = Decimal::new(10_000_000_000, 0);
        assert!(matches!(prepare_draft(&mut d), Err(ServiceError::BadRequest(_))));

        // Rounds up past the limit.
        let mut d = draft();
        d.price = Decimal::new(9_999_999_999_999, 3);
        assert!(matches!(prepare_draft(&mut d), Err(ServiceError::BadRequest(_))));
    }
}

use crate::domain::products::product::{CategoryFilter, ProductCategory};

pub fn list_categories() -> Vec<CategoryFilter> {
    ProductCategory::ALL
        .into_iter()
        .map(CategoryFilter::from)
        .collect()
}

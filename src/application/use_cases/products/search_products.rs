use crate::application::error::{ServiceError, ServiceResult};
use crate::application::ports::product_repository::ProductRepository;
use crate::domain::products::product::{Product, ProductFilters};

pub struct SearchProducts<'a, P: ProductRepository + ?Sized> {
    pub products: &'a P,
}

impl<'a, P: ProductRepository + ?Sized> SearchProducts<'a, P> {
    pub async fn execute(&self, filters: ProductFilters) -> ServiceResult<Vec<Product>> {
        let mut filters = filters.clamp_page();
        filters.search_query = filters
            .search_query
            .map(|q| q.trim().to_string())
            .filter(|q| !q.is_empty());
        if let (Some(min), Some(max)) = (filters.min_price, filters.max_price) {
            if min > max {
                return Err(ServiceError::bad_request("min_price is greater than max_price"));
            }
        }
        Ok(self.products.filter(&filters).await?)
    }
}

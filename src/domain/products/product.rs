use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProductCategory {
    Electronics,
    Clothing,
    Home,
    Beauty,
    Sports,
    Books,
    Toys,
    Food,
    Other,
}

impl ProductCategory {
    pub const ALL: [ProductCategory; 9] = [
        ProductCategory::Electronics,
        ProductCategory::Clothing,
        ProductCategory::Home,
        ProductCategory::Beauty,
        ProductCategory::Sports,
        ProductCategory::Books,
        ProductCategory::Toys,
        ProductCategory::Food,
        ProductCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "electronics",
            ProductCategory::Clothing => "clothing",
            ProductCategory::Home => "home",
            ProductCategory::Beauty => "beauty",
            ProductCategory::Sports => "sports",
            ProductCategory::Books => "books",
            ProductCategory::Toys => "toys",
            ProductCategory::Food => "food",
            ProductCategory::Other => "other",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ProductCategory::Electronics => "Электроника",
            ProductCategory::Clothing => "Одежда",
            ProductCategory::Home => "Дом и сад",
            ProductCategory::Beauty => "Красота и здоровье",
            ProductCategory::Sports => "Спорт",
            ProductCategory::Books => "Книги",
            ProductCategory::Toys => "Игрушки",
            ProductCategory::Food => "Продукты",
            ProductCategory::Other => "Другое",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.as_str() == raw)
    }
}

#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: i64,
    pub product_id: i64,
    pub file_key: String,
    pub url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSpecification {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct Product {
    pub id: i64,
    pub business_id: i64,
    pub price: Decimal,
    pub title: String,
    pub description: String,
    pub quantity: i32,
    pub discount: i32,
    pub category: ProductCategory,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub estimated_delivery: Option<String>,
    pub rating: f64,
    pub review_count: i64,
    pub images: Vec<ProductImage>,
    pub specifications: Vec<ProductSpecification>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Price charged per unit once the percentage discount is applied.
    pub fn unit_price(&self) -> Decimal {
        discounted_price(self.price, self.discount)
    }
}

/// Largest amount a `NUMERIC(12, 2)` money column holds.
pub fn max_amount() -> Decimal {
    Decimal::new(999_999_999_999, 2)
}

pub fn discounted_price(price: Decimal, discount_percent: i32) -> Decimal {
    let discount = discount_percent.clamp(0, 100);
    (price * Decimal::from(100 - discount) / Decimal::from(100)).round_dp(2)
}

/// Editable product fields, shared by create and update.
#[derive(Debug, Clone)]
pub struct ProductDraft {
    pub business_id: i64,
    pub price: Decimal,
    pub title: String,
    pub description: String,
    pub quantity: i32,
    pub discount: i32,
    pub category: ProductCategory,
    pub brand: Option<String>,
    pub sku: Option<String>,
    pub estimated_delivery: Option<String>,
    pub specifications: Option<Vec<ProductSpecification>>,
}

#[derive(Debug, Clone)]
pub struct NewProductImage {
    pub product_id: i64,
    pub file_key: String,
    pub url: String,
    pub is_primary: bool,
}

#[derive(Debug, Clone)]
pub struct ProductReview {
    pub id: i64,
    pub product_id: i64,
    pub user_id: i64,
    pub rating: i16,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub images: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub product_id: i64,
    pub user_id: i64,
    pub rating: i16,
    pub text: String,
}

#[derive(Debug, Clone)]
pub struct ReviewImage {
    pub id: i64,
    pub review_id: i64,
    pub url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortBy {
    PriceAsc,
    PriceDesc,
    Rating,
    Newest,
    #[default]
    Default,
}

impl SortBy {
    /// Unknown values fall back to the default ordering.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "price-asc" => SortBy::PriceAsc,
            "price-desc" => SortBy::PriceDesc,
            "rating" => SortBy::Rating,
            "newest" => SortBy::Newest,
            _ => SortBy::Default,
        }
    }

    pub fn order_clause(&self) -> &'static str {
        match self {
            SortBy::PriceAsc => "price ASC, id DESC",
            SortBy::PriceDesc => "price DESC, id DESC",
            SortBy::Rating => "rating DESC, id DESC",
            SortBy::Newest => "created_at DESC, id DESC",
            SortBy::Default => "id DESC",
        }
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 200;

#[derive(Debug, Clone)]
pub struct ProductFilters {
    pub search_query: Option<String>,
    pub categories: Vec<ProductCategory>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub brands: Vec<String>,
    pub rating: Option<f64>,
    pub in_stock: bool,
    pub on_sale: bool,
    pub sort_by: SortBy,
    pub business_id: Option<i64>,
    pub limit: i64,
    pub offset: i64,
}

impl Default for ProductFilters {
    fn default() -> Self {
        Self {
            search_query: None,
            categories: Vec::new(),
            min_price: None,
            max_price: None,
            brands: Vec::new(),
            rating: None,
            in_stock: false,
            on_sale: false,
            sort_by: SortBy::Default,
            business_id: None,
            limit: DEFAULT_PAGE_SIZE,
            offset: 0,
        }
    }
}

impl ProductFilters {
    pub fn clamp_page(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_PAGE_SIZE);
        self.offset = self.offset.max(0);
        self
    }

    /// Whether a product satisfies every filter. Ordering and paging are not considered.
    pub fn matches(&self, product: &Product) -> bool {
        if let Some(q) = self.search_query.as_deref() {
            let q = q.to_lowercase();
            if !product.title.to_lowercase().contains(&q)
                && !product.description.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        if !self.categories.is_empty() && !self.categories.contains(&product.category) {
            return false;
        }
        if self.min_price.is_some_and(|min| product.price < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| product.price > max) {
            return false;
        }
        if !self.brands.is_empty()
            && !product
                .brand
                .as_ref()
                .is_some_and(|b| self.brands.contains(b))
        {
            return false;
        }
        if self.rating.is_some_and(|r| product.rating < r) {
            return false;
        }
        if self.in_stock && product.quantity <= 0 {
            return false;
        }
        if self.on_sale && product.discount <= 0 {
            return false;
        }
        if self.business_id.is_some_and(|b| product.business_id != b) {
            return false;
        }
        true
    }
}

#[derive(Debug, Clone)]
pub struct CategoryFilter {
    pub id: String,
    pub title: String,
    pub image: String,
    pub link: String,
    pub category: ProductCategory,
}

impl From<ProductCategory> for CategoryFilter {
    fn from(category: ProductCategory) -> Self {
        let slug = category.as_str();
        Self {
            id: slug.to_string(),
            title: category.title().to_string(),
            image: format!("/images/categories/{slug}.jpg"),
            link: format!("/catalog?categories={slug}"),
            category,
        }
    }
}

use crate::domain::products::product::Product;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartItem {
    pub user_id: i64,
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, Clone)]
pub struct CartLine {
    pub item: CartItem,
    pub product: Product,
}

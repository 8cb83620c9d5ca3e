use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::products::product::Product;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    Created,
    Delivery,
    Closed,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Created => "created",
            OrderStatus::Delivery => "delivery",
            OrderStatus::Closed => "closed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "created" => Some(OrderStatus::Created),
            "delivery" => Some(OrderStatus::Delivery),
            "closed" => Some(OrderStatus::Closed),
            _ => None,
        }
    }

    /// created -> delivery -> closed, created -> closed. Re-applying the current status is allowed.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Created, Created)
                | (Created, Delivery)
                | (Created, Closed)
                | (Delivery, Delivery)
                | (Delivery, Closed)
                | (Closed, Closed)
        )
    }
}

#[derive(Debug, Clone)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub status: OrderStatus,
    pub payment_confirmed: bool,
    pub payment_id: Option<String>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct OrderItem {
    pub id: i64,
    pub order_id: i64,
    pub product_id: i64,
    pub quantity: i32,
    pub price: Decimal,
}

#[derive(Debug, Clone)]
pub struct OrderItemDetails {
    pub item: OrderItem,
    pub product: Product,
}

#[derive(Debug, Clone)]
pub struct OrderDetails {
    pub order: Order,
    pub items: Vec<OrderItemDetails>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderLine {
    pub product_id: i64,
    pub quantity: i32,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum OrderLineError {
    #[error("order has no items")]
    Empty,
    #[error("quantity for product {0} must be at least 1")]
    InvalidQuantity(i64),
    #[error("quantity for product {0} is too large")]
    QuantityOverflow(i64),
}

/// Merges repeated products into one line each, ordered by product id so rows
/// are always locked in the same order. Every merged quantity is positive.
pub fn merge_lines(lines: &[OrderLine]) -> Result<Vec<OrderLine>, OrderLineError> {
    if lines.is_empty() {
        return Err(OrderLineError::Empty);
    }
    let mut merged: BTreeMap<i64, i32> = BTreeMap::new();
    for line in lines {
        if line.quantity < 1 {
            return Err(OrderLineError::InvalidQuantity(line.product_id));
        }
        let quantity = merged.entry(line.product_id).or_default();
        *quantity = quantity
            .checked_add(line.quantity)
            .ok_or(OrderLineError::QuantityOverflow(line.product_id))?;
    }
    Ok(merged
        .into_iter()
        .map(|(product_id, quantity)| OrderLine {
            product_id,
            quantity,
        })
        .collect())
}

/// Result of placing an order inside one transaction.
#[derive(Debug, Clone)]
pub enum PlaceOrderOutcome {
    Placed {
        order: Order,
        items: Vec<OrderItem>,
    },
    ProductMissing(i64),
    OutOfStock {
        product_id: i64,
        requested: i32,
        available: i32,
    },
    /// The total does not fit the order's money column.
    TotalTooLarge,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_machine_only_moves_forward() {
        use OrderStatus::*;
        assert!(Created.can_transition_to(Delivery));
        assert!(Created.can_transition_to(Closed));
        assert!(Delivery.can_transition_to(Closed));
        assert!(Closed.can_transition_to(Closed));
        assert!(!Delivery.can_transition_to(Created));
        assert!(!Closed.can_transition_to(Delivery));
        assert!(!Closed.can_transition_to(Created));
    }

    #[test]
    fn status_parses_wire_names() {
        assert_eq!(OrderStatus::parse("delivery"), Some(OrderStatus::Delivery));
        assert_eq!(OrderStatus::parse("shipped"), None);
    }

    #[test]
    fn duplicate_products_are_merged_in_id_order() {
        let merged = merge_lines(&[
            OrderLine {
                product_id: 9,
                quantity: 1,
            },
            OrderLine {
                product_id: 2,
                quantity: 3,
            },
            OrderLine {
                product_id: 9,
                quantity: 2,
            },
        ])
        .unwrap();
        assert_eq!(
            merged,
            vec![
                OrderLine {
                    product_id: 2,
                    quantity: 3
                },
                OrderLine {
                    product_id: 9,
                    quantity: 3
                },
            ]
        );
    }

    #[test]
    fn merging_rejects_bad_quantities() {
        let line = |product_id, quantity| OrderLine {
            product_id,
            quantity,
        };
        assert_eq!(merge_lines(&[]), Err(OrderLineError::Empty));
        assert_eq!(
            merge_lines(&[line(1, 2), line(4, 0)]),
            Err(OrderLineError::InvalidQuantity(4))
        );
        assert_eq!(
            merge_lines(&[line(1, -5)]),
            Err(OrderLineError::InvalidQuantity(1))
        );
        assert_eq!(
            merge_lines(&[line(1, i32::MAX), line(1, 2)]),
            Err(OrderLineError::QuantityOverflow(1))
        );
        assert_eq!(
            merge_lines(&[line(3, i32::MAX)]),
            Ok(vec![line(3, i32::MAX)])
        );
    }
}

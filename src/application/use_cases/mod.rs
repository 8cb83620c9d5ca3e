pub mod businesses;
pub mod cart;
pub mod orders;
pub mod payments;
pub mod products;
pub mod users;

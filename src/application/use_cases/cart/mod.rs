pub mod add_to_cart;
pub mod get_cart;
pub mod remove_from_cart;
pub mod set_quantities;

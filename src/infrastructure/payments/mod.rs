pub mod yookassa;

pub use yookassa::YookassaGateway;

pub mod dadata;

pub use dadata::DadataRegistry;

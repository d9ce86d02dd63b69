//! Domain module - products, the deduplicated product store and the discount counter
//!
//! Everything here is synchronous and free of I/O; the application layer
//! applies these types atomically from its polling tasks.

pub mod discount_counter;
pub mod product;
pub mod product_store;

pub use discount_counter::DiscountCounter;
pub use product::{Product, ProductForm};
pub use product_store::ProductStore;

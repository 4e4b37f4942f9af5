pub mod catalog;
pub mod groceries;
pub mod transactions;

pub use catalog::{Category, CategoryPatch, NewCategory, NewProduct, NewSizeType, Product, ProductPatch, SizeType, SizeTypePatch};
pub use groceries::{NewOperational, Operational, OperationalPatch, OPERATIONAL_DAYS};
pub use transactions::{CartLine, CartLinePatch, Checkout, CheckoutPatch, NewCartLine, Order, OrderPatch, PricedLine};

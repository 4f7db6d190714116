//! Products domain module.
//!
//! This crate contains the rules for produce listings, implemented purely as
//! deterministic domain logic (no IO, no HTTP, no storage).

pub mod product;

pub use product::{
    GeoPoint, HARVEST_DATE_FORMAT, ListingInput, NewProduct, Product, ProductDetails, ProductUpdate,
    parse_harvest_date,
};

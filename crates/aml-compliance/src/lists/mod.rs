pub mod static_set;

pub use static_set::{StaticAddressSet, StaticCountrySet};

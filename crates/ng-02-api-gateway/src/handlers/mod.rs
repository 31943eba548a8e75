//! HTTP handlers, grouped by route family.

pub mod info;
pub mod lifecycle;
pub mod proxy;
pub mod settings;

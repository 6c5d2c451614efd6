// Library-only: the builder state container has no HTTP route.
#[allow(dead_code)]
pub mod builder;
pub mod models;
pub mod transform;
pub mod validation;

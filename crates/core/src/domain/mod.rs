pub mod advisor;
pub mod client;
pub mod draft;
pub mod product;

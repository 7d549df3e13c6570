pub mod collector;
pub mod opensearch;

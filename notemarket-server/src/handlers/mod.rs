pub mod catalog_query;
pub mod documents;
pub mod files;
pub mod me;
pub mod statistics;

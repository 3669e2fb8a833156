//! Repository ports (interfaces) grouped by aggregate.

pub mod documents;
pub mod profiles;

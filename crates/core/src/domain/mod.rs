pub mod project;
pub mod quote;

pub mod fetch;
pub mod scan;

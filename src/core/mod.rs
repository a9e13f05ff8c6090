pub mod driver;
pub mod extractor;
pub mod paths;
pub mod selector;

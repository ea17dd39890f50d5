pub mod campaign;
pub mod driver;
pub mod extract;
pub mod flags;
pub mod groups;
pub mod report;
pub mod types;

pub mod budget;
pub mod pending;
pub mod profile;
pub mod records;

pub mod emails;
pub mod tracking;

pub mod error;
pub mod import;
pub mod labels;
pub mod lead;
pub mod lead_category;
pub mod sequence;
pub mod user;
pub mod vehicle;

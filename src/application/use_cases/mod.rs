pub mod bulk_import;
pub mod lead;
pub mod lead_category;
pub mod lead_import;
pub mod sms;
pub mod user;
pub mod vehicle;
pub mod vehicle_import;

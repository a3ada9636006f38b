pub mod categories;
pub mod leads;
pub mod sessions;
pub mod users;
pub mod vehicles;

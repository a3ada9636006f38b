pub mod bootstrap;
pub mod config;
pub mod db;
pub mod security;
pub mod sms;
pub mod spreadsheet;
pub mod storage;

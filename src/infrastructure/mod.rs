pub mod db;
pub mod mail;
pub mod payments;
pub mod registry;
pub mod storage;

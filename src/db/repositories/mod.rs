pub mod account;
pub mod event_log;
pub mod facility;
pub mod profile;

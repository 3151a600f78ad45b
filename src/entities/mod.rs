pub mod prelude;

pub mod accounts;
pub mod event_logs;
pub mod facilities;
pub mod profiles;

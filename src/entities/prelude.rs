pub use super::accounts::Entity as Accounts;
pub use super::event_logs::Entity as EventLogs;
pub use super::facilities::Entity as Facilities;
pub use super::profiles::Entity as Profiles;

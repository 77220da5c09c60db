pub mod access;
pub mod auth;
pub mod notifier;
pub mod users;
pub mod vacation;

pub use access::Actor;
pub use auth::{AuthService, Claims};
pub use notifier::Notifier;
pub use users::UserService;
pub use vacation::VacationService;

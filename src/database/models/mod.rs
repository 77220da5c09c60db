pub mod auth;
pub mod macros;
pub mod notification;
pub mod page;
pub mod user;
pub mod vacation_request;

// Re-export all models for easy importing
pub use auth::*;
pub use notification::*;
pub use page::*;
pub use user::*;
pub use vacation_request::*;

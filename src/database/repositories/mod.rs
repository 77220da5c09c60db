pub mod notification;
pub mod user;
pub mod vacation_request;

// Re-export all repositories for easy importing
pub use notification::NotificationRepository;
pub use user::UserRepository;
pub use vacation_request::VacationRequestRepository;

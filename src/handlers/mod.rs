pub mod auth;
pub mod manager;
pub mod notifications;
pub mod shared;
pub mod users;
pub mod vacation_requests;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod vacation;

use std::sync::Arc;

pub use config::Config;
pub use database::Stores;
pub use error::AppError;
pub use services::{AuthService, Notifier, UserService, VacationService};

use database::store::NotificationStore;
use vacation::Clock;

pub struct AppState {
    pub auth_service: AuthService,
    pub vacation_service: VacationService,
    pub user_service: UserService,
    pub notifications: Arc<dyn NotificationStore>,
}

impl AppState {
    pub fn new(config: &Config, stores: Stores) -> Self {
        let notifier = Notifier::new(stores.notifications.clone());

        Self {
            auth_service: AuthService::new(stores.users.clone(), config.clone()),
            vacation_service: VacationService::new(
                stores.users.clone(),
                stores.requests.clone(),
                notifier,
                config.vacation,
            ),
            user_service: UserService::new(stores.users, config.bcrypt_cost),
            notifications: stores.notifications,
        }
    }

    /// Replaces the wall clock, e.g. to pin "today" in tests.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.vacation_service = self.vacation_service.with_clock(clock);
        self
    }
}

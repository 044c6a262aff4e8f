use std::sync::Arc;

use crate::config::Settings;
use crate::push::PushNotificationService;

#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub push: Arc<PushNotificationService>,
}

impl AppState {
    pub fn new(settings: Settings, push: PushNotificationService) -> Self {
        Self {
            settings: Arc::new(settings),
            push: Arc::new(push),
        }
    }
}

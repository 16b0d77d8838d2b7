// Application state for HTTP handlers
use crate::application::account_service::AccountService;
use crate::application::checkout_service::CheckoutService;
use crate::application::deploy_service::DeployService;
use crate::application::instance_service::InstanceService;
use crate::application::monitoring_service::MonitoringService;
use crate::application::session_service::SessionService;
use crate::application::session_store::SessionStorage;
use crate::infrastructure::config::ConsoleConfig;
use crate::infrastructure::mock_data;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

#[derive(Clone)]
pub struct AppState {
    pub session: SessionService,
    pub monitoring: MonitoringService,
    pub instances: InstanceService,
    pub accounts: AccountService,
    pub deploy: DeployService,
    pub checkout: CheckoutService,
}

impl AppState {
    /// Wire every service from configuration, seeding the mock collections
    pub fn from_config(config: &ConsoleConfig, storage: Arc<dyn SessionStorage>) -> Self {
        let now = Utc::now();
        let delays = &config.delays;

        let session = SessionService::new(storage, config.session_settings());
        let monitoring = MonitoringService::new(config.monitoring_settings());
        let instances = InstanceService::new(
            mock_data::gpu_catalog(),
            mock_data::instances(now),
            Duration::from_millis(delays.boot_ms),
        );
        let accounts = AccountService::new(mock_data::ssh_keys(now), mock_data::transactions(now));
        let deploy = DeployService::new(
            instances.clone(),
            accounts.clone(),
            Duration::from_millis(delays.deploy_ms),
        );
        let checkout = CheckoutService::new(
            session.clone(),
            accounts.clone(),
            config.payment.clone(),
            Duration::from_millis(delays.payment_ms),
        );

        Self {
            session,
            monitoring,
            instances,
            accounts,
            deploy,
            checkout,
        }
    }
}

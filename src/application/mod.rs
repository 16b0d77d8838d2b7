// Application layer - Services owning state, delays and the storage port
pub mod account_service;
pub mod checkout_service;
pub mod deploy_service;
pub mod instance_service;
pub mod monitoring_service;
pub mod session_service;
pub mod session_store;
pub mod wizard_registry;

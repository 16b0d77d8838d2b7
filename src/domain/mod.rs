// Domain layer - Plain data types and pure logic
pub mod catalog;
pub mod checkout;
pub mod deploy;
pub mod metrics;
pub mod payment;
pub mod user;
pub mod wizard;

pub mod error;
pub mod id;
pub mod notifier;
pub mod outcome;
pub mod provider;
pub mod request;
pub mod transaction;

pub mod metrics;
pub mod providers;

pub use providers::{GenerativeProvider, ProviderError};

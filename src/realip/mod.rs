pub mod resolver;
pub mod trust;

pub use resolver::{HeaderNames, IpSource, Resolution, Resolver, DEFAULT_MAX_CHAIN_ENTRIES};
pub use trust::TrustSet;

pub mod client_ip;
pub mod real_ip;

pub use client_ip::ClientIp;
pub use real_ip::{RealIpLayer, RealIpService};

pub mod http;

pub use http::HeaderMapExt;

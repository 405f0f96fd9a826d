pub mod http;

pub use http::HttpScoreSink;

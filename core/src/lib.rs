//! Run-request dispatch and the streaming score tap.
//!
//! A request body goes through [`request::validate_request`], is routed by
//! [`dispatcher::Dispatcher`] to an external [`handler::ExecutionHandler`], and
//! the result is reshaped into a [`types::WireResponse`]. Dataset-run streams
//! are wrapped by [`tap::tap_stream`], which forwards every byte untouched
//! while extracting eval scores for a [`score::ScoreSink`].

pub mod api;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod request;
pub mod score;
pub mod shaper;
pub mod tap;
pub mod types;

pub mod client;
pub mod error;
pub mod protocol;

pub use client::ReportClient;
pub use error::ClientError;

pub mod client;

pub use client::{HttpTransport, ACCOUNT_HEADER};

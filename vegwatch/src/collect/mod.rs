pub mod client;
pub mod global_variables;
pub mod request;
pub mod response;
pub mod sentinel;

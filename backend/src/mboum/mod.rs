pub mod client;
pub mod errors;

pub use client::MboumClient;
pub use errors::MboumError;

pub mod algorithm;
pub mod claims;
mod codec;
pub mod encoder;
pub mod header;
pub mod jwt;
pub mod validator;

pub use k256;

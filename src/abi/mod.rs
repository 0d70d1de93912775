pub mod etherscan;
pub mod local;
pub mod model;
pub mod source;

pub use model::AbiModel;

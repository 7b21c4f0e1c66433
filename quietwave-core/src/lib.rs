pub mod analysis;
pub mod decode;
pub mod error;
pub mod intake;
pub mod reveal;
pub mod spectrum;
pub mod transport;
pub mod workspace;

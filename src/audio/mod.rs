pub mod export;
pub mod gateway;
pub mod loader;
pub mod media_graph;
pub mod resource;
pub mod upload;

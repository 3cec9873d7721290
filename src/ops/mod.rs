pub mod transport;
pub mod visualizer;

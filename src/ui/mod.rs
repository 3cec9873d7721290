pub mod app;
pub mod ticker;
pub mod visualizer_widget;

pub mod app;
pub mod audio_controls;
pub mod comparison;
pub mod drag_capture;
pub mod file_uploader;
pub mod header;
pub mod spectrum;
pub mod statistics;
pub mod toasts;

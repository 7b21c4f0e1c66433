pub mod spectrum_renderer;

pub mod frame_store;
pub mod scrub_renderer;

pub mod app;
pub mod carousel;
pub mod player_bar;
pub mod scrub_view;

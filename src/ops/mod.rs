pub mod cover_fit;
pub mod docking;
pub mod presentation;
pub mod visibility;

pub mod docking;
pub mod experience;
pub mod playback_state;
pub mod playlist;
pub mod track;

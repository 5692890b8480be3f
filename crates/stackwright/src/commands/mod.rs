pub mod down;
pub mod graph;
pub mod preview;
pub mod render;
pub mod up;
pub mod validate;

pub mod compose;
pub mod dirty;
pub mod gamepad;
pub mod grid;
pub mod input;
pub mod renderer;

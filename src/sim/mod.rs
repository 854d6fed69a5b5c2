pub mod event;
pub mod frame;
pub mod input;
pub mod level;
pub mod motion;
pub mod world;

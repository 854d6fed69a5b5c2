pub mod entity;
pub mod geometry;
pub mod glyph;
pub mod level;
pub mod physics;

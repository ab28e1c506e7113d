pub mod label;
pub mod line;
pub mod rectangle;

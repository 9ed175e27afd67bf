pub mod check;
pub mod data;
pub mod render;

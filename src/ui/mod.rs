pub mod panels;
pub mod plot;
pub mod render;
pub mod table;

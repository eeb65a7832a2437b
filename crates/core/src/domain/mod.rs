pub mod preferences;
pub mod recommendation;
pub mod series;
pub mod stock;

pub mod forecast;
pub mod indicators;
pub mod piotroski;

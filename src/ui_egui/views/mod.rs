pub mod overlap;
pub mod palette;
pub mod time_grid;

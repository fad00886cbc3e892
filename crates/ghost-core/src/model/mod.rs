pub mod bearing;
pub mod grid;
pub mod observation;
pub mod proximity;

pub mod census;
pub mod fisu;

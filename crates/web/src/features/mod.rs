pub mod athletes;
pub mod pdf;

pub mod ml;
pub mod vitals;

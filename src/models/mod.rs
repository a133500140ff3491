pub mod patch;
pub mod trip;

pub mod epoch;
pub mod params;
pub mod status;
pub mod submission;

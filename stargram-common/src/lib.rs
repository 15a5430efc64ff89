pub mod model;
pub mod tags;
pub mod unique_id;

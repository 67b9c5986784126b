pub mod building;
pub mod building_id;

pub use building::{Building, CollisionQuery, NewBuilding, DEFAULT_COLLISION_DISTANCE};
pub use building_id::generate_building_id;

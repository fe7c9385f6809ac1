//! kinegrid: tick-driven AABB physics over a uniform spatial hash

pub mod types;
pub mod error;
pub mod vector;
pub mod config;
pub mod api;
pub mod entity;
pub mod grid;
pub mod zone;
pub mod partition;
pub mod aabb;
pub mod transform;
pub mod narrowphase;
pub mod world;

pub use crate::types::*;
pub use crate::error::*;
pub use crate::config::*;
pub use crate::api::*;
pub use crate::entity::{EntityStore, EntityTable};
pub use crate::partition::Partition;
pub use crate::world::PhysicsWorld;

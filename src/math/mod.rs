//! Mathematical utilities and data structures

pub mod aabb;
pub mod sphere;

pub use aabb::Aabb;
pub use sphere::Sphere;

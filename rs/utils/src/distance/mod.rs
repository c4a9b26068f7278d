pub mod l2;
pub mod minkowski;

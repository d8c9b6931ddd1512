pub mod activity;
pub mod auth;
pub mod expense;
pub mod memory;
pub mod packing;
pub mod seed;
pub mod statistics;
pub mod system;
pub mod trip;

pub mod activities;
pub mod expenses;
pub mod memories;
pub mod ordering;
pub mod packing;
pub mod seed;
pub mod statistics;
pub mod trips;
pub mod users;

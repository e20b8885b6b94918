pub mod activity;
pub mod workout;

pub mod api;
pub mod controller;
pub mod types;
pub mod view;

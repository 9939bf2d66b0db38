pub mod admin;
pub mod api;
pub mod pages;
pub mod public;
pub mod system;

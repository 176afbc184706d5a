pub mod admin;
pub mod auth;
pub mod reservations;
pub mod rooms;
pub mod users;

//! Data models for catalogue entities, accounts and reservations

pub mod author;
pub mod publisher;
pub mod reservation;
pub mod title;
pub mod user;

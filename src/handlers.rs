// src/handlers.rs

pub mod admin;
pub mod auth;
pub mod catalog;
pub mod check_ins;
pub mod clubs;
pub mod events;
pub mod memberships;
pub mod notifications;
pub mod payments;
pub mod service_purchases;
pub mod trainer_requests;
pub mod trainers;

pub mod auth;
pub mod catalog;
pub mod check_in;
pub mod club;
pub mod counters;
pub mod event;
pub mod membership;
pub mod notification;
pub mod payment;
pub mod service_purchase;
pub mod trainer;
pub mod trainer_request;

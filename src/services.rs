pub mod auth;
pub mod catalog_service;
pub mod check_in_service;
pub mod club_service;
pub mod event_service;
pub mod membership_service;
pub mod notification_service;
pub mod payment_service;
pub mod service_purchase_service;
pub mod trainer_request_service;
pub mod trainer_service;

#[cfg(test)]
mod db_tests;

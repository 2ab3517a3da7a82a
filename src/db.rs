pub mod user_repo;
pub use user_repo::UserRepository;
pub mod catalog_repo;
pub use catalog_repo::CatalogRepository;
pub mod club_repo;
pub use club_repo::ClubRepository;
pub mod counter_repo;
pub use counter_repo::CounterRepository;
pub mod membership_repo;
pub use membership_repo::MembershipRepository;
pub mod trainer_repo;
pub use trainer_repo::TrainerRepository;
pub mod trainer_request_repo;
pub use trainer_request_repo::TrainerRequestRepository;
pub mod service_purchase_repo;
pub use service_purchase_repo::ServicePurchaseRepository;
pub mod check_in_repo;
pub use check_in_repo::CheckInRepository;
pub mod event_repo;
pub use event_repo::EventRepository;
pub mod payment_repo;
pub use payment_repo::PaymentRepository;
pub mod notification_repo;
pub use notification_repo::NotificationRepository;

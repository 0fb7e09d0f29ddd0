pub mod professional_area_repo;
pub mod service_request_repo;
pub mod subscription_repo;
pub mod unlock_repo;
pub mod user_repo;

pub use professional_area_repo::ProfessionalAreaRepo;
pub use service_request_repo::ServiceRequestRepo;
pub use subscription_repo::SubscriptionRepo;
pub use unlock_repo::UnlockRepo;
pub use user_repo::UserRepo;

pub mod use_cases;

pub use use_cases::lead::LeadUseCase;
pub use use_cases::lead_category::LeadCategoryUseCase;
pub use use_cases::sms::SmsUseCase;
pub use use_cases::user::UserUseCase;
pub use use_cases::vehicle::VehicleUseCase;

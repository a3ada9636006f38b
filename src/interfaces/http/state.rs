use crate::application::{
    LeadCategoryUseCase, LeadUseCase, SmsUseCase, UserUseCase, VehicleUseCase,
};
use std::path::PathBuf;
use std::sync::Arc;

pub struct HttpState {
    pub leads: Arc<LeadUseCase>,
    pub categories: Arc<LeadCategoryUseCase>,
    pub vehicles: Arc<VehicleUseCase>,
    pub users: Arc<UserUseCase>,
    pub sms: Arc<SmsUseCase>,
    pub uploads: UploadSettings,
}

#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_file_size_bytes: usize,
}

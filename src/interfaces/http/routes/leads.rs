use crate::domain::error::AppError;
use crate::domain::lead::{
    BulkCategoryUpdate, DashboardQuery, LeadFilters, LeadInput, LeadPatch, LeadUpdateOutcome,
    SmsRequest,
};
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::response;
use crate::interfaces::http::state::HttpState;
use crate::interfaces::http::uploads::{read_upload, UploadForm};
use actix_multipart::form::MultipartForm;
use actix_web::{delete, get, patch, post, put, web, HttpResponse};

#[post("/addlead")]
pub async fn create_lead(
    data: web::Data<HttpState>,
    current: CurrentUser,
    req: web::Json<LeadInput>,
) -> Result<HttpResponse, AppError> {
    let lead = data.leads.create_lead(req.into_inner(), &current.user).await?;
    Ok(response::created("Lead created successfully", lead))
}

#[get("/leads")]
pub async fn list_leads(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    query: web::Query<LeadFilters>,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.leads.list_leads(query.into_inner()).await?))
}

#[patch("/leads/bulk-update")]
pub async fn bulk_update_categories(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    req: web::Json<BulkCategoryUpdate>,
) -> Result<HttpResponse, AppError> {
    let result = data.leads.bulk_update_categories(req.into_inner()).await?;
    Ok(response::ok(result))
}

#[get("/leads/{id}")]
pub async fn get_lead(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.leads.get_lead(path.into_inner()).await?))
}

#[put("/leads/{id}")]
pub async fn update_lead(
    data: web::Data<HttpState>,
    current: CurrentUser,
    path: web::Path<i64>,
    req: web::Json<LeadPatch>,
) -> Result<HttpResponse, AppError> {
    let outcome = data
        .leads
        .update_lead(path.into_inner(), req.into_inner(), Some(&current.user))
        .await?;
    Ok(match outcome {
        LeadUpdateOutcome::Updated(lead) => {
            response::ok_with_message("Lead updated successfully", lead)
        }
        LeadUpdateOutcome::Unchanged { message } => response::message_only(message),
    })
}

#[delete("/leads/{id}")]
pub async fn delete_lead(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let lead = data.leads.delete_lead(path.into_inner()).await?;
    Ok(response::ok_with_message("Lead deleted successfully", lead))
}

/// Accepts an empty body as an unbounded range.
#[post("/leaddashboard")]
pub async fn dashboard(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    req: Option<web::Json<DashboardQuery>>,
) -> Result<HttpResponse, AppError> {
    let query = req.map(web::Json::into_inner).unwrap_or_default();
    Ok(response::ok(data.leads.dashboard(query).await?))
}

#[post("/lead/bulkupload")]
pub async fn bulk_upload(
    data: web::Data<HttpState>,
    current: CurrentUser,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, AppError> {
    let rows = read_upload(form, &data.uploads).await?;
    let report = data.leads.import_leads(rows, &current.user).await?;
    Ok(response::ok_with_message("Lead upload processed", report))
}

#[post("/leads/{id}/sms")]
pub async fn send_sms(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
    req: web::Json<SmsRequest>,
) -> Result<HttpResponse, AppError> {
    let receipt = data
        .sms
        .send_to_lead(path.into_inner(), req.into_inner())
        .await?;
    Ok(response::created("SMS sent successfully", receipt))
}

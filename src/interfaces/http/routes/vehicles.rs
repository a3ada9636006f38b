use crate::domain::error::AppError;
use crate::domain::vehicle::VehicleInput;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::response;
use crate::interfaces::http::state::HttpState;
use crate::interfaces::http::uploads::{read_upload, UploadForm};
use actix_multipart::form::MultipartForm;
use actix_web::{delete, get, post, put, web, HttpResponse};

#[post("/vehicles/add")]
pub async fn create_vehicle(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    req: web::Json<VehicleInput>,
) -> Result<HttpResponse, AppError> {
    let vehicle = data.vehicles.create_vehicle(req.into_inner()).await?;
    Ok(response::created("Vehicle added successfully", vehicle))
}

#[post("/vehicle-bulkupload")]
pub async fn bulk_upload(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    MultipartForm(form): MultipartForm<UploadForm>,
) -> Result<HttpResponse, AppError> {
    let rows = read_upload(form, &data.uploads).await?;
    let report = data.vehicles.import_vehicles(rows).await?;
    Ok(response::ok_with_message("Vehicle upload processed", report))
}

#[get("/vehicles")]
pub async fn list_vehicles(
    data: web::Data<HttpState>,
    _user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.vehicles.list_vehicles().await?))
}

#[get("/vehicles/{id}")]
pub async fn get_vehicle(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.vehicles.get_vehicle(path.into_inner()).await?))
}

#[put("/vehicles/{id}")]
pub async fn update_vehicle(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
    req: web::Json<VehicleInput>,
) -> Result<HttpResponse, AppError> {
    let vehicle = data
        .vehicles
        .update_vehicle(path.into_inner(), req.into_inner())
        .await?;
    Ok(response::ok_with_message("Vehicle updated successfully", vehicle))
}

#[delete("/vehicles/{id}")]
pub async fn delete_vehicle(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    data.vehicles.delete_vehicle(path.into_inner()).await?;
    Ok(response::message_only("Vehicle deleted successfully"))
}

#[get("/models")]
pub async fn unique_models(
    data: web::Data<HttpState>,
    _user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.vehicles.unique_models().await?))
}

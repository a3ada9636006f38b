use crate::domain::error::AppError;
use crate::domain::lead_category::LeadCategoryInput;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::response;
use crate::interfaces::http::state::HttpState;
use actix_web::{delete, get, post, put, web, HttpResponse};

#[post("/leadcategory/add")]
pub async fn create_category(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    req: web::Json<LeadCategoryInput>,
) -> Result<HttpResponse, AppError> {
    let category = data.categories.create_category(req.into_inner()).await?;
    Ok(response::created("Lead category created", category))
}

#[get("/leadcategory")]
pub async fn list_categories(
    data: web::Data<HttpState>,
    _user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.categories.list_categories().await?))
}

#[get("/leadcategory/{id}")]
pub async fn get_category(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(
        data.categories.get_category(path.into_inner()).await?,
    ))
}

#[put("/updatecategory/{id}")]
pub async fn update_category(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
    req: web::Json<LeadCategoryInput>,
) -> Result<HttpResponse, AppError> {
    let category = data
        .categories
        .update_category(path.into_inner(), req.into_inner())
        .await?;
    Ok(response::ok_with_message("Lead category updated", category))
}

#[delete("/leadcategory/{id}")]
pub async fn delete_category(
    data: web::Data<HttpState>,
    _user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    data.categories.delete_category(path.into_inner()).await?;
    Ok(response::message_only("Lead category deleted"))
}

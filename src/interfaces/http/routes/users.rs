use crate::domain::error::AppError;
use crate::domain::user::{NewUserInput, UserPatch};
use crate::interfaces::http::auth::AdminUser;
use crate::interfaces::http::response;
use crate::interfaces::http::state::HttpState;
use actix_web::{delete, get, post, web, HttpResponse};

#[get("/user")]
pub async fn list_users(
    data: web::Data<HttpState>,
    _admin: AdminUser,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.users.list_users().await?))
}

#[post("/user")]
pub async fn create_user(
    data: web::Data<HttpState>,
    _admin: AdminUser,
    req: web::Json<NewUserInput>,
) -> Result<HttpResponse, AppError> {
    let user = data.users.create_user(req.into_inner()).await?;
    Ok(response::created("User created", user))
}

#[get("/user/{id}")]
pub async fn get_user(
    data: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    Ok(response::ok(data.users.get_user(path.into_inner()).await?))
}

#[post("/user/{id}")]
pub async fn update_user(
    data: web::Data<HttpState>,
    _admin: AdminUser,
    path: web::Path<i64>,
    req: web::Json<UserPatch>,
) -> Result<HttpResponse, AppError> {
    let user = data
        .users
        .update_user(path.into_inner(), req.into_inner())
        .await?;
    Ok(response::ok_with_message("User updated", user))
}

#[delete("/user/{id}")]
pub async fn delete_user(
    data: web::Data<HttpState>,
    AdminUser(admin): AdminUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    data.users.delete_user(path.into_inner(), &admin).await?;
    Ok(response::message_only("User deleted"))
}

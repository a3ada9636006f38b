use crate::domain::error::AppError;
use crate::domain::user::LoginRequest;
use crate::interfaces::http::auth::CurrentUser;
use crate::interfaces::http::response;
use crate::interfaces::http::state::HttpState;
use actix_web::{get, post, web, HttpResponse};

#[post("/loginUser")]
pub async fn login(
    data: web::Data<HttpState>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let session = data.users.login(req.into_inner()).await?;
    Ok(response::ok_with_message("Login successful", session))
}

#[get("/current")]
pub async fn current_user(current: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(response::ok(current.user))
}

#[post("/logout")]
pub async fn logout(
    data: web::Data<HttpState>,
    current: CurrentUser,
) -> Result<HttpResponse, AppError> {
    data.users.logout(&current.token).await?;
    Ok(response::message_only("Logged out"))
}

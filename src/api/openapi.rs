//! OpenAPI documentation served through Swagger UI.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    admin_handler, auth_handler, password_handler, user_handler, withdrawal_handler,
};
use crate::domain::{
    AdminUpdate, ProfileUpdate, RegisterUser, TransactionKind, TransactionResponse, UserResponse,
    UserRole,
};
use crate::services::TokenResponse;
use crate::types::MessageResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "CoinBlazers API",
        version = "0.1.0",
        description = "Accounts, withdrawals and password recovery for CoinBlazers"
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        auth_handler::register,
        auth_handler::login,
        password_handler::forgot_password,
        password_handler::validate_reset_token,
        password_handler::reset_password,
        user_handler::get_profile,
        user_handler::update_profile,
        user_handler::delete_profile,
        user_handler::list_transactions,
        admin_handler::list_users,
        admin_handler::update_user,
        withdrawal_handler::withdraw,
    ),
    components(
        schemas(
            UserRole,
            UserResponse,
            RegisterUser,
            ProfileUpdate,
            AdminUpdate,
            TransactionKind,
            TransactionResponse,
            TokenResponse,
            MessageResponse,
            auth_handler::LoginRequest,
            auth_handler::AuthResponse,
            password_handler::ForgotPasswordRequest,
            password_handler::ResetPasswordRequest,
            password_handler::ResetTokenStatus,
            withdrawal_handler::WithdrawRequest,
            withdrawal_handler::WithdrawResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration and login"),
        (name = "Password reset", description = "Emailed single-use reset links"),
        (name = "Profile", description = "Self-service account operations"),
        (name = "Withdrawals", description = "Debit an account balance"),
        (name = "Admin", description = "Operator account management")
    )
)]
pub struct ApiDoc;

/// Registers the JWT bearer scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT token returned by /users/login"))
                        .build(),
                ),
            );
        }
    }
}

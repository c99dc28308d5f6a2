//! Account registration and token handling

use axum::Extension;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::password::hash;
use crate::password::verify;
use crate::storage::CreateUserValues;
use crate::storage::Storage;
use crate::users::User;
use crate::validation;
use crate::validation::Violations;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::JwtKeys;
use super::Success;
use super::current_user::Token;
use super::current_user::generate_token;

/// The user response information
///
/// A subset of all the information, ready to be serialized for the outside world
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// The user ID
    pub id: Uuid,

    /// The username
    pub username: String,
}

impl UserResponse {
    /// Create a user response from a [`User`](User)
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
        }
    }
}

/// Registration form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    /// Username of the new user
    username: String,

    /// Password of the new user
    password: String,
}

/// Register a new account
///
/// Responds with a token for the fresh account, ready to be used in the
/// `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "sam", "password": "verysecret" }' \
///     http://localhost:5000/api/auth/register
/// ```
///
/// Response
/// ```json
/// { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" }
/// ```
pub async fn register<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<RegisterForm>,
) -> Result<Success<Token>, Error> {
    let username = form.username.trim();

    let mut violations = Violations::new();
    validation::check_username(&mut violations, username);
    validation::check_password(&mut violations, &form.password);

    if !violations.is_empty() {
        return Err(Error::validation(violations));
    }

    let existing = storage.find_single_user_by_username(username).await?;

    if existing.is_some() {
        return Err(Error::bad_request("Username is already taken"));
    }

    let hashed_password = hash(&form.password);

    let values = CreateUserValues {
        session_id: &Uuid::new_v4(),
        username,
        hashed_password: &hashed_password,
    };

    let user = storage.create_user(&values).await?;

    let token = generate_token(&jwt_keys, &user)?;

    Ok(Success::created(token))
}

/// Login form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    /// Username of the user
    username: String,

    /// Password of the user
    password: String,
}

/// Get a token for a user "session"
///
/// The token can then be used to access the rest of the API routes by using
/// it in the `Authorization` header
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -d '{ "username": "sam", "password": "verysecret" }' \
///     http://localhost:5000/api/auth/login
/// ```
///
/// Response
/// ```json
/// { "token_type": "Bearer", "expires_in": 3600, "access_token": "some token" }
/// ```
pub async fn login<S: Storage>(
    Extension(jwt_keys): Extension<JwtKeys>,
    Extension(storage): Extension<S>,
    Form(form): Form<LoginForm>,
) -> Result<Success<Token>, Error> {
    let user = storage
        .find_single_user_by_username(form.username.trim())
        .await?;

    // same response for an unknown user and a wrong password
    if let Some(user) = user {
        if verify(&user.hashed_password, &form.password) {
            let token = generate_token(&jwt_keys, &user)?;

            return Ok(Success::ok(token));
        }
    }

    Err(Error::bad_request("Invalid credentials"))
}

/// Get the current user
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:5000/api/auth/me
/// ```
///
/// Response:
/// ```json
/// { "id": "<uuid>", "username": "sam" }
/// ```
pub async fn me<S: Storage>(current_user: CurrentUser<S>) -> Success<UserResponse> {
    Success::ok(UserResponse::from_user(&current_user))
}

use serde::Deserialize;

/// Request body for `POST /users`. Every field is optional at the wire level
/// so missing ones are reported through the error envelope.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /users/:id`. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

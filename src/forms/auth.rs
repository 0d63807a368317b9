use serde::Deserialize;
use validator::Validate;

use crate::dto::auth::LoginRequest;
use crate::forms::FormError;

#[derive(Debug, Deserialize, Validate)]
/// Credentials entered on the admin login screen.
pub struct LoginForm {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

impl TryFrom<LoginForm> for LoginRequest {
    type Error = FormError;

    fn try_from(form: LoginForm) -> Result<Self, Self::Error> {
        let form = LoginForm {
            email: form.email.trim().to_lowercase(),
            password: form.password,
        };
        form.validate()?;
        Ok(Self {
            email: form.email,
            password: form.password,
        })
    }
}

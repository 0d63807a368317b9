//! Error conversion glue between layers.
//!
//! The domain and form layers must not depend on service error types, so the
//! conversions live here.

use validator::ValidationErrors;

use crate::domain::types::TypeConstraintError;
use crate::forms::FormError;
use crate::services::ServiceError;

impl From<TypeConstraintError> for ServiceError {
    fn from(val: TypeConstraintError) -> Self {
        ServiceError::TypeConstraint(val.to_string())
    }
}

impl From<FormError> for ServiceError {
    fn from(val: FormError) -> Self {
        match val {
            FormError::Constraint(err) => err.into(),
            FormError::Validation(err) => err.into(),
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(val: ValidationErrors) -> Self {
        ServiceError::Form(format!("Invalid form: {val}"))
    }
}

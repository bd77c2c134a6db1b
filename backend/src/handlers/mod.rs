//! HTTP handlers for the production tracker

mod batch;
mod estimation;
mod health;
mod history;
mod weather;

pub use batch::*;
pub use estimation::*;
pub use health::*;
pub use history::*;
pub use weather::*;

use serde::Deserialize;
use validator::Validate;

use crate::error::{AppError, AppResult};

/// Owner identity carried on list requests. A join key, not
/// authentication — sessions are handled outside the tracker.
#[derive(Debug, Deserialize, Validate)]
pub struct OwnerQuery {
    #[validate(email)]
    pub owner: String,
}

impl OwnerQuery {
    pub fn checked(self) -> AppResult<String> {
        self.validate().map_err(|_| AppError::Validation {
            field: "owner".to_string(),
            message: "Invalid email format".to_string(),
            message_id: "Alamat email tidak valid".to_string(),
        })?;
        Ok(self.owner)
    }
}

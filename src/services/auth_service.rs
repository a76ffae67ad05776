use crate::error::{AppError, AppResult};

/// 共享口令校验, 不签发任何会话或令牌
#[derive(Clone)]
pub struct AuthService {
    password: String,
}

impl AuthService {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    pub fn verify(&self, password: &str) -> AppResult<()> {
        if !self.password.is_empty() && password == self.password {
            Ok(())
        } else {
            Err(AppError::AuthError("Invalid password".to_string()))
        }
    }
}

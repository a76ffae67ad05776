use serde::Deserialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct AuthRequest {
    #[serde(default)]
    pub password: String,
}

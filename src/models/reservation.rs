use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 已预约的号码
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Reservation {
    pub number: u32,
    pub nickname: String,
}

/// 预约请求; 昵称为空表示释放该号码
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct ReserveRequest {
    pub number: Option<u32>,
    pub nickname: Option<String>,
}

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// 奖品库存
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PrizeCounter {
    pub prize: String,
    pub count: u32,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdatePrizeRequest {
    pub prize: Option<String>,
    /// 允许负数进入, 由服务层返回校验错误
    pub count: Option<i64>,
}

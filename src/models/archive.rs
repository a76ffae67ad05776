use serde::Deserialize;
use utoipa::ToSchema;

/// 将当前历史保存为归档; 文件名缺省为当天日期
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct SaveToLogRequest {
    pub filename: Option<String>,
}

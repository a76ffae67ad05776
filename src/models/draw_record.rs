use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

/// 一条开奖记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DrawRecord {
    /// 参考时区日期 (DD.MM.YYYY)
    pub date: String,
    /// 开奖号码 (1-100)
    pub number: u32,
    /// 中奖者, 未认领为空串
    #[serde(default)]
    pub name: String,
    /// 奖品, 未分配为空串
    #[serde(default)]
    pub prize: String,
    /// 参与者报的号码 (任意 JSON)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Object, nullable)]
    pub chosen_number: Option<Value>,
}

impl DrawRecord {
    pub fn new(date: impl Into<String>, number: u32) -> Self {
        Self {
            date: date.into(),
            number,
            name: String::new(),
            prize: String::new(),
            chosen_number: None,
        }
    }

    pub fn matches(&self, date: &str, number: u32) -> bool {
        self.date == date && self.number == number
    }
}

/// 手动补录开奖记录
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddHistoryRequest {
    pub date: Option<String>,
    pub number: Option<u32>,
    pub name: Option<String>,
    pub prize: Option<String>,
    #[schema(value_type = Object, nullable)]
    pub chosen_number: Option<Value>,
}

/// 按日期 + 号码定位一条记录
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct DeleteHistoryRequest {
    pub date: Option<String>,
    pub number: Option<u32>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateWinnerRequest {
    pub date: Option<String>,
    pub number: Option<u32>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct UpdateWinnerPrizeRequest {
    pub date: Option<String>,
    pub name: Option<String>,
    pub prize: Option<String>,
}

/// 更新奖品后返回最新历史
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HistoryResponse {
    pub success: bool,
    pub history: Vec<DrawRecord>,
}

/// 下一次开奖时间
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct NextDrawResponse {
    /// UTC (RFC 3339)
    pub next_draw: String,
    /// 参考时区 (RFC 3339)
    pub next_draw_local: String,
    /// 参考时区日期 (DD.MM.YYYY)
    pub date: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_legacy_record_without_prize() {
        let record: DrawRecord =
            serde_json::from_value(json!({"date": "02.01.2024", "number": 7, "name": ""})).unwrap();
        assert_eq!(record, DrawRecord::new("02.01.2024", 7));
    }

    #[test]
    fn test_chosen_number_is_camel_case_and_optional() {
        let mut record = DrawRecord::new("02.01.2024", 7);
        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("chosenNumber").is_none());

        record.chosen_number = Some(json!("13"));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["chosenNumber"], json!("13"));
    }
}

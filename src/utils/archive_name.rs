use regex::Regex;
use std::sync::OnceLock;

use crate::error::{AppError, AppResult};

fn archive_name_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,99}\.json$").expect("archive name regex")
    })
}

/// 校验归档文件名, 禁止路径分隔符和 `..`
pub fn validate_archive_name(name: &str) -> AppResult<()> {
    if name.contains("..") || !archive_name_regex().is_match(name) {
        return Err(AppError::ValidationError(format!(
            "Invalid log file name: {name}"
        )));
    }
    Ok(())
}

/// 补全 `.json` 后缀后再校验
pub fn normalize_archive_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    let name = if name.ends_with(".json") {
        name.to_string()
    } else {
        format!("{name}.json")
    };
    validate_archive_name(&name)?;
    Ok(name)
}

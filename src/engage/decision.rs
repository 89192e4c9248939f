//! Oracle 决策解析：不信任的外部输入
//!
//! 先剥掉可选的 ``` / ```json 包裹，再要求顶层是 JSON 数组；
//! 数组元素逐个按带标签的联合体解码，格式不对的元素单独丢弃，不影响同批其它元素。

use serde::Deserialize;
use serde_json::Value;

use crate::core::AgentError;

fn default_category() -> String {
    "general".to_string()
}

/// 单条动作决策（按 `action` 字段区分）
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum Decision {
    Comment {
        post_index: i64,
        comment: String,
    },
    Upvote {
        post_index: i64,
    },
    Post {
        #[serde(default = "default_category", alias = "category")]
        submolt: String,
        title: String,
        content: String,
    },
}

/// 去掉 Markdown 代码块包裹（若有）
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let rest = &trimmed[start + 3..];
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    match rest.find("```") {
        Some(end) => rest[..end].trim(),
        None => rest.trim(),
    }
}

/// 解析 Oracle 回答为决策列表
///
/// 整体不是 JSON 数组时返回 MalformedResponse；数组中的坏元素被跳过。
pub fn parse_decisions(raw: &str) -> Result<Vec<Decision>, AgentError> {
    let body = strip_code_fences(raw);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AgentError::MalformedResponse(format!("not JSON: {}", e)))?;
    let Value::Array(elements) = value else {
        return Err(AgentError::MalformedResponse(
            "top-level value is not an array".to_string(),
        ));
    };

    let total = elements.len();
    let decisions: Vec<Decision> = elements
        .into_iter()
        .filter_map(|element| match serde_json::from_value::<Decision>(element) {
            Ok(d) => Some(d),
            Err(e) => {
                tracing::debug!("Skipping malformed decision: {}", e);
                None
            }
        })
        .collect();

    if decisions.len() < total {
        tracing::warn!(
            "Dropped {} of {} decisions that did not match the schema",
            total - decisions.len(),
            total
        );
    }
    Ok(decisions)
}

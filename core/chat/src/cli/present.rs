//! 一覧・結果の 1 行表示

use common::backend::{ConversationSummary, ModelInfo};
use common::domain::ModelName;
use serde_json::Value;

/// `0f8fad5b  2025-01-01T00:00:00Z`（ID は先頭 8 文字）
pub fn conversation_line(c: &ConversationSummary) -> String {
    format!("{}  {}", c.id.short(), c.updated_at.as_deref().unwrap_or("-"))
}

/// 選択中のモデルには `*` を付ける
pub fn model_line(m: &ModelInfo, selected: Option<&ModelName>) -> String {
    let marker = match selected {
        Some(s) if &**s == m.key() || &**s == m.name => "*",
        _ => " ",
    };
    if m.key() == m.name {
        format!("{} {}", marker, m.name)
    } else {
        format!("{} {} ({})", marker, m.name, m.key())
    }
}

/// 取り込み結果（JSON は整形、文字列はそのまま）
pub fn document_result(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        other => serde_json::to_string_pretty(other).unwrap_or_else(|_| other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::domain::ConversationId;

    #[test]
    fn test_conversation_line() {
        let c = ConversationSummary {
            id: ConversationId::new("0f8fad5b-d9cb-469f-a165-70867728950e"),
            updated_at: Some("2025-01-01T00:00:00Z".to_string()),
            model: None,
            messages: None,
        };
        assert_eq!(conversation_line(&c), "0f8fad5b  2025-01-01T00:00:00Z");
    }

    #[test]
    fn test_model_line_marks_selected() {
        let m = ModelInfo {
            id: Some("gpt-4o".to_string()),
            name: "GPT-4o".to_string(),
        };
        assert_eq!(model_line(&m, Some(&ModelName::new("gpt-4o"))), "* GPT-4o (gpt-4o)");
        assert_eq!(model_line(&m, None), "  GPT-4o (gpt-4o)");
        let plain = ModelInfo {
            id: None,
            name: "local".to_string(),
        };
        assert_eq!(model_line(&plain, Some(&ModelName::new("local"))), "* local");
    }

    #[test]
    fn test_document_result() {
        assert_eq!(document_result(&Value::String("ok".to_string())), "ok");
        assert_eq!(
            document_result(&serde_json::json!({"chunks": 3})),
            "{\n  \"chunks\": 3\n}"
        );
    }
}

//! AI assistant page.
//!
//! Tool invocations arrive already executed on the server; they are rendered as cards next to
//! the assistant's text. Tools the dashboard knows get a title and a short result summary,
//! anything else is shown generically with its arguments.

use super::Input;
use crate::app::App;
use api_shared::{ChatMessage, ChatRole, MessagePart, ToolInvocation, ToolState};
use emr_client::{ClientResult, Conversation};
use serde_json::Value;
use std::fmt::Write;

const EXIT_COMMANDS: [&str; 3] = ["/exit", "/quit", "/thoat"];

/// Tools the assistant is known to call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KnownTool {
    ExploreSchema,
    CommonQuery,
    SearchPatients,
    PatientHealthRecords,
    WebSearch,
}

impl KnownTool {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "exploreClickHouseSchema" => Some(Self::ExploreSchema),
            "commonQuery" => Some(Self::CommonQuery),
            "searchPatients" => Some(Self::SearchPatients),
            "getPatientHealthRecords" => Some(Self::PatientHealthRecords),
            "web_search_preview" => Some(Self::WebSearch),
            _ => None,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::ExploreSchema => "Khám phá cấu trúc dữ liệu",
            Self::CommonQuery => "Truy vấn dữ liệu",
            Self::SearchPatients => "Tìm kiếm bệnh nhân",
            Self::PatientHealthRecords => "Hồ sơ sức khỏe bệnh nhân",
            Self::WebSearch => "Tìm kiếm trên web",
        }
    }
}

pub async fn run(app: &App, message: Option<String>, input: &mut Input) -> ClientResult<String> {
    let chat = app.client.chat();
    let mut conversation = Conversation::new();

    if let Some(message) = message {
        let reply = conversation.ask(&chat, &message).await?;
        return Ok(render_message(reply));
    }

    println!("Trợ lý AI. Gõ câu hỏi, hoặc {} để thoát.", EXIT_COMMANDS[0]);
    loop {
        let Some(line) = input.next_line().await? else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if EXIT_COMMANDS.contains(&line) {
            break;
        }
        match conversation.ask(&chat, line).await {
            Ok(reply) => println!("{}\n", render_message(reply)),
            Err(e) => eprintln!("{}\n", e.user_message()),
        }
    }
    Ok(String::new())
}

pub fn render_message(message: &ChatMessage) -> String {
    let speaker = match message.role {
        ChatRole::User => "Bạn",
        ChatRole::Assistant => "Trợ lý",
        ChatRole::System => "Hệ thống",
    };

    let mut blocks = Vec::new();
    for part in &message.parts {
        match part {
            MessagePart::Text { text } if !text.trim().is_empty() => {
                blocks.push(text.trim().to_string())
            }
            MessagePart::ToolInvocation { tool_invocation } => {
                blocks.push(render_tool(tool_invocation))
            }
            _ => {}
        }
    }
    if blocks.is_empty() && !message.content.trim().is_empty() {
        blocks.push(message.content.trim().to_string());
    }

    format!("{speaker}:\n{}", blocks.join("\n"))
}

pub fn render_tool(invocation: &ToolInvocation) -> String {
    let known = KnownTool::from_name(&invocation.tool_name);
    let title = known.map_or(invocation.tool_name.as_str(), |tool| tool.title());

    let mut out = format!("[{title}]");
    match invocation.state {
        ToolState::PartialCall | ToolState::Call => out.push_str(" đang thực hiện..."),
        ToolState::Result => {
            let summary = match (known, invocation.result.as_ref()) {
                (_, None) => "không có kết quả".to_string(),
                (Some(KnownTool::SearchPatients), Some(result)) => summarise_patients(result),
                (Some(_), Some(result)) => summarise_value(result),
                (None, Some(result)) => compact_json(result),
            };
            let _ = write!(out, " {summary}");
        }
    }

    if known.is_none() && !invocation.args.is_null() {
        let _ = write!(out, "\n  tham số: {}", compact_json(&invocation.args));
    }
    out
}

fn summarise_patients(result: &Value) -> String {
    let Some(items) = result.as_array() else {
        return summarise_value(result);
    };
    let names: Vec<&str> = items
        .iter()
        .filter_map(|p| p.get("fullName").and_then(Value::as_str))
        .take(5)
        .collect();
    let mut out = format!("{} bệnh nhân", items.len());
    if !names.is_empty() {
        let _ = write!(out, ": {}", names.join(", "));
        if items.len() > names.len() {
            out.push_str(", ...");
        }
    }
    out
}

fn summarise_value(result: &Value) -> String {
    match result {
        Value::Array(items) => format!("{} kết quả", items.len()),
        Value::Object(map) => match map.get("rows").or_else(|| map.get("data")) {
            Some(Value::Array(rows)) => format!("{} dòng", rows.len()),
            _ => format!("{} trường", map.len()),
        },
        Value::String(s) => truncate(s, 120),
        other => other.to_string(),
    }
}

fn compact_json(value: &Value) -> String {
    truncate(&value.to_string(), 120)
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn invocation(name: &str, state: ToolState, result: Option<Value>) -> ToolInvocation {
        ToolInvocation {
            tool_call_id: "c1".into(),
            tool_name: name.into(),
            args: json!({"query": "An"}),
            state,
            result,
        }
    }

    #[test]
    fn test_search_patients_result_lists_names() {
        let card = render_tool(&invocation(
            "searchPatients",
            ToolState::Result,
            Some(json!([{"fullName": "Nguyễn Thị An"}, {"fullName": "Trần An"}])),
        ));
        assert_eq!(card, "[Tìm kiếm bệnh nhân] 2 bệnh nhân: Nguyễn Thị An, Trần An");
    }

    #[test]
    fn test_running_tool() {
        let card = render_tool(&invocation("commonQuery", ToolState::Call, None));
        assert_eq!(card, "[Truy vấn dữ liệu] đang thực hiện...");
    }

    #[test]
    fn test_query_rows_are_counted() {
        let card = render_tool(&invocation(
            "commonQuery",
            ToolState::Result,
            Some(json!({"rows": [[1], [2], [3]]})),
        ));
        assert!(card.ends_with("3 dòng"));
    }

    #[test]
    fn test_unknown_tool_is_rendered_generically() {
        let card = render_tool(&invocation(
            "calculateDose",
            ToolState::Result,
            Some(json!({"mg": 500})),
        ));
        assert!(card.starts_with("[calculateDose] {\"mg\":500}"));
        assert!(card.contains("tham số: {\"query\":\"An\"}"));
    }

    #[test]
    fn test_render_message_orders_parts() {
        let message = ChatMessage {
            id: "a1".into(),
            role: ChatRole::Assistant,
            content: String::new(),
            parts: vec![
                MessagePart::Other(json!({"type": "step-start"})),
                MessagePart::ToolInvocation {
                    tool_invocation: invocation("web_search_preview", ToolState::Result, Some(json!([1]))),
                },
                MessagePart::Text {
                    text: "Đây là kết quả.".into(),
                },
            ],
        };
        assert_eq!(
            render_message(&message),
            "Trợ lý:\n[Tìm kiếm trên web] 1 kết quả\nĐây là kết quả."
        );
    }

    #[test]
    fn test_long_strings_are_truncated() {
        let long = "a".repeat(200);
        assert_eq!(truncate(&long, 10), "aaaaaaaaaa...");
        assert_eq!(truncate("ngắn", 10), "ngắn");
    }
}

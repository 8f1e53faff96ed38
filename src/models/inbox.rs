use serde::{Deserialize, Serialize};

/// Message left for the shop consultant, as stored by the chat widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboxMessage {
    pub id: String,
    pub date: String,
    pub text: String,
}

/// Response model for the admin inbox view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InboxResponse {
    pub messages: Vec<InboxMessage>,
    pub total_count: usize,
}

impl InboxResponse {
    pub fn new(messages: Vec<InboxMessage>) -> Self {
        Self {
            total_count: messages.len(),
            messages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_schema_matches_stored_json() {
        let json = r#"[{"id":"1700000000000","date":"19/10/2026 10:15","text":"Vocês entregam em Cabedelo?"}]"#;
        let messages: Vec<InboxMessage> = serde_json::from_str(json).unwrap();

        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].text, "Vocês entregam em Cabedelo?");
    }

    #[test]
    fn test_response_counts_messages() {
        let response = InboxResponse::new(vec![]);
        assert_eq!(response.total_count, 0);
    }
}

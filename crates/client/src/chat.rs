//! Chat assistant client.
//!
//! The assistant runs behind its own endpoint. Each request carries the whole conversation;
//! the reply may include tool invocations the assistant already ran on the server side.

use crate::{ApiClient, ClientResult};
use api_shared::{ChatMessage, ChatReq, ChatRes};

#[derive(Clone)]
pub struct ChatApi {
    api: ApiClient,
}

impl ChatApi {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Sends the conversation and returns the assistant's reply.
    pub async fn send(&self, messages: &[ChatMessage]) -> ClientResult<ChatMessage> {
        let request = ChatReq {
            messages: messages.to_vec(),
        };
        let url = self.api.config().chat_url().clone();
        let response: ChatRes = self.api.post_url(url, "/chat", &request).await?;
        Ok(response.message)
    }
}

/// A conversation kept on the client between turns.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Adds a user turn and waits for the reply.
    ///
    /// If the request fails the user turn is withdrawn, so asking again does not repeat it.
    pub async fn ask(&mut self, chat: &ChatApi, text: &str) -> ClientResult<&ChatMessage> {
        self.messages.push(ChatMessage::user(text));
        match chat.send(&self.messages).await {
            Ok(reply) => {
                self.messages.push(reply);
                let last = self.messages.len() - 1;
                Ok(&self.messages[last])
            }
            Err(e) => {
                self.messages.pop();
                Err(e)
            }
        }
    }
}

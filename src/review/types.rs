use serde::{Deserialize, Serialize};

/// Request body for the chat-completion endpoint.
#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

/// The parts of the chat-completion response the bot reads. Everything is
/// optional here so a missing field becomes a named error instead of a
/// serde failure.
#[derive(Debug, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Option<Vec<Choice>>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ReplyMessage>,
}

#[derive(Debug, Deserialize)]
pub struct ReplyMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Usage {
    pub prompt_tokens: usize,
    pub completion_tokens: usize,
    pub total_tokens: usize,
}

impl ChatResponse {
    /// Text of `choices[0].message.content`, or a description of what was
    /// missing.
    pub fn first_content(self) -> Result<String, &'static str> {
        let choices = self.choices.ok_or("response has no `choices` array")?;
        let first = choices.into_iter().next().ok_or("`choices` array is empty")?;
        let message = first.message.ok_or("first choice has no `message`")?;
        message.content.ok_or("first choice message has no `content`")
    }
}

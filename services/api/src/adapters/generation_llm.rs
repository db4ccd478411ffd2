//! services/api/src/adapters/generation_llm.rs
//!
//! This module contains the adapter for the text-generation LLM.
//! It implements the `TextGenerationService` port from the `core` crate against
//! any OpenAI-compatible chat-completions endpoint.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs, ResponseFormat,
        ResponseFormatJsonSchema,
    },
    Client,
};
use async_trait::async_trait;
use placement_core::{
    domain::{ChatMessage, ChatRole},
    ports::{GenerationInput, GenerationRequest, PortError, PortResult, TextGenerationService},
    prompts::CHAT_SYSTEM_PREAMBLE,
};
use tracing::debug;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `TextGenerationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiGenerationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiGenerationAdapter {
    /// Creates a new `OpenAiGenerationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    /// Translates a port request into a chat-completions request for `model`.
    fn build_request(
        model: &str,
        request: &GenerationRequest,
    ) -> Result<CreateChatCompletionRequest, OpenAIError> {
        let messages: Vec<ChatCompletionRequestMessage> = match &request.input {
            GenerationInput::Prompt(prompt) => vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt.as_str())
                .build()?
                .into()],
            GenerationInput::Conversation(transcript) => {
                let mut messages = Vec::with_capacity(transcript.len() + 1);
                messages.push(
                    ChatCompletionRequestSystemMessageArgs::default()
                        .content(CHAT_SYSTEM_PREAMBLE)
                        .build()?
                        .into(),
                );
                for message in transcript {
                    messages.push(to_request_message(message)?);
                }
                messages
            }
        };

        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(model).messages(messages).n(1);

        if let Some(shape) = request.shape {
            args.response_format(ResponseFormat::JsonSchema {
                json_schema: ResponseFormatJsonSchema {
                    description: None,
                    name: shape.name().to_string(),
                    schema: Some(shape.schema()),
                    strict: None,
                },
            });
        }

        args.build()
    }
}

fn to_request_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage, OpenAIError> {
    Ok(match message.role {
        ChatRole::User => ChatCompletionRequestUserMessageArgs::default()
            .content(message.text.as_str())
            .build()?
            .into(),
        ChatRole::Assistant => ChatCompletionRequestAssistantMessageArgs::default()
            .content(message.text.as_str())
            .build()?
            .into(),
    })
}

//=========================================================================================
// `TextGenerationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl TextGenerationService for OpenAiGenerationAdapter {
    async fn generate(&self, request: GenerationRequest) -> PortResult<String> {
        let request = Self::build_request(&self.model, &request)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(
                "Generation succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        // Extract the text content from the first choice in the response.
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| {
                PortError::Unexpected("Generation LLM returned no text content.".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use placement_core::ports::ResponseShape;

    #[test]
    fn prompt_becomes_a_single_user_message() {
        let request = GenerationRequest::prompt("List 5 courses");
        let built = OpenAiGenerationAdapter::build_request("test-model", &request).unwrap();

        assert_eq!(built.model, "test-model");
        assert_eq!(built.messages.len(), 1);
        assert!(matches!(built.messages[0], ChatCompletionRequestMessage::User(_)));
        assert!(built.response_format.is_none());
    }

    #[test]
    fn conversation_keeps_order_after_the_preamble() {
        let request = GenerationRequest::conversation(vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant("hello"),
            ChatMessage::user("mock interview please"),
        ]);
        let built = OpenAiGenerationAdapter::build_request("m", &request).unwrap();

        assert_eq!(built.messages.len(), 4);
        assert!(matches!(built.messages[0], ChatCompletionRequestMessage::System(_)));
        assert!(matches!(built.messages[1], ChatCompletionRequestMessage::User(_)));
        assert!(matches!(built.messages[2], ChatCompletionRequestMessage::Assistant(_)));
        assert!(matches!(built.messages[3], ChatCompletionRequestMessage::User(_)));
    }

    #[test]
    fn quiz_shape_requests_a_json_schema() {
        let request = GenerationRequest::prompt("quiz me").with_shape(ResponseShape::Quiz);
        let built = OpenAiGenerationAdapter::build_request("m", &request).unwrap();

        match built.response_format {
            Some(ResponseFormat::JsonSchema { json_schema }) => {
                assert_eq!(json_schema.name, "quiz_item");
                let schema = json_schema.schema.unwrap();
                assert!(schema["properties"]["correctAnswer"].is_object());
            }
            other => panic!("unexpected response format: {:?}", other),
        }
    }
}

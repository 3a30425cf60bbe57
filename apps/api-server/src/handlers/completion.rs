//! Chat completion endpoint.

use actix_web::{HttpResponse, web};

use chatgate_core::DomainError;
use chatgate_core::domain::{ChatMessage, ChatTranscript, CompletionChoice, CompletionRequest};
use chatgate_core::ports::CompletionError;
use chatgate_shared::dto::{ChatCompletionRequest, ChatCompletionResponse, ChatMessageDto, ChoiceDto};

use crate::middleware::client::ClientToken;
use crate::middleware::error::{
    AppError, AppResult, RATE_LIMIT_LIMIT_HEADER, RATE_LIMIT_REMAINING_HEADER,
};
use crate::state::AppState;

/// POST /api/ai/create-chat-completion
///
/// Validates the conversation, charges the caller's quota, injects the dated
/// system prompt and persona instruction, then forwards to the provider.
pub async fn create_chat_completion(
    state: web::Data<AppState>,
    client: ClientToken,
    body: web::Json<ChatCompletionRequest>,
) -> AppResult<HttpResponse> {
    // Nothing is charged for a request that cannot be served.
    let transcript = parse_transcript(body.into_inner())?;
    tracing::debug!(
        client = %client.as_str(),
        messages = transcript.messages().len(),
        "Chat completion requested"
    );

    let quota = &state.quota;
    let permit = state
        .rate_limiter
        .check_and_consume(client.as_str(), &quota.bucket, quota.max_requests)
        .await?;

    if !permit.allowed {
        tracing::warn!(
            client = %client.as_str(),
            bucket = %quota.bucket,
            limit = permit.limit,
            "Rate limit exceeded"
        );
        return Err(AppError::RateLimited {
            limit: permit.limit,
            per: quota.window_label(),
            retry_after: permit.reset_after,
        });
    }

    let settings = &state.completion;
    let today = chrono::Utc::now().date_naive();
    let request = CompletionRequest::new(
        settings.model.clone(),
        settings.temperature,
        settings.prompt.apply(transcript, today),
    );

    let choices = tokio::time::timeout(
        settings.provider_timeout,
        state.completions.create_chat_completion(request),
    )
    .await
    .map_err(|_| CompletionError::Timeout(settings.provider_timeout))??;

    tracing::debug!(
        client = %client.as_str(),
        choices = choices.len(),
        remaining = permit.remaining,
        "Chat completion served"
    );

    Ok(HttpResponse::Ok()
        .insert_header((RATE_LIMIT_LIMIT_HEADER, permit.limit.to_string()))
        .insert_header((RATE_LIMIT_REMAINING_HEADER, permit.remaining.to_string()))
        .json(ChatCompletionResponse {
            choices: choices.into_iter().map(choice_dto).collect(),
        }))
}

fn parse_transcript(body: ChatCompletionRequest) -> Result<ChatTranscript, DomainError> {
    let messages = body
        .messages
        .unwrap_or_default()
        .into_iter()
        .map(|m| ChatMessage::parse(&m.role, m.content))
        .collect::<Result<Vec<_>, _>>()?;

    ChatTranscript::new(messages)
}

fn choice_dto(choice: CompletionChoice) -> ChoiceDto {
    ChoiceDto {
        index: choice.index,
        message: choice.message.map(|m| ChatMessageDto {
            role: m.role.to_string(),
            content: m.content,
        }),
        finish_reason: choice.finish_reason,
    }
}

use actix_web::{web, HttpResponse};
use log::{error, info};
use serde_json::json;

use crate::model::{ChatModel, GenerateOptions};
use crate::web::error::ApiError;
use crate::web::models::{ChatRequest, ChatResponse, Message, Role};

// Root welcome handler
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "message": "Welcome to the LLaMA Chat API!" }))
}

// Health check endpoint
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "status": "ok" }))
}

// Chat API endpoint
pub async fn chat(
    model: web::Data<dyn ChatModel>,
    req: web::Json<ChatRequest>,
) -> Result<HttpResponse, ApiError> {
    let req = req.into_inner();

    if req.message.is_empty() {
        return Err(ApiError::Validation("Message cannot be empty".to_string()));
    }

    info!(
        "Chat request: {} (temperature: {}, max_tokens: {})",
        req.message, req.temperature, req.max_tokens
    );

    // An optional context rides ahead of the user's message as a system turn.
    let mut messages = Vec::with_capacity(2);
    if let Some(context) = req.context.as_deref() {
        if !context.is_empty() {
            messages.push(Message {
                role: Role::System,
                content: context.to_string(),
            });
        }
    }
    messages.push(Message {
        role: Role::User,
        content: req.message,
    });

    let options = GenerateOptions {
        temperature: req.temperature,
        max_tokens: req.max_tokens,
    };

    match model.generate(&messages, options).await {
        Ok(response) => Ok(HttpResponse::Ok().json(ChatResponse {
            response,
            context: req.context,
        })),
        Err(e) => {
            error!("Model error: {}", e);
            Err(ApiError::Upstream(e.to_string()))
        }
    }
}

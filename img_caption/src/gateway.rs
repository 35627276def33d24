//! Inference Gateway - one call to the local vision model.
//!
//! The gateway never retries; every failure is reported to the caller as a
//! [`GatewayError`] and the retry controller decides what happens next.

use crate::errors::GatewayError;
use crate::sanitizer::slugify_reply;
use crate::task::Mode;
use base64::{engine::general_purpose::STANDARD as BASE64_STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";
pub const DEFAULT_MODEL: &str = "qwen3-vl:4b-instruct";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);

/// Longest error body kept in a [`GatewayError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 300;

pub const CAPTION_PROMPT: &str = "Describe this image in detail. If this is a screenshot of a computer interface, application, or program:
- Identify the application, program, or website being shown
- Read and include any visible text, window titles, menu items, or UI labels
- Describe the specific content, data, or interface elements displayed
- Note any error messages, dialogs, or notifications
- Include technical details like file paths, URLs, or configuration shown

If this is a regular photo or image, describe the visual content, people, objects, and scene.

Provide a clear and comprehensive caption.";

pub const FILENAME_PROMPT: &str = "Look at this image and generate a concise, descriptive filename (without extension) that best describes its content.

If this is a screenshot of a computer interface, application, or program:
- Include the application/program name (e.g., chrome, vscode, terminal, excel)
- Include the main content or purpose shown (e.g., settings-page, error-dialog, code-editor)
- Include key identifiers like page titles, file names, or specific features visible
- Examples: \"chrome-security-settings\", \"vscode-python-debugger\", \"terminal-git-status\"

If this is a regular photo or image:
- Focus on the main subject, people, objects, or scene
- Include location or context if relevant

The filename should be:
- Short and descriptive (ideally 3-8 words)
- Use lowercase letters, numbers, and hyphens only
- No spaces (use hyphens instead)
- No special characters except hyphens

Respond with ONLY the filename, nothing else.";

impl Mode {
    pub fn prompt(&self) -> &'static str {
        match self {
            Mode::Caption => CAPTION_PROMPT,
            Mode::Name => FILENAME_PROMPT,
        }
    }
}

/// A captioning/naming service. One call is one round trip.
pub trait InferenceGateway {
    fn invoke(&self, image: &Path, mode: Mode) -> Result<String, GatewayError>;
}

impl<G: InferenceGateway + ?Sized> InferenceGateway for &G {
    fn invoke(&self, image: &Path, mode: Mode) -> Result<String, GatewayError> {
        (**self).invoke(image, mode)
    }
}

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL of the Ollama server, without the `/api/...` path
    pub endpoint: String,
    pub model: String,
    /// Overall transport timeout per request
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    stream: bool,
    messages: [ChatMessage<'a>; 1],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
    images: [String; 1],
}

#[derive(Deserialize)]
struct ChatResponse {
    message: Option<ResponseMessage>,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: String,
}

/// Ollama `/api/chat` client over a blocking HTTP agent.
pub struct OllamaGateway {
    agent: ureq::Agent,
    config: GatewayConfig,
}

impl OllamaGateway {
    pub fn new(config: GatewayConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout(config.timeout)
            .build();
        Self { agent, config }
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.config.endpoint.trim_end_matches('/'))
    }
}

impl InferenceGateway for OllamaGateway {
    fn invoke(&self, image: &Path, mode: Mode) -> Result<String, GatewayError> {
        let bytes = std::fs::read(image).map_err(|source| GatewayError::ImageRead {
            path: image.to_path_buf(),
            source,
        })?;

        let request = ChatRequest {
            model: &self.config.model,
            stream: false,
            messages: [ChatMessage {
                role: "user",
                content: mode.prompt(),
                images: [BASE64_STANDARD.encode(&bytes)],
            }],
        };

        let start = Instant::now();
        let response = self
            .agent
            .post(&self.chat_url())
            .send_json(&request)
            .map_err(map_request_error)?;

        let body: ChatResponse = response
            .into_json()
            .map_err(|e| GatewayError::MalformedResponse(e.to_string()))?;
        let content = body
            .message
            .map(|m| m.content)
            .ok_or_else(|| GatewayError::MalformedResponse("missing message.content".to_string()))?;

        debug!(
            image = %image.display(),
            mode = %mode,
            image_bytes = bytes.len(),
            duration_secs = start.elapsed().as_secs_f64(),
            "Inference call completed"
        );

        let text = content.trim();
        Ok(match mode {
            Mode::Caption => text.to_string(),
            Mode::Name => slugify_reply(text),
        })
    }
}

fn map_request_error(error: ureq::Error) -> GatewayError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            GatewayError::Status {
                status,
                body: body.trim().chars().take(MAX_ERROR_BODY_CHARS).collect(),
            }
        }
        ureq::Error::Transport(transport) => GatewayError::Transport(transport.to_string()),
    }
}

use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct ReplyRequest {
    #[serde(default)]
    pub review: String,
}

#[derive(Debug, Serialize)]
pub struct ReplyResponse {
    pub sentiment: String,
    pub reply: String,
}

#[derive(Debug, Serialize)]
pub struct ExampleResponse {
    pub review: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub configured: bool,
    pub model: Option<String>,
}

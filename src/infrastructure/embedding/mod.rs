//! Embedding provider implementations

mod http_client;
mod openai;

pub use http_client::{HttpClient, HttpClientTrait};
#[cfg(test)]
pub use http_client::mock::MockHttpClient;
pub use openai::OpenAiEmbedder;

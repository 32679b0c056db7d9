//! Credit and monetary cost accounting (§6).

use crate::job::Job;
use crate::response::Usage;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryType {
    ImageAnalysis,
    DocumentAnalysis,
    BasicQuery,
    ComplexQuery,
}

impl QueryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::ImageAnalysis => "image_analysis",
            QueryType::DocumentAnalysis => "document_analysis",
            QueryType::BasicQuery => "basic_query",
            QueryType::ComplexQuery => "complex_query",
        }
    }

    /// Fixed credit cost for this query type.
    pub fn credits(&self) -> f64 {
        match self {
            QueryType::ImageAnalysis => 4.0,
            QueryType::DocumentAnalysis => 3.0,
            QueryType::BasicQuery => 1.0,
            QueryType::ComplexQuery => 5.0,
        }
    }
}

/// Credit cost of an embedding call (fixed, no detection needed).
pub const EMBEDDING_CREDITS: f64 = 0.5;

/// Detect the query type of a job for credit accounting (§6).
pub fn detect_query_type(job: &Job) -> QueryType {
    if job.has_image() {
        return QueryType::ImageAnalysis;
    }
    if job.has_pdf() {
        return QueryType::DocumentAnalysis;
    }
    let len = job.last_user_text().len();
    if len < 50 {
        QueryType::BasicQuery
    } else if len > 200 {
        QueryType::ComplexQuery
    } else {
        QueryType::BasicQuery
    }
}

/// USD-per-token cost table, keyed by provider name.
#[derive(Debug, Clone, Copy)]
pub struct TokenCost {
    pub chat_input: f64,
    pub chat_output: f64,
    pub embedding: f64,
}

pub fn token_cost_for(provider: &str) -> TokenCost {
    match provider {
        "gemini" => TokenCost {
            chat_input: 7.5e-8,
            chat_output: 3e-7,
            embedding: 2.5e-8,
        },
        // OpenAI is the default cost table for any unrecognized provider name.
        _ => TokenCost {
            chat_input: 1.5e-7,
            chat_output: 6e-7,
            embedding: 2e-8,
        },
    }
}

/// Monetary cost in USD for a completed chat call.
pub fn chat_cost_usd(provider: &str, usage: &Usage) -> f64 {
    let cost = token_cost_for(provider);
    usage.prompt_tokens as f64 * cost.chat_input + usage.completion_tokens as f64 * cost.chat_output
}

/// Monetary cost in USD for an embedding call.
pub fn embedding_cost_usd(provider: &str, total_tokens: u64) -> f64 {
    token_cost_for(provider).embedding * total_tokens as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::{Content, Message, Role};
    use chrono::Utc;

    fn job_with_text(text: &str) -> Job {
        Job {
            job_id: "t-1-abcdefghi".into(),
            request_id: "r1".into(),
            tenant_id: "t".into(),
            provider: "openai".into(),
            messages: vec![Message {
                role: Role::User,
                content: Some(Content::Text(text.to_string())),
                tool_calls: None,
                name: None,
                tool_call_id: None,
            }],
            files: None,
            temperature: 0.7,
            tools: None,
            tool_choice: None,
            ticket_id: None,
            ticket_categories: None,
            category: None,
            name_user: None,
            started_at: Utc::now(),
        }
    }

    #[test]
    fn short_text_is_basic_query() {
        assert_eq!(detect_query_type(&job_with_text("hi")), QueryType::BasicQuery);
    }

    #[test]
    fn long_text_is_complex_query() {
        let text = "x".repeat(201);
        assert_eq!(detect_query_type(&job_with_text(&text)), QueryType::ComplexQuery);
    }

    #[test]
    fn mid_length_text_is_basic_query() {
        let text = "x".repeat(120);
        assert_eq!(detect_query_type(&job_with_text(&text)), QueryType::BasicQuery);
    }
}

//! aura-ai: generative-model seam, analysis client, and chat session wrapper.

pub mod analysis;
pub mod chat;
pub mod error;
pub mod model;
pub mod offline;

pub use analysis::{analyze_expenses, analyze_ledger, serialize_transactions};
pub use chat::{ChatMessage, ChatOptions, ChatRole, ChatSession, SEND_FALLBACK};
pub use error::AiError;
pub use model::{ChatTurn, GeminiClient, GenerateRequest, GenerativeModel};
pub use offline::{offline_expense_report, offline_ledger_report};

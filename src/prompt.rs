//! Prompt composition. Pure string building, no side effects.

use crate::llm::CompletionRequest;

pub const NO_CONTEXT_PLACEHOLDER: &str = "(No relevant context found.)";

const SYSTEM_POLICY: [&str; 8] = [
    "You are an e-commerce store assistant.",
    "Reply in English only.",
    "Be concise, helpful, and sales-oriented.",
    "Use ONLY the STORE CONTEXT as ground truth.",
    "Do not invent prices, stock, delivery promises, or policies.",
    "If the answer is not in the context, ask ONE short clarifying question.",
    "When you recommend or mention a product, ALWAYS include its URL if available in the context.",
    "If multiple relevant products exist, provide up to 3 options with their URLs.",
];

const USER_URL_INSTRUCTION: &str = "If you mention any product, include the product URL(s).";

/// Builds the system-instruction block: the fixed policy lines followed by
/// the retrieved store context (or a placeholder when nothing was found).
pub fn system_prompt(context: &str) -> String {
    let context = if context.is_empty() {
        NO_CONTEXT_PLACEHOLDER
    } else {
        context
    };

    let mut lines: Vec<&str> = SYSTEM_POLICY.to_vec();
    lines.push("");
    lines.push("STORE CONTEXT:");
    lines.push(context);
    lines.join("\n")
}

/// Builds the user turn: the message plus a reminder to include product
/// URLs.
pub fn user_prompt(message: &str) -> String {
    format!("{}\n\n{}", message, USER_URL_INSTRUCTION)
}

pub fn compose(message: &str, context: &str) -> CompletionRequest {
    CompletionRequest::new(system_prompt(context), user_prompt(message))
}

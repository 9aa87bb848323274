//! Presentation support for the chat widget.
//!
//! Turns a raw reply into renderable segments: markdown-style links are
//! stripped from the text, non-product links become plain hyperlinks, and
//! product links become cards enriched best-effort from the storefront's
//! public product endpoint.

pub mod links;
pub mod render;
pub mod storefront;

pub use links::{extract_markdown_links, product_handle, strip_link_markup, MarkdownLink};
pub use render::{render_reply, ReplySegment};
pub use storefront::{ProductCard, Storefront};

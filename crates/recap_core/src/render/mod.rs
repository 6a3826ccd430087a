//! Renderers that turn summary markdown into delivery formats:
//! styled HTML for email, Telegram-safe HTML, and PDF attachments.

pub mod html;
pub mod pdf;
pub mod telegram_html;

pub use html::markdown_to_html;
pub use pdf::{markdown_to_pdf, RenderError};
pub use telegram_html::markdown_to_telegram_html;

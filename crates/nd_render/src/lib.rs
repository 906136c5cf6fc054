//! Markdown newsletter rendering for a processed run.

pub mod locale;
pub mod markdown;
pub mod writer;

pub use locale::{Locale, CATEGORY_ORDER};
pub use markdown::{format_published_date, render_newsletter};
pub use writer::{NewsletterWriter, DEFAULT_SITE_DIR};

//! # tgrelay-telegram
//!
//! Outbound HTTP clients for the relay's two external collaborators:
//!
//! - **Messaging backend**: the Telegram Bot API, used as file storage.
//!   Uploads go to a fixed channel; files come back via `getFile`.
//! - **Moderation**: ModerateContent or a custom rating API that scores a
//!   public file URL.
//!
//! Both sit behind object-safe traits ([`FileBackend`], [`RatingService`]) so
//! the HTTP layer can be exercised without network access.

pub mod client;
pub mod error;
pub mod rating;
pub mod types;

pub use client::{FileBackend, MediaUpload, TelegramClient};
pub use error::TelegramError;
pub use rating::{RatingClient, RatingService};
pub use types::{Download, TelegramFile, extract_uploaded_file, file_name_from_path};

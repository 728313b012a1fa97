//! Vendor abstraction for pattern execution.
//!
//! A *vendor* is an interchangeable text-generation backend. This crate
//! defines what the pattern core needs from one and nothing more:
//!
//! - [`Vendor`] - synchronous and streaming chat calls plus model listing
//! - [`VendorsManager`] - vendors in registration order, lookup by name, and
//!   the model → vendor [`ModelIndex`]
//! - [`Session`] - ordered, role-tagged [`ChatMessage`]s for one call
//! - [`ChatOptions`] - per-call model and sampling options
//!
//! Wire protocols of concrete backends live outside this crate.
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use llm::{ChatMessage, ChatOptions, Session, VendorsManager};
//! use std::sync::Arc;
//!
//! let mut vendors = VendorsManager::new();
//! vendors.add_vendor(Arc::new(my_vendor))?;
//!
//! let mut session = Session::new();
//! session.append(ChatMessage::system("You summarize text."));
//! session.append(ChatMessage::user("Rust is a systems language..."));
//!
//! let vendor = vendors.first().expect("at least one vendor");
//! let text = vendor.send(session.vendor_messages(), &ChatOptions::default()).await?;
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod messages;
pub mod vendor;

pub use config::ChatOptions;
pub use error::{LlmError, Result};
pub use manager::{ModelIndex, VendorsManager};
pub use messages::{ChatMessage, ChatRequest, MessageRole, Session};
pub use vendor::{FragmentSink, Vendor};

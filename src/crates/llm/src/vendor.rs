//! The vendor trait: an interchangeable text-generation backend.
//!
//! A vendor exposes one blocking-style call that returns the full response
//! and one streaming call that pushes fragments into a caller-provided sink.
//!
//! # Example Implementation
//!
//! ```rust,ignore
//! use llm::{ChatMessage, ChatOptions, FragmentSink, LlmError, Result, Vendor};
//! use async_trait::async_trait;
//!
//! struct Echo;
//!
//! #[async_trait]
//! impl Vendor for Echo {
//!     fn name(&self) -> &str { "echo" }
//!
//!     async fn list_models(&self) -> Result<Vec<String>> {
//!         Ok(vec!["echo-1".into()])
//!     }
//!
//!     async fn send(&self, messages: &[ChatMessage], _options: &ChatOptions) -> Result<String> {
//!         Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
//!     }
//!
//!     async fn send_stream(
//!         &self,
//!         messages: Vec<ChatMessage>,
//!         options: ChatOptions,
//!         sink: FragmentSink,
//!     ) -> Result<()> {
//!         let text = self.send(&messages, &options).await?;
//!         for word in text.split_inclusive(' ') {
//!             sink.send(word.to_string())
//!                 .await
//!                 .map_err(|_| LlmError::StreamClosed("receiver dropped".into()))?;
//!         }
//!         Ok(())
//!     }
//! }
//! ```

use crate::config::ChatOptions;
use crate::error::Result;
use crate::messages::ChatMessage;
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Bounded sink receiving streamed fragments in emission order.
///
/// Dropping the sink (returning from [`Vendor::send_stream`]) marks the
/// stream complete for the receiver.
pub type FragmentSink = mpsc::Sender<String>;

/// A text-generation backend.
///
/// Implementations must be `Send + Sync`; they are shared as
/// `Arc<dyn Vendor>` across concurrent executions.
#[async_trait]
pub trait Vendor: Send + Sync {
    /// Unique vendor name within a [`crate::VendorsManager`].
    fn name(&self) -> &str;

    /// Models this vendor can serve.
    async fn list_models(&self) -> Result<Vec<String>>;

    /// Run a chat call and return the full response text.
    async fn send(&self, messages: &[ChatMessage], options: &ChatOptions) -> Result<String>;

    /// Run a chat call, writing incremental text fragments into `sink`.
    ///
    /// The sink is owned by the call, so it closes on every return path.
    /// Sending a very large single fragment is an anti-pattern; the sink is
    /// bounded and the receiver may stop reading after cancellation.
    async fn send_stream(
        &self,
        messages: Vec<ChatMessage>,
        options: ChatOptions,
        sink: FragmentSink,
    ) -> Result<()>;
}

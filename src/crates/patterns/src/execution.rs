//! Message assembly and vendor dispatch.
//!
//! The synchronous path is a single `Vendor::send` call; cancellation is
//! only checked before it starts.
//!
//! The streaming path runs `Vendor::send_stream` on a producer task that
//! writes fragments into a bounded queue and reports a terminal error on a
//! separate single-slot channel. The calling task consumes fragments until
//! the queue closes, an error arrives, or the caller cancels. The producer
//! is always joined before returning, so no background work outlives the
//! call and a late error is never lost.

use crate::error::ExecutionFailure;
use crate::handler::{ExecutionContext, StreamSummary};
use crate::store::PatternRecord;
use llm::{ChatMessage, ChatOptions, ChatRequest, LlmError, Session, Vendor};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

/// Capacity of the fragment queue between producer and consumer.
pub const STREAM_BUFFER_SIZE: usize = 100;

/// Pattern content first (as the system message), then the caller's message.
pub fn build_session(pattern: &PatternRecord, request: Option<&ChatRequest>) -> Session {
    let mut session = Session::new();

    if !pattern.content.is_empty() {
        session.append(ChatMessage::system(pattern.content.clone()));
    }

    if let Some(message) = request.and_then(|r| r.message.as_ref()) {
        session.append(message.clone());
    }

    session
}

/// One blocking-style vendor call.
pub async fn send_sync(
    vendor: &dyn Vendor,
    messages: &[ChatMessage],
    options: &ChatOptions,
    ctx: &ExecutionContext,
) -> Result<String, ExecutionFailure> {
    if ctx.is_cancelled() {
        return Err(ExecutionFailure::Cancelled);
    }

    debug!("Sending {} messages to vendor '{}'", messages.len(), vendor.name());
    Ok(vendor.send(messages, options).await?)
}

/// Stream a response, returning the concatenated fragments.
pub async fn send_streaming(
    vendor: Arc<dyn Vendor>,
    messages: Vec<ChatMessage>,
    options: ChatOptions,
    ctx: &ExecutionContext,
) -> Result<(String, StreamSummary), ExecutionFailure> {
    let (fragment_tx, mut fragment_rx) = mpsc::channel::<String>(STREAM_BUFFER_SIZE);
    let (error_tx, mut error_rx) = mpsc::channel::<LlmError>(1);

    debug!("Streaming {} messages from vendor '{}'", messages.len(), vendor.name());

    // fragment_tx moves into send_stream, so the queue closes when it returns
    let producer = Producer::spawn(async move {
        if let Err(e) = vendor.send_stream(messages, options, fragment_tx).await {
            let _ = error_tx.try_send(e);
        }
    });

    let mut content = String::new();
    let mut summary = StreamSummary::default();

    loop {
        tokio::select! {
            biased;

            _ = ctx.cancellation.cancelled() => {
                producer.abort_and_join().await;
                debug!("Streaming cancelled after {} fragments", summary.fragments);
                return Err(ExecutionFailure::Cancelled);
            }

            Some(err) = error_rx.recv() => {
                producer.abort_and_join().await;
                return Err(ExecutionFailure::Vendor(err));
            }

            fragment = fragment_rx.recv() => match fragment {
                Some(fragment) => {
                    if let Some(sink) = &ctx.fragment_sink {
                        let _ = sink.send(fragment.clone());
                    }
                    content.push_str(&fragment);
                    summary.fragments += 1;
                }
                None => break,
            },
        }
    }

    producer.join().await?;

    if let Ok(err) = error_rx.try_recv() {
        return Err(ExecutionFailure::Vendor(err));
    }

    Ok((content, summary))
}

/// Producer task handle. Aborts the task if dropped before being joined.
struct Producer {
    handle: Option<JoinHandle<()>>,
}

impl Producer {
    fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            handle: Some(tokio::spawn(future)),
        }
    }

    async fn join(mut self) -> Result<(), ExecutionFailure> {
        match self.handle.take() {
            Some(handle) => handle
                .await
                .map_err(|e| ExecutionFailure::Producer(e.to_string())),
            None => Ok(()),
        }
    }

    async fn abort_and_join(mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            let _ = handle.await;
        }
    }
}

impl Drop for Producer {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

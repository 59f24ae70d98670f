use bytes::Bytes;
use tokio::sync::oneshot;

use crate::runtime::config::Quality;

/// A request sent by the queue manager to a worker via its ingress queue.
#[derive(Debug)]
pub struct EncodeRequest {
    /// Encoded source image (JPEG, PNG, GIF, BMP).
    pub image_data: Bytes,
    pub quality: Quality,
    /// Channel on which the worker sends its single reply.
    pub reply_tx: oneshot::Sender<EncodeReply>,
}

/// Reply sent back from a worker.
#[derive(Debug, Clone)]
pub enum EncodeReply {
    Success { blob: Bytes },
    Failure { error: String },
    /// The codec panicked while handling the request.
    Crashed { message: String },
}

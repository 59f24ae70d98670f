//! WebP encode worker.
//!
//! Each worker is a Tokio task owning a single-slot ingress queue. It shares
//! no state with the coordinator: requests arrive as [`EncodeRequest`]
//! messages and every request gets exactly one [`EncodeReply`]. The decode
//! and encode work runs on the blocking pool so a large image never stalls
//! the runtime's async threads.

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::engine::webp::encode_webp;
use crate::runtime::backend::protocol::{EncodeReply, EncodeRequest};

/// Requests a worker will hold before `try_send` reports it busy.
const INGRESS_CAPACITY: usize = 1;

struct WebpWorker {
    index: usize,
}

impl WebpWorker {
    fn new(index: usize) -> Self {
        Self { index }
    }

    async fn handle(&mut self, req: EncodeRequest) {
        let EncodeRequest {
            image_data,
            quality,
            reply_tx,
        } = req;
        let worker = self.index;
        let input_len = image_data.len();

        let result = tokio::task::spawn_blocking(move || encode_webp(&image_data, quality)).await;

        let reply = match result {
            Ok(Ok(blob)) => {
                debug!(worker, input_len, output_len = blob.len(), "encoded webp");
                EncodeReply::Success {
                    blob: Bytes::from(blob),
                }
            }
            Ok(Err(e)) => {
                warn!(worker, error = %e, "encode failed");
                EncodeReply::Failure {
                    error: e.to_string(),
                }
            }
            Err(join_err) => {
                warn!(worker, error = %join_err, "encode task panicked");
                EncodeReply::Crashed {
                    message: join_err.to_string(),
                }
            }
        };

        // The coordinator may have stopped waiting; nothing to do then.
        let _ = reply_tx.send(reply);
    }
}

/// Spawn worker `index` and return its ingress sender and task handle.
///
/// The worker exits once every sender is dropped.
pub(crate) fn spawn_worker(index: usize) -> (mpsc::Sender<EncodeRequest>, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::channel::<EncodeRequest>(INGRESS_CAPACITY);
    let handle = tokio::spawn(async move {
        let mut worker = WebpWorker::new(index);
        while let Some(req) = rx.recv().await {
            worker.handle(req).await;
        }
        debug!(worker = index, "worker stopped");
    });
    (tx, handle)
}

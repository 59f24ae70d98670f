//! Image-to-WebP conversion pipeline.
//!
//! A [`TaskQueue`] owns the list of conversion tasks and drives runs; each
//! run builds a fixed-size [`WorkerPool`], dispatches pending tasks to it in
//! chunks no wider than the pool, and hands encoded files to a
//! [`DownloadSink`].
//!
//! ```rust,no_run
//! use toolbox_core::{ConversionConfig, DirectorySink, IncomingFile, TaskQueue};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let queue = TaskQueue::with_webp_workers(
//!     ConversionConfig::default(),
//!     DirectorySink::new("out"),
//! );
//! let file = IncomingFile::from_path("photo.jpg").await?;
//! queue.add_files([file]).await;
//! queue.run_conversion().await;
//! # Ok(())
//! # }
//! ```

mod engine;
mod runtime;

pub use engine::webp::{EncodeError, encode_webp};
pub use runtime::backend::pool::{PoolFactory, WebpPoolFactory, WebpWorkerPool, WorkerPool};
pub use runtime::backend::protocol::{EncodeReply, EncodeRequest};
pub use runtime::config::{ConfigError, ConversionConfig, Quality, ThreadCount};
pub use runtime::ingest::{IncomingFile, data_uri, webp_file_name};
pub use runtime::queue::{RunOutcome, RunReport, TaskEvent, TaskQueue};
pub use runtime::sink::{DirectorySink, Download, DownloadSink, MemorySink, SinkError};
pub use runtime::types::{ConversionTask, RuntimeError, SourceFile, TaskId, TaskStatus};

//! Batch expansion and collision checks, run off the caller's task.
//!
//! [`Processor`] does the blocking work for one [`ProcessRequest`].
//! [`RenameProcessor`] owns a single tokio task that feeds requests to it
//! one at a time on the blocking pool and posts each [`ProcessReply`] to an
//! unbounded channel. When several requests queue up while one is being
//! processed, only the newest is run.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::attr::{AttributeSource, XattrSource};
use super::expand::{expand, Edit};
use super::shell::ShellRunner;
use crate::error::{CoreError, CoreResult};
use crate::fs::ops::target_exists;

/// One entry to check: its current path and the proposed new name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessItem {
    pub source: PathBuf,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRequest {
    pub sequence: u64,
    pub items: Vec<ProcessItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessResult {
    pub source: PathBuf,
    /// Substitutions to replay on the previewed target, in order.
    pub edits: Vec<Edit>,
    /// Some substitution produced empty text.
    pub has_empty: bool,
    /// There was at least one substitution and all produced empty text.
    pub all_empty: bool,
    /// An entry with the expanded name already exists.
    pub exists: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessReply {
    pub sequence: u64,
    pub results: Vec<ProcessResult>,
}

/// Expands expressions and checks targets against the file system.
#[derive(Clone)]
pub struct Processor {
    attributes: Arc<dyn AttributeSource>,
    shell: ShellRunner,
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(Arc::new(XattrSource), ShellRunner::default())
    }
}

impl Processor {
    pub fn new(attributes: Arc<dyn AttributeSource>, shell: ShellRunner) -> Self {
        Self { attributes, shell }
    }

    pub fn process(&self, request: &ProcessRequest) -> ProcessReply {
        tracing::debug!(
            "processing request {} ({} items)",
            request.sequence,
            request.items.len()
        );
        ProcessReply {
            sequence: request.sequence,
            results: request
                .items
                .iter()
                .map(|item| self.process_item(item))
                .collect(),
        }
    }

    pub fn process_item(&self, item: &ProcessItem) -> ProcessResult {
        let expansion = expand(
            &item.target,
            &item.source,
            self.attributes.as_ref(),
            &self.shell,
        );
        let edits = expansion.edits;
        let has_empty = edits.iter().any(|edit| edit.replacement.is_empty());
        let all_empty = !edits.is_empty() && edits.iter().all(|edit| edit.replacement.is_empty());
        let exists = target_exists(&item.source, &expansion.expanded);

        ProcessResult {
            source: item.source.clone(),
            edits,
            has_empty,
            all_empty,
            exists,
        }
    }
}

/// Handle to the background processor task.
///
/// Dropping the handle stops the task once its current request is done.
pub struct RenameProcessor {
    requests: UnboundedSender<ProcessRequest>,
}

impl RenameProcessor {
    /// Spawns the worker on the current tokio runtime.
    pub fn spawn(processor: Processor) -> (Self, UnboundedReceiver<ProcessReply>) {
        let (request_tx, mut request_rx) = mpsc::unbounded_channel::<ProcessRequest>();
        let (reply_tx, reply_rx) = mpsc::unbounded_channel();
        let processor = Arc::new(processor);

        tokio::spawn(async move {
            while let Some(mut request) = request_rx.recv().await {
                while let Ok(newer) = request_rx.try_recv() {
                    tracing::debug!("request {} superseded by {}", request.sequence, newer.sequence);
                    request = newer;
                }

                let worker = Arc::clone(&processor);
                let sequence = request.sequence;
                let reply = match tokio::task::spawn_blocking(move || worker.process(&request)).await
                {
                    Ok(reply) => reply,
                    Err(e) => {
                        tracing::warn!("processing request {sequence} failed: {e}");
                        continue;
                    }
                };
                if reply_tx.send(reply).is_err() {
                    break;
                }
            }
            tracing::debug!("rename processor stopped");
        });

        (
            Self {
                requests: request_tx,
            },
            reply_rx,
        )
    }

    /// Queues `request`, returning its sequence number.
    pub fn submit(&self, request: ProcessRequest) -> CoreResult<u64> {
        let sequence = request.sequence;
        self.requests
            .send(request)
            .map_err(|_| CoreError::ProcessorClosed)?;
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::attr::AttributeValue;
    use std::collections::HashMap;
    use std::path::Path;
    use tempfile::TempDir;

    struct FakeAttributes(HashMap<&'static str, AttributeValue>);

    impl AttributeSource for FakeAttributes {
        fn read(&self, _path: &Path, name: &str) -> Option<AttributeValue> {
            self.0.get(name).cloned()
        }
    }

    fn processor() -> Processor {
        Processor::new(
            Arc::new(FakeAttributes(HashMap::from([(
                "artist",
                AttributeValue::String("Queen".to_string()),
            )]))),
            ShellRunner::default(),
        )
    }

    fn item(source: PathBuf, target: &str) -> ProcessItem {
        ProcessItem {
            source,
            target: target.to_string(),
        }
    }

    #[test]
    fn process_item_expands_and_checks() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("song.mp3");
        std::fs::write(&source, b"").unwrap();

        let result = processor().process_item(&item(source.clone(), "$(artist) - $[echo hi]"));
        assert_eq!(result.source, source);
        assert_eq!(result.edits.len(), 2);
        assert_eq!(result.edits[1].from, 8);
        assert!(!result.has_empty);
        assert!(!result.all_empty);
        assert!(!result.exists);
    }

    #[test]
    fn existing_target_is_reported() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        std::fs::write(&source, b"").unwrap();
        std::fs::write(tmp.path().join("Queen.txt"), b"").unwrap();

        let result = processor().process_item(&item(source, "$(artist).txt"));
        assert!(result.exists);
    }

    #[test]
    fn sub_path_target_is_checked_relative_to_parent() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");
        std::fs::write(&source, b"").unwrap();
        std::fs::create_dir(tmp.path().join("sub")).unwrap();
        std::fs::write(tmp.path().join("sub").join("b.txt"), b"").unwrap();

        let processor = processor();
        assert!(processor.process_item(&item(source.clone(), "sub/b.txt")).exists);
        assert!(!processor.process_item(&item(source, "sub/c.txt")).exists);
    }

    #[test]
    fn empty_substitutions_are_flagged() {
        let tmp = TempDir::new().unwrap();
        let source = tmp.path().join("a.txt");

        let processor = processor();
        let some = processor.process_item(&item(source.clone(), "$(artist)$(album).txt"));
        assert!(some.has_empty);
        assert!(!some.all_empty);

        let all = processor.process_item(&item(source.clone(), "$(album)$[true].txt"));
        assert!(all.has_empty);
        assert!(all.all_empty);

        let none = processor.process_item(&item(source, "plain.txt"));
        assert!(!none.has_empty);
        assert!(!none.all_empty);
    }

    #[test]
    fn process_keeps_request_order() {
        let tmp = TempDir::new().unwrap();
        let request = ProcessRequest {
            sequence: 9,
            items: vec![
                item(tmp.path().join("1"), "x"),
                item(tmp.path().join("2"), "y"),
            ],
        };
        let reply = processor().process(&request);
        assert_eq!(reply.sequence, 9);
        let sources: Vec<_> = reply.results.iter().map(|r| r.source.clone()).collect();
        assert_eq!(sources, vec![tmp.path().join("1"), tmp.path().join("2")]);
    }

    #[tokio::test]
    async fn worker_replies_to_submitted_request() {
        let tmp = TempDir::new().unwrap();
        let (handle, mut replies) = RenameProcessor::spawn(processor());

        let sequence = handle
            .submit(ProcessRequest {
                sequence: 1,
                items: vec![item(tmp.path().join("a.mp3"), "$(artist).mp3")],
            })
            .unwrap();
        assert_eq!(sequence, 1);

        let reply = replies.recv().await.unwrap();
        assert_eq!(reply.sequence, 1);
        assert_eq!(reply.results[0].edits[0].replacement, "Queen");
    }

    #[tokio::test]
    async fn last_reply_answers_newest_request() {
        let tmp = TempDir::new().unwrap();
        let (handle, mut replies) = RenameProcessor::spawn(processor());

        for sequence in 1..=3 {
            handle
                .submit(ProcessRequest {
                    sequence,
                    items: vec![item(tmp.path().join("a"), "b")],
                })
                .unwrap();
        }
        drop(handle);

        let mut last = None;
        while let Some(reply) = replies.recv().await {
            last = Some(reply.sequence);
        }
        assert_eq!(last, Some(3));
    }

    #[tokio::test]
    async fn dropping_handle_closes_reply_channel() {
        let (handle, mut replies) = RenameProcessor::spawn(processor());
        drop(handle);
        assert!(replies.recv().await.is_none());
    }
}

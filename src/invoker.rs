//! Sequential model invocation over a batch of chunks.
//!
//! Each chunk gets exactly one call, in order, and the next call does not start
//! until the previous one returned. The first failure abandons the batch:
//!
//! ```text
//! batch:   [c1, c2, c3]
//! calls:    ok  err  -       <- c3 is never sent
//! result:  Err(ChunkInvocation { index: 2, .. })
//! ```
//!
//! Nothing is retried here; wrap the model in [`Retrying`](crate::Retrying) for
//! that.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::model::{Model, ModelError};
use crate::{Error, Result};

/// Progress notification, sent before each chunk call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    /// One-based index of the chunk about to be sent.
    pub index: usize,
    /// Number of chunks in the batch.
    pub total: usize,
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Processing chunk {} of {}...", self.index, self.total)
    }
}

/// A shared flag asking a running batch to stop.
///
/// The flag is checked before each chunk call and, when the model is wrapped in
/// [`Retrying`](crate::Retrying) with the same token, before each retry and
/// during backoff. A request already in flight is not aborted; it ends when the
/// server answers or the request timeout expires.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Clear the flag so the token can guard another run.
    pub fn reset(&self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

type ProgressFn = Box<dyn Fn(Progress) + Send + Sync>;

/// Sends every chunk of a batch to a [`Model`] with the same instruction.
pub struct ModelInvoker<M> {
    model: M,
    progress: Option<ProgressFn>,
    cancel: Option<CancelToken>,
}

impl<M: Model> ModelInvoker<M> {
    /// Wrap `model`.
    pub fn new(model: M) -> Self {
        Self {
            model,
            progress: None,
            cancel: None,
        }
    }

    /// Call `observer` before each chunk is sent.
    #[must_use]
    pub fn with_progress(mut self, observer: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Box::new(observer));
        self
    }

    /// Stop between chunks once `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// The wrapped model.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Run `instruction` against every chunk of `batch`, in order.
    ///
    /// Returns one text per chunk, in batch order. A chunk whose response has
    /// no text contributes an empty string.
    ///
    /// # Errors
    ///
    /// - [`Error::ChunkInvocation`] for the first chunk whose call failed,
    ///   with its one-based index. Later chunks are not sent.
    /// - [`Error::Cancelled`] if the cancel token was set between calls, or a
    ///   call failed after it was set.
    pub fn invoke_all<S: AsRef<str>>(&self, batch: &[S], instruction: &str) -> Result<Vec<String>> {
        let total = batch.len();
        let mut results = Vec::with_capacity(total);

        for (offset, chunk) in batch.iter().enumerate() {
            if self.is_cancelled() {
                return Err(Error::Cancelled {
                    completed: results.len(),
                });
            }

            let index = offset + 1;
            if let Some(observer) = &self.progress {
                observer(Progress { index, total });
            }

            let response = match self.model.generate(instruction, chunk.as_ref()) {
                Ok(response) => response,
                Err(err) if matches!(err, ModelError::Cancelled) || self.is_cancelled() => {
                    return Err(Error::Cancelled {
                        completed: results.len(),
                    });
                }
                Err(source) => return Err(Error::ChunkInvocation { index, source }),
            };
            results.push(response.text());
        }

        Ok(results)
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl<M> fmt::Debug for ModelInvoker<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelInvoker")
            .field("progress", &self.progress.is_some())
            .field("cancel", &self.cancel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Response;
    use std::sync::Mutex;

    /// Echoes the chunk back, failing on one chosen call.
    #[derive(Default)]
    struct Scripted {
        fail_on: Option<usize>,
        seen: Mutex<Vec<(String, String)>>,
    }

    impl Model for Scripted {
        fn generate(&self, instruction: &str, chunk: &str) -> std::result::Result<Response, ModelError> {
            let mut seen = self.seen.lock().unwrap();
            seen.push((instruction.to_owned(), chunk.to_owned()));
            if self.fail_on == Some(seen.len()) {
                return Err(ModelError::Status {
                    status: 500,
                    body: "boom".into(),
                });
            }
            Ok(Response::from_text(chunk.to_uppercase()))
        }
    }

    #[test]
    fn test_results_in_batch_order() {
        let invoker = ModelInvoker::new(Scripted::default());
        let results = invoker.invoke_all(&["a", "b", "c"], "shout").unwrap();
        assert_eq!(results, ["A", "B", "C"]);

        let seen = invoker.model().seen.lock().unwrap();
        assert!(seen.iter().all(|(instruction, _)| instruction == "shout"));
    }

    #[test]
    fn test_first_failure_aborts() {
        let invoker = ModelInvoker::new(Scripted {
            fail_on: Some(2),
            ..Scripted::default()
        });
        let err = invoker.invoke_all(&["a", "b", "c"], "x").unwrap_err();

        assert!(matches!(err, Error::ChunkInvocation { index: 2, .. }));
        assert_eq!(invoker.model().seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_empty_batch_makes_no_calls() {
        let invoker = ModelInvoker::new(Scripted::default());
        let batch: [&str; 0] = [];
        assert!(invoker.invoke_all(&batch, "x").unwrap().is_empty());
        assert!(invoker.model().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_progress_reported_before_each_call() {
        let reports = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&reports);
        let invoker = ModelInvoker::new(Scripted::default())
            .with_progress(move |progress| sink.lock().unwrap().push(progress));

        invoker.invoke_all(&["a", "b"], "x").unwrap();

        let reports = reports.lock().unwrap();
        assert_eq!(
            *reports,
            [
                Progress { index: 1, total: 2 },
                Progress { index: 2, total: 2 }
            ]
        );
        assert_eq!(reports[0].to_string(), "Processing chunk 1 of 2...");
    }

    #[test]
    fn test_cancelled_token_stops_before_first_call() {
        let token = CancelToken::new();
        token.cancel();
        let invoker = ModelInvoker::new(Scripted::default()).with_cancel(token.clone());

        let err = invoker.invoke_all(&["a", "b"], "x").unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed: 0 }));
        assert!(invoker.model().seen.lock().unwrap().is_empty());

        token.reset();
        assert_eq!(invoker.invoke_all(&["a"], "x").unwrap(), ["A"]);
    }

    #[test]
    fn test_failure_after_cancel_is_cancellation() {
        struct CancelsThenFails(CancelToken);

        impl Model for CancelsThenFails {
            fn generate(&self, _: &str, _: &str) -> std::result::Result<Response, ModelError> {
                self.0.cancel();
                Err(ModelError::transient("interrupted"))
            }
        }

        let token = CancelToken::new();
        let invoker = ModelInvoker::new(CancelsThenFails(token.clone())).with_cancel(token);

        let err = invoker.invoke_all(&["a", "b"], "x").unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed: 0 }));
    }

    #[test]
    fn test_cancelled_model_error_maps_to_cancellation() {
        struct Abandons;

        impl Model for Abandons {
            fn generate(&self, _: &str, _: &str) -> std::result::Result<Response, ModelError> {
                Err(ModelError::Cancelled)
            }
        }

        let err = ModelInvoker::new(Abandons).invoke_all(&["a"], "x").unwrap_err();
        assert!(matches!(err, Error::Cancelled { completed: 0 }));
    }
}

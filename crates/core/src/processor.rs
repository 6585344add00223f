//! Background keyword processor
//!
//! A dedicated worker thread owns a [`Pipeline`] and talks to its client
//! over two `mpsc` channels: requests go in, progress and terminal
//! responses come out. Nothing is shared between the two sides except the
//! channels, so the client stays responsive while a large list is grouped.
//!
//! Every accepted `Process` request produces exactly one terminal response
//! (`Complete`, `Cancelled` or `Error`), preceded by non-decreasing
//! `Progress` events.

use crate::enrich::MetadataMap;
use crate::grouping::GroupingObserver;
use crate::pipeline::{Pipeline, ProcessOutput};
use crate::record::{KeywordGroup, KeywordRecord};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Message sent from the client to the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessRequest {
    Process {
        keywords: Vec<KeywordRecord>,
        #[serde(rename = "keywordMeta", default, skip_serializing_if = "Option::is_none")]
        keyword_meta: Option<MetadataMap>,
    },
    Cancel,
    Shutdown,
}

/// Message sent from the worker to the client
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProcessResponse {
    Progress {
        progress: u8,
        message: String,
    },
    Complete {
        results: Vec<KeywordRecord>,
        groups: Vec<KeywordGroup>,
        progress: u8,
    },
    Error {
        error: String,
    },
    Cancelled {
        message: String,
    },
}

impl ProcessResponse {
    /// Whether this response ends the current request
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProcessResponse::Progress { .. })
    }
}

/// Lifecycle of a processing request
///
/// Terminal states are passed through on the way back to `Idle`; the client
/// keeps the most recent one as [`KeywordProcessor::last_outcome`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessorState {
    #[default]
    Idle,
    Processing,
    Complete,
    Cancelled,
    Error,
}

impl ProcessorState {
    /// Whether a new request may be submitted
    pub fn accepts_requests(&self) -> bool {
        !matches!(self, ProcessorState::Processing)
    }
}

/// Client side of a background keyword processor
///
/// Dropping the processor cancels any request in flight and joins the
/// worker thread.
pub struct KeywordProcessor {
    requests: Option<Sender<ProcessRequest>>,
    responses: Receiver<ProcessResponse>,
    state: ProcessorState,
    last_outcome: Option<ProcessorState>,
    worker: Option<JoinHandle<()>>,
}

impl KeywordProcessor {
    /// Start a worker thread that runs `pipeline` for every request
    pub fn spawn(pipeline: Pipeline) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("kwgroup-worker".to_string())
            .spawn(move || run_worker(pipeline, request_rx, response_tx))
            .map_err(|e| Error::Worker(format!("failed to spawn worker thread: {}", e)))?;

        Ok(Self {
            requests: Some(request_tx),
            responses: response_rx,
            state: ProcessorState::Idle,
            last_outcome: None,
            worker: Some(worker),
        })
    }

    /// `Processing` while a request is in flight, `Idle` otherwise
    pub fn state(&self) -> ProcessorState {
        self.state
    }

    /// Terminal state of the most recently finished request
    pub fn last_outcome(&self) -> Option<ProcessorState> {
        self.last_outcome
    }

    /// Send a processing request
    ///
    /// Fails with [`Error::Busy`] while a previous request has not yet
    /// delivered its terminal response; nothing is sent in that case.
    pub fn submit(&mut self, keywords: Vec<KeywordRecord>, keyword_meta: Option<MetadataMap>) -> Result<()> {
        if !self.state.accepts_requests() {
            return Err(Error::Busy);
        }
        debug!("Submitting {} keywords", keywords.len());
        self.send(ProcessRequest::Process { keywords, keyword_meta })?;
        self.state = ProcessorState::Processing;
        Ok(())
    }

    /// Ask the worker to abandon the request in flight
    ///
    /// A no-op when nothing is being processed.
    pub fn cancel(&self) -> Result<()> {
        if self.state != ProcessorState::Processing {
            return Ok(());
        }
        self.send(ProcessRequest::Cancel)
    }

    /// Handle that can cancel from another thread
    pub fn canceller(&self) -> Result<CancelHandle> {
        let sender = self.requests.as_ref().ok_or(Error::ProcessorClosed)?;
        Ok(CancelHandle {
            requests: sender.clone(),
        })
    }

    /// Next response if one is already waiting
    pub fn try_next(&mut self) -> Result<Option<ProcessResponse>> {
        match self.responses.try_recv() {
            Ok(response) => {
                self.observe(&response);
                Ok(Some(response))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::ProcessorClosed),
        }
    }

    /// Block until the next response arrives
    pub fn next_response(&mut self) -> Result<ProcessResponse> {
        let response = self.responses.recv().map_err(|_| Error::ProcessorClosed)?;
        self.observe(&response);
        Ok(response)
    }

    /// Block until the request in flight finishes, forwarding progress
    pub fn wait<F>(&mut self, mut on_progress: F) -> Result<ProcessOutput>
    where
        F: FnMut(u8, &str),
    {
        if self.state != ProcessorState::Processing {
            return Err(Error::NotProcessing);
        }

        loop {
            match self.next_response()? {
                ProcessResponse::Progress { progress, message } => on_progress(progress, &message),
                ProcessResponse::Complete { results, groups, .. } => {
                    return Ok(ProcessOutput { results, groups });
                }
                ProcessResponse::Cancelled { .. } => return Err(Error::Cancelled),
                ProcessResponse::Error { error } => return Err(Error::Worker(error)),
            }
        }
    }

    /// Submit and wait in one call
    pub fn process<F>(
        &mut self,
        keywords: Vec<KeywordRecord>,
        keyword_meta: Option<MetadataMap>,
        on_progress: F,
    ) -> Result<ProcessOutput>
    where
        F: FnMut(u8, &str),
    {
        self.submit(keywords, keyword_meta)?;
        self.wait(on_progress)
    }

    fn send(&self, request: ProcessRequest) -> Result<()> {
        self.requests
            .as_ref()
            .ok_or(Error::ProcessorClosed)?
            .send(request)
            .map_err(|_| Error::ProcessorClosed)
    }

    fn observe(&mut self, response: &ProcessResponse) {
        let outcome = match response {
            ProcessResponse::Progress { .. } => return,
            ProcessResponse::Complete { .. } => ProcessorState::Complete,
            ProcessResponse::Cancelled { .. } => ProcessorState::Cancelled,
            ProcessResponse::Error { .. } => ProcessorState::Error,
        };
        self.last_outcome = Some(outcome);
        self.state = ProcessorState::Idle;
    }
}

impl Drop for KeywordProcessor {
    fn drop(&mut self) {
        if let Some(requests) = self.requests.take() {
            let _ = requests.send(ProcessRequest::Cancel);
            let _ = requests.send(ProcessRequest::Shutdown);
        }
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                error!("Keyword worker thread panicked");
            }
        }
    }
}

/// Cloneable cancellation handle for a [`KeywordProcessor`]
///
/// Unlike [`KeywordProcessor::cancel`] it can't see the client state, so a
/// cancel sent after the request has finished is simply ignored by the
/// worker.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    requests: Sender<ProcessRequest>,
}

impl CancelHandle {
    pub fn cancel(&self) -> Result<()> {
        self.requests
            .send(ProcessRequest::Cancel)
            .map_err(|_| Error::ProcessorClosed)
    }
}

/// Observer that polls the request channel for cancellation and forwards
/// progress to the response channel
struct ChannelObserver<'a> {
    requests: &'a Receiver<ProcessRequest>,
    responses: &'a Sender<ProcessResponse>,
    cancelled: bool,
    shutdown: bool,
    last_progress: u8,
}

impl<'a> ChannelObserver<'a> {
    fn new(requests: &'a Receiver<ProcessRequest>, responses: &'a Sender<ProcessResponse>) -> Self {
        Self {
            requests,
            responses,
            cancelled: false,
            shutdown: false,
            last_progress: 0,
        }
    }

    fn send_progress(&mut self, progress: u8, message: &str) {
        let progress = progress.min(100).max(self.last_progress);
        self.last_progress = progress;
        let _ = self.responses.send(ProcessResponse::Progress {
            progress,
            message: message.to_string(),
        });
    }
}

impl GroupingObserver for ChannelObserver<'_> {
    fn on_progress(&mut self, progress: u8, message: &str) {
        self.send_progress(progress, message);
    }

    fn is_cancelled(&mut self) -> bool {
        while !self.cancelled {
            match self.requests.try_recv() {
                Ok(ProcessRequest::Cancel) => self.cancelled = true,
                // Finish the current request, then stop
                Ok(ProcessRequest::Shutdown) => self.shutdown = true,
                Ok(ProcessRequest::Process { keywords, .. }) => {
                    warn!(
                        "Dropping request for {} keywords received while processing",
                        keywords.len()
                    );
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.cancelled = true;
                    self.shutdown = true;
                }
            }
        }
        self.cancelled
    }
}

/// Work done by the worker for each `Process` request
trait RequestHandler {
    fn handle(
        &self,
        keywords: &[KeywordRecord],
        keyword_meta: Option<&MetadataMap>,
        observer: &mut dyn GroupingObserver,
    ) -> Result<ProcessOutput>;
}

impl RequestHandler for Pipeline {
    fn handle(
        &self,
        keywords: &[KeywordRecord],
        keyword_meta: Option<&MetadataMap>,
        observer: &mut dyn GroupingObserver,
    ) -> Result<ProcessOutput> {
        self.run_with(keywords, keyword_meta, observer)
    }
}

fn transition(state: &mut ProcessorState, next: ProcessorState) {
    debug!("Worker state {:?} -> {:?}", state, next);
    *state = next;
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "worker panicked".to_string()
    }
}

/// Worker loop: serve requests until shutdown or until the client goes away
fn run_worker<H: RequestHandler>(
    handler: H,
    requests: Receiver<ProcessRequest>,
    responses: Sender<ProcessResponse>,
) {
    let mut state = ProcessorState::Idle;
    debug!("Keyword worker started");

    while let Ok(request) = requests.recv() {
        let (keywords, keyword_meta) = match request {
            ProcessRequest::Process { keywords, keyword_meta } => (keywords, keyword_meta),
            ProcessRequest::Cancel => {
                debug!("Ignoring cancel with no request in flight");
                continue;
            }
            ProcessRequest::Shutdown => break,
        };

        transition(&mut state, ProcessorState::Processing);
        info!("Processing {} keywords", keywords.len());

        let mut observer = ChannelObserver::new(&requests, &responses);
        observer.send_progress(0, "Starting keyword processing...");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            handler.handle(&keywords, keyword_meta.as_ref(), &mut observer)
        }));

        let response = match outcome {
            Ok(Ok(output)) if !observer.cancelled => {
                observer.send_progress(100, "Processing complete");
                transition(&mut state, ProcessorState::Complete);
                info!("Processing complete: {} groups", output.groups.len());
                ProcessResponse::Complete {
                    results: output.results,
                    groups: output.groups,
                    progress: 100,
                }
            }
            Ok(Ok(_)) | Ok(Err(Error::Cancelled)) => {
                transition(&mut state, ProcessorState::Cancelled);
                info!("Processing cancelled");
                ProcessResponse::Cancelled {
                    message: "Processing cancelled".to_string(),
                }
            }
            Ok(Err(e)) => {
                transition(&mut state, ProcessorState::Error);
                error!("Processing failed: {}", e);
                ProcessResponse::Error { error: e.to_string() }
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                transition(&mut state, ProcessorState::Error);
                error!("Processing panicked: {}", message);
                ProcessResponse::Error { error: message }
            }
        };

        let shutdown = observer.shutdown;
        let delivered = responses.send(response).is_ok();
        transition(&mut state, ProcessorState::Idle);
        if !delivered || shutdown {
            break;
        }
    }

    debug!("Keyword worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::KeywordMeta;
    use crate::pipeline::PipelineBuilder;
    use std::cell::Cell;

    fn keywords() -> Vec<KeywordRecord> {
        vec![
            KeywordRecord::new("dog treats").with_volume(50000),
            KeywordRecord::new("dog treat").with_volume(20000),
            KeywordRecord::new("cat toys").with_volume(3000),
        ]
    }

    fn large_input(n: usize) -> Vec<KeywordRecord> {
        (0..n)
            .map(|i| KeywordRecord::new(format!("product {} reviews", i % 5000)).with_volume(i as u64))
            .collect()
    }

    fn terminals(responses: &[ProcessResponse]) -> Vec<&ProcessResponse> {
        responses.iter().filter(|r| r.is_terminal()).collect()
    }

    #[test]
    fn test_process_complete() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        let mut progress = Vec::new();

        let output = processor
            .process(keywords(), None, |p, _| progress.push(p))
            .unwrap();

        assert_eq!(output.groups.len(), 2);
        assert_eq!(output.groups[0].parent().keyword, "dog treats");
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(processor.state(), ProcessorState::Idle);
        assert_eq!(processor.last_outcome(), Some(ProcessorState::Complete));
    }

    #[test]
    fn test_process_with_meta() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        let mut meta = MetadataMap::new();
        meta.insert("cat toys".to_string(), KeywordMeta { search_volume: Some(90000) });

        let output = processor.process(keywords(), Some(meta), |_, _| {}).unwrap();
        assert_eq!(output.groups[0].parent().keyword, "cat toys");
        assert_eq!(output.results[2].search_volume, Some(90000));
    }

    #[test]
    fn test_busy_while_processing() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        processor.submit(keywords(), None).unwrap();
        assert!(matches!(processor.submit(keywords(), None), Err(Error::Busy)));

        let output = processor.wait(|_, _| {}).unwrap();
        assert_eq!(output.keyword_count(), 3);

        // Accepted again once the terminal response was consumed
        assert!(processor.submit(keywords(), None).is_ok());
        assert!(processor.wait(|_, _| {}).is_ok());
    }

    #[test]
    fn test_wait_when_idle() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        assert!(matches!(processor.wait(|_, _| {}), Err(Error::NotProcessing)));
        assert_eq!(processor.state(), ProcessorState::Idle);
        assert_eq!(processor.last_outcome(), None);
        // Cancelling with nothing in flight does nothing
        assert!(processor.cancel().is_ok());
    }

    #[test]
    fn test_empty_input_completes() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        let output = processor.process(Vec::new(), None, |_, _| {}).unwrap();
        assert!(output.groups.is_empty());
        assert!(output.results.is_empty());
    }

    #[test]
    fn test_worker_cancel_then_next_request() {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        request_tx
            .send(ProcessRequest::Process { keywords: large_input(1_000), keyword_meta: None })
            .unwrap();
        request_tx.send(ProcessRequest::Cancel).unwrap();
        request_tx
            .send(ProcessRequest::Process { keywords: keywords(), keyword_meta: None })
            .unwrap();
        request_tx.send(ProcessRequest::Shutdown).unwrap();

        run_worker(Pipeline::default(), request_rx, response_tx);
        let responses: Vec<ProcessResponse> = response_rx.try_iter().collect();

        assert_eq!(
            responses[0],
            ProcessResponse::Progress { progress: 0, message: "Starting keyword processing...".to_string() }
        );

        let ends = terminals(&responses);
        assert_eq!(ends.len(), 2);
        assert_eq!(
            ends[0],
            &ProcessResponse::Cancelled { message: "Processing cancelled".to_string() }
        );
        match ends[1] {
            ProcessResponse::Complete { groups, progress, .. } => {
                assert_eq!(groups.len(), 2);
                assert_eq!(*progress, 100);
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn test_worker_cancel_large_request() {
        let pipelines = [
            Pipeline::default(),
            PipelineBuilder::new().parallel_threshold(10_000).chunk_size(1_000).build().unwrap(),
        ];
        for pipeline in pipelines {
            let (request_tx, request_rx) = mpsc::channel();
            let (response_tx, response_rx) = mpsc::channel();

            request_tx
                .send(ProcessRequest::Process { keywords: large_input(20_000), keyword_meta: None })
                .unwrap();
            request_tx.send(ProcessRequest::Cancel).unwrap();
            request_tx.send(ProcessRequest::Shutdown).unwrap();

            run_worker(pipeline, request_rx, response_tx);
            let responses: Vec<ProcessResponse> = response_rx.try_iter().collect();

            let ends = terminals(&responses);
            assert_eq!(ends.len(), 1);
            assert_eq!(
                ends[0],
                &ProcessResponse::Cancelled { message: "Processing cancelled".to_string() }
            );
            assert!(!responses.iter().any(|r| matches!(r, ProcessResponse::Complete { .. })));
            // Nothing follows the terminal response
            assert!(responses.last().unwrap().is_terminal());
        }
    }

    /// Fails its first request, then runs the default pipeline
    struct FailFirst {
        panics: bool,
        calls: Cell<usize>,
        pipeline: Pipeline,
    }

    impl FailFirst {
        fn new(panics: bool) -> Self {
            Self {
                panics,
                calls: Cell::new(0),
                pipeline: Pipeline::default(),
            }
        }
    }

    impl RequestHandler for FailFirst {
        fn handle(
            &self,
            keywords: &[KeywordRecord],
            keyword_meta: Option<&MetadataMap>,
            observer: &mut dyn GroupingObserver,
        ) -> Result<ProcessOutput> {
            let call = self.calls.get();
            self.calls.set(call + 1);
            if call == 0 {
                observer.on_progress(30, "Grouping keywords...");
                if self.panics {
                    panic!("lemma table corrupted");
                }
                return Err(Error::Worker("lemma table corrupted".to_string()));
            }
            self.pipeline.run_with(keywords, keyword_meta, observer)
        }
    }

    fn run_failing_then_ok(handler: FailFirst) -> Vec<ProcessResponse> {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        for _ in 0..2 {
            request_tx
                .send(ProcessRequest::Process { keywords: keywords(), keyword_meta: None })
                .unwrap();
        }
        request_tx.send(ProcessRequest::Shutdown).unwrap();

        run_worker(handler, request_rx, response_tx);
        response_rx.try_iter().collect()
    }

    fn assert_error_then_complete(responses: &[ProcessResponse]) {
        let ends = terminals(responses);
        assert_eq!(ends.len(), 2);
        match ends[0] {
            ProcessResponse::Error { error } => assert!(error.contains("lemma table corrupted")),
            other => panic!("expected error, got {:?}", other),
        }
        match ends[1] {
            ProcessResponse::Complete { groups, .. } => assert_eq!(groups.len(), 2),
            other => panic!("expected completion, got {:?}", other),
        }

        // The failed request ends at its error: the next event restarts at 0
        let error_at = responses.iter().position(|r| r == ends[0]).unwrap();
        assert_eq!(
            responses[error_at + 1],
            ProcessResponse::Progress { progress: 0, message: "Starting keyword processing...".to_string() }
        );
        let completes = responses
            .iter()
            .filter(|r| matches!(r, ProcessResponse::Complete { .. }))
            .count();
        assert_eq!(completes, 1);
    }

    #[test]
    fn test_worker_error_then_next_request() {
        let responses = run_failing_then_ok(FailFirst::new(false));
        assert_error_then_complete(&responses);
    }

    #[test]
    fn test_worker_panic_becomes_error() {
        let responses = run_failing_then_ok(FailFirst::new(true));
        assert_error_then_complete(&responses);
    }

    #[test]
    fn test_worker_shutdown_mid_request() {
        let (request_tx, request_rx) = mpsc::channel();
        let (response_tx, response_rx) = mpsc::channel();

        request_tx
            .send(ProcessRequest::Process { keywords: keywords(), keyword_meta: None })
            .unwrap();
        request_tx.send(ProcessRequest::Shutdown).unwrap();
        // Never reached: the worker stops after the current request
        request_tx
            .send(ProcessRequest::Process { keywords: keywords(), keyword_meta: None })
            .unwrap();

        run_worker(Pipeline::default(), request_rx, response_tx);
        let responses: Vec<ProcessResponse> = response_rx.try_iter().collect();
        let ends = terminals(&responses);
        assert_eq!(ends.len(), 1);
        assert!(matches!(ends[0], ProcessResponse::Complete { .. }));
    }

    #[test]
    fn test_cancel_through_client() {
        let pipeline = PipelineBuilder::new().cancel_check_every(50).build().unwrap();
        let mut processor = KeywordProcessor::spawn(pipeline).unwrap();
        let input = large_input(20_000);

        processor.submit(input.clone(), None).unwrap();
        processor.cancel().unwrap();
        match processor.wait(|_, _| {}) {
            Err(Error::Cancelled) => {
                assert_eq!(processor.last_outcome(), Some(ProcessorState::Cancelled))
            }
            // The worker may finish before it sees the cancel
            Ok(output) => {
                assert_eq!(output.keyword_count(), input.len());
                assert_eq!(processor.last_outcome(), Some(ProcessorState::Complete));
            }
            Err(e) => panic!("unexpected error: {}", e),
        }

        let output = processor.process(keywords(), None, |_, _| {}).unwrap();
        assert_eq!(output.groups.len(), 2);
    }

    #[test]
    fn test_cancel_handle_from_other_thread() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        let handle = processor.canceller().unwrap();

        processor.submit(large_input(20_000), None).unwrap();
        thread::spawn(move || handle.cancel().unwrap()).join().unwrap();

        let result = processor.wait(|_, _| {});
        assert!(matches!(result, Ok(_) | Err(Error::Cancelled)));
        assert!(processor.state().accepts_requests());
    }

    #[test]
    fn test_drop_while_processing() {
        let mut processor = KeywordProcessor::spawn(Pipeline::default()).unwrap();
        processor.submit(large_input(20_000), None).unwrap();
        drop(processor);
    }

    #[test]
    fn test_response_json_shape() {
        let progress = ProcessResponse::Progress { progress: 42, message: "Grouping".to_string() };
        let value = serde_json::to_value(&progress).unwrap();
        assert_eq!(value["type"], "PROGRESS");
        assert_eq!(value["progress"], 42);

        let cancelled = ProcessResponse::Cancelled { message: "Processing cancelled".to_string() };
        assert_eq!(serde_json::to_value(&cancelled).unwrap()["type"], "CANCELLED");

        let complete = ProcessResponse::Complete { results: keywords(), groups: Vec::new(), progress: 100 };
        let value = serde_json::to_value(&complete).unwrap();
        assert_eq!(value["type"], "COMPLETE");
        assert_eq!(value["results"][0]["keyword"], "dog treats");
    }

    #[test]
    fn test_request_from_json() {
        let request: ProcessRequest = serde_json::from_str(
            r#"{"type": "PROCESS", "keywords": [{"keyword": "dog treats"}], "keywordMeta": {"dog treats": {"searchVolume": 10}}}"#,
        )
        .unwrap();
        match request {
            ProcessRequest::Process { keywords, keyword_meta } => {
                assert_eq!(keywords.len(), 1);
                assert_eq!(keyword_meta.unwrap()["dog treats"].search_volume, Some(10));
            }
            other => panic!("unexpected request {:?}", other),
        }

        let cancel: ProcessRequest = serde_json::from_str(r#"{"type": "CANCEL"}"#).unwrap();
        assert_eq!(cancel, ProcessRequest::Cancel);
    }
}

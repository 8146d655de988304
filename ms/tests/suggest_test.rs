//! Integration tests for suggestion runs
//!
//! Exercise the whole pipeline against an in-memory dataset with stub
//! collaborators standing in for the suggestion service, quality assessor,
//! record store and progress persistence.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::json;

use mapsuggest::domain::{AttributeMatch, AttributeRef, OwnedRecordRef, Record, RecordKind, TargetType, Transformation};
use mapsuggest::pairs::ValuePair;
use mapsuggest::progress::{
    FileProgress, ItemStatus, MemoryProgress, ProcessingState, ProgressError, ProgressSink, RunStatus,
};
use mapsuggest::quality::{QualityAssessor, QualityError, SampleQualityAssessor};
use mapsuggest::service::{ServiceError, SuggestMappingRequest, SuggestMappingResponse, SuggestionService};
use mapsuggest::store::{Dataset, MemoryStore, RecordStore, StoreError};
use mapsuggest::suggest::{
    CancelHandle, CancelSignal, MAPPINGS_SUGGESTION_ACTIVITY, RunError, Suggester, SuggestionContext, cancel_pair,
};

// =============================================================================
// Stubs
// =============================================================================

/// Answers from a queue and records every request
#[derive(Default)]
struct ScriptedService {
    responses: Mutex<VecDeque<SuggestMappingResponse>>,
    requests: Mutex<Vec<SuggestMappingRequest>>,
    cancel_on_call: Option<CancelHandle>,
}

impl ScriptedService {
    fn new(responses: Vec<SuggestMappingResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            ..Default::default()
        }
    }

    fn cancelling(mut self, handle: CancelHandle) -> Self {
        self.cancel_on_call = Some(handle);
        self
    }

    fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    fn requests(&self) -> Vec<SuggestMappingRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SuggestionService for ScriptedService {
    async fn suggest_mapping(&self, request: SuggestMappingRequest) -> Result<SuggestMappingResponse, ServiceError> {
        self.requests.lock().unwrap().push(request);
        if let Some(handle) = &self.cancel_on_call {
            handle.cancel();
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| ServiceError::Unavailable("no scripted response left".to_string()))
    }
}

/// Fails the n-th assessment (0-based), delegates the rest
struct FailingAssessor {
    fail_on: usize,
    calls: AtomicUsize,
}

impl FailingAssessor {
    fn new(fail_on: usize) -> Self {
        Self {
            fail_on,
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl QualityAssessor for FailingAssessor {
    async fn assess(
        &self,
        pairs: &[ValuePair],
        target_type: TargetType,
        transformation: Option<&Transformation>,
    ) -> Result<Option<f32>, QualityError> {
        if self.calls.fetch_add(1, Ordering::SeqCst) == self.fail_on {
            return Err(QualityError::Failed("assessor exploded".to_string()));
        }
        SampleQualityAssessor.assess(pairs, target_type, transformation).await
    }
}

/// Counts record fetches; optionally refuses all of them
struct CountingStore {
    inner: MemoryStore,
    fetches: AtomicUsize,
    unavailable: bool,
}

impl CountingStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fetches: AtomicUsize::new(0),
            unavailable: false,
        }
    }

    fn unavailable(inner: MemoryStore) -> Self {
        Self {
            unavailable: true,
            ..Self::new(inner)
        }
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for CountingStore {
    async fn get_record(&self, kind: RecordKind, id: &str) -> Result<Record, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(StoreError::Unavailable("repository offline".to_string()));
        }
        self.inner.get_record(kind, id).await
    }

    async fn sample_owned(&self, limit: usize) -> Result<Vec<OwnedRecordRef>, StoreError> {
        self.inner.sample_owned(limit).await
    }
}

/// Progress sink whose flush starts failing after `ok_flushes` successes
struct FlakyProgress {
    state: ProcessingState,
    ok_flushes: usize,
    flushes: usize,
}

impl FlakyProgress {
    fn new(ok_flushes: usize) -> Self {
        Self {
            state: ProcessingState::new(MAPPINGS_SUGGESTION_ACTIVITY),
            ok_flushes,
            flushes: 0,
        }
    }
}

#[async_trait]
impl ProgressSink for FlakyProgress {
    fn state(&self) -> &ProcessingState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut ProcessingState {
        &mut self.state
    }

    async fn flush(&mut self) -> Result<(), ProgressError> {
        self.flushes += 1;
        if self.flushes > self.ok_flushes {
            return Err(ProgressError::Unavailable("task store rejected update".to_string()));
        }
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

fn dataset() -> MemoryStore {
    let dataset: Dataset = serde_json::from_value(json!({
        "accounts": [
            {
                "id": "acc-1",
                "owner": "u-1",
                "data": {"attributes": {
                    "uid": "jsmith",
                    "mail": "J.Smith@X.COM",
                    "cn": "John Smith",
                    "employeeNumber": "1001",
                    "groups": ["staff", "dev"]
                }}
            },
            {
                "id": "acc-2",
                "owner": "u-2",
                "data": {"attributes": {
                    "uid": "adoe",
                    "mail": "A.Doe@X.COM",
                    "cn": "Ann Doe",
                    "employeeNumber": "1002",
                    "groups": ["staff"]
                }}
            },
            {"id": "acc-orphan", "data": {"attributes": {"uid": "ghost"}}}
        ],
        "subjects": [
            {"id": "u-1", "data": {
                "name": "jsmith",
                "emailAddress": "j.smith@x.com",
                "fullName": "Smith, John",
                "personalNumber": 1001,
                "organization": ["staff"]
            }},
            {"id": "u-2", "data": {
                "name": "adoe",
                "emailAddress": "a.doe@x.com",
                "fullName": "Doe, Ann",
                "personalNumber": 1002,
                "organization": ["staff"]
            }}
        ]
    }))
    .unwrap();
    MemoryStore::from_dataset(dataset)
}

fn refs() -> Vec<OwnedRecordRef> {
    vec![OwnedRecordRef::new("acc-1", "u-1"), OwnedRecordRef::new("acc-2", "u-2")]
}

fn candidate(source: &str, target: &str, target_type: TargetType) -> AttributeMatch {
    AttributeMatch::new(
        AttributeRef::new(source, format!("attributes/ri:{}", source)),
        AttributeRef::new(target, target),
        target_type,
    )
}

fn context(service: Arc<dyn SuggestionService>, store: Arc<dyn RecordStore>) -> SuggestionContext {
    SuggestionContext {
        service,
        assessor: Arc::new(SampleQualityAssessor),
        store,
        cancel: CancelSignal::never(),
    }
}

async fn run(
    ctx: SuggestionContext,
    matches: &[AttributeMatch],
    progress: &mut dyn ProgressSink,
) -> Result<mapsuggest::MappingsSuggestion, RunError> {
    let refs = refs();
    Suggester::new(ctx)
        .suggest_mappings(matches, Some(refs.as_slice()), progress)
        .await
}

// =============================================================================
// Decision chain
// =============================================================================

#[tokio::test]
async fn test_empty_matches_touch_nothing() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let store = Arc::new(CountingStore::new(dataset()));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);

    let result = run(context(service.clone(), store.clone()), &[], &mut progress)
        .await
        .unwrap();

    assert!(result.is_empty());
    assert_eq!(service.call_count(), 0);
    assert_eq!(store.fetches(), 0);
    assert_eq!(progress.flush_count(), 0);
    assert_eq!(progress.state().status, RunStatus::NotStarted);
}

#[tokio::test]
async fn test_equivalent_and_empty_candidates_skip_service() {
    let service = Arc::new(ScriptedService::new(vec![SuggestMappingResponse::script("input")]));
    let store = Arc::new(CountingStore::new(dataset()));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("uid", "name", TargetType::String),
        candidate("employeeNumber", "personalNumber", TargetType::Int),
        candidate("groups", "organization", TargetType::String),
        candidate("telephoneNumber", "telephoneNumber", TargetType::String),
    ];

    let result = run(context(service.clone(), store.clone()), &matches, &mut progress)
        .await
        .unwrap();

    // groups: multi-valued source against a smaller target is not equivalent
    assert_eq!(service.call_count(), 1);
    assert_eq!(result.len(), 4);
    assert!(result.attribute_mappings[0].is_as_is());
    assert!(result.attribute_mappings[1].is_as_is());
    assert!(result.attribute_mappings[2].is_as_is());
    assert!(result.attribute_mappings[3].is_as_is());
    assert_eq!(result.attribute_mappings[1].expected_quality, Some(1.0));
    assert_eq!(result.attribute_mappings[3].expected_quality, None);
    // records preloaded once for the whole run
    assert_eq!(store.fetches(), 4);
}

#[tokio::test]
async fn test_size_mismatch_asks_service_once() {
    let service = Arc::new(ScriptedService::new(vec![SuggestMappingResponse::script(
        "input.findAll { it == 'staff' }",
    )]));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);

    let result = run(
        context(service.clone(), Arc::new(dataset())),
        &[candidate("groups", "organization", TargetType::String)],
        &mut progress,
    )
    .await
    .unwrap();

    assert_eq!(service.call_count(), 1);
    let mapping = &result.attribute_mappings[0];
    assert_eq!(
        mapping.transformation().map(|t| t.script.as_str()),
        Some("input.findAll { it == 'staff' }")
    );
    assert!(mapping.ai_provided);

    let request = &service.requests()[0];
    assert_eq!(request.example.len(), 2);
    assert_eq!(request.example[0].source.value, vec!["staff".to_string(), "dev".to_string()]);
    assert_eq!(request.example[0].target.value, vec!["staff".to_string()]);
}

#[tokio::test]
async fn test_service_sentinel_and_blank_answers_mean_as_is() {
    let service = Arc::new(ScriptedService::new(vec![
        SuggestMappingResponse::as_is(),
        SuggestMappingResponse::default(),
        SuggestMappingResponse::script("input?.toLowerCase()"),
    ]));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("cn", "fullName", TargetType::String),
        candidate("cn", "fullName", TargetType::PolyString),
        candidate("mail", "emailAddress", TargetType::String),
    ];

    let result = run(context(service.clone(), Arc::new(dataset())), &matches, &mut progress)
        .await
        .unwrap();

    assert_eq!(service.call_count(), 3);
    assert!(result.attribute_mappings[0].is_as_is());
    assert!(result.attribute_mappings[1].is_as_is());
    assert_eq!(
        result.attribute_mappings[2].transformation(),
        Some(&Transformation::script("input?.toLowerCase()"))
    );
    assert_eq!(result.attribute_mappings[2].definition.inbound.target_path, "emailAddress");
}

#[tokio::test]
async fn test_repeated_runs_are_identical() {
    let matches = vec![
        candidate("uid", "name", TargetType::String),
        candidate("mail", "emailAddress", TargetType::String),
    ];
    let mut outcomes = Vec::new();
    for _ in 0..2 {
        let service = Arc::new(ScriptedService::new(vec![SuggestMappingResponse::script(
            "input?.toLowerCase()",
        )]));
        let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
        let result = run(context(service.clone(), Arc::new(dataset())), &matches, &mut progress)
            .await
            .unwrap();
        outcomes.push((result, service.requests()));
    }

    assert_eq!(outcomes[0], outcomes[1]);
}

// =============================================================================
// Failure handling
// =============================================================================

#[tokio::test]
async fn test_failing_candidate_is_isolated() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let mut ctx = context(service, Arc::new(dataset()));
    ctx.assessor = Arc::new(FailingAssessor::new(1));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("uid", "name", TargetType::String),
        candidate("employeeNumber", "personalNumber", TargetType::Long),
        candidate("telephoneNumber", "telephoneNumber", TargetType::String),
    ];

    let result = run(ctx, &matches, &mut progress).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.attribute_mappings[0].attribute_match.source.name, "uid");
    assert_eq!(result.attribute_mappings[1].attribute_match.source.name, "telephoneNumber");

    let state = progress.into_state();
    assert_eq!(state.status, RunStatus::Completed);
    assert_eq!(state.expected, 3);
    let statuses: Vec<ItemStatus> = state.items.iter().map(|i| i.status).collect();
    assert_eq!(
        statuses,
        vec![ItemStatus::Succeeded, ItemStatus::Failed, ItemStatus::Succeeded]
    );
}

#[tokio::test]
async fn test_service_failure_fails_only_that_candidate() {
    // no scripted responses: every service call errors
    let service = Arc::new(ScriptedService::new(vec![]));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("mail", "emailAddress", TargetType::String),
        candidate("uid", "name", TargetType::String),
    ];

    let result = run(context(service.clone(), Arc::new(dataset())), &matches, &mut progress)
        .await
        .unwrap();

    assert_eq!(service.call_count(), 1);
    assert_eq!(result.len(), 1);
    assert_eq!(result.attribute_mappings[0].attribute_match.source.name, "uid");
    assert_eq!(progress.state().failed(), 1);
}

#[tokio::test]
async fn test_preload_failure_proceeds_without_examples() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let store = Arc::new(CountingStore::unavailable(dataset()));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("mail", "emailAddress", TargetType::String),
        candidate("uid", "name", TargetType::String),
    ];

    let result = run(context(service.clone(), store), &matches, &mut progress)
        .await
        .unwrap();

    assert_eq!(result.len(), 2);
    assert!(result.iter().all(|m| m.is_as_is()));
    assert_eq!(service.call_count(), 0);
    assert_eq!(progress.state().status, RunStatus::Completed);
}

#[tokio::test]
async fn test_absent_refs_mean_no_examples() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let store = Arc::new(CountingStore::new(dataset()));
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);

    let result = Suggester::new(context(service.clone(), store.clone()))
        .suggest_mappings(
            &[candidate("mail", "emailAddress", TargetType::String)],
            None,
            &mut progress,
        )
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert!(result.attribute_mappings[0].is_as_is());
    assert_eq!(store.fetches(), 0);
    assert_eq!(service.call_count(), 0);
}

#[tokio::test]
async fn test_cancellation_stops_after_current_candidate() {
    let (handle, signal) = cancel_pair();
    let service = Arc::new(
        ScriptedService::new(vec![SuggestMappingResponse::script("input?.toLowerCase()")]).cancelling(handle),
    );
    let mut ctx = context(service.clone(), Arc::new(dataset()));
    ctx.cancel = signal;
    let mut progress = MemoryProgress::new(MAPPINGS_SUGGESTION_ACTIVITY);
    let matches = vec![
        candidate("uid", "name", TargetType::String),
        candidate("mail", "emailAddress", TargetType::String),
        candidate("cn", "fullName", TargetType::String),
    ];

    let result = run(ctx, &matches, &mut progress).await;

    assert!(matches!(result, Err(RunError::Cancelled)));
    assert_eq!(service.call_count(), 1);

    let state = progress.into_state();
    assert_eq!(state.status, RunStatus::Aborted);
    assert_eq!(state.items.len(), 2);
    assert_eq!(state.items[1].status, ItemStatus::Succeeded);
    assert_eq!(state.pending(), 1);
    assert!(state.finished_at.is_some());
}

#[tokio::test]
async fn test_progress_flush_failure_aborts_run() {
    let service = Arc::new(ScriptedService::new(vec![]));
    let mut progress = FlakyProgress::new(1);
    let matches = vec![
        candidate("uid", "name", TargetType::String),
        candidate("cn", "fullName", TargetType::String),
    ];

    let result = run(context(service.clone(), Arc::new(dataset())), &matches, &mut progress).await;

    assert!(matches!(result, Err(RunError::Progress(_))));
    assert_eq!(service.call_count(), 0);
    assert_eq!(progress.state.status, RunStatus::Aborted);
    assert!(progress.state.error.is_some());
    assert_eq!(progress.state.items.len(), 2);
}

#[tokio::test]
async fn test_progress_close_failure_marks_run_aborted() {
    let service = Arc::new(ScriptedService::new(vec![]));
    // one flush per started candidate succeeds, the closing flush fails
    let mut progress = FlakyProgress::new(1);

    let result = run(
        context(service, Arc::new(dataset())),
        &[candidate("uid", "name", TargetType::String)],
        &mut progress,
    )
    .await;

    assert!(matches!(result, Err(RunError::Progress(_))));
    assert_eq!(progress.state.status, RunStatus::Aborted);
    assert!(progress.state.error.is_some());
    assert_eq!(progress.state.items[0].status, ItemStatus::Succeeded);
}

// =============================================================================
// File progress
// =============================================================================

#[tokio::test]
async fn test_file_progress_snapshot_after_run() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("progress").join("run.json");
    let mut progress = FileProgress::new(MAPPINGS_SUGGESTION_ACTIVITY, &path);
    let service = Arc::new(ScriptedService::new(vec![]));

    run(
        context(service, Arc::new(dataset())),
        &[candidate("uid", "name", TargetType::String)],
        &mut progress,
    )
    .await
    .unwrap();

    let snapshot = FileProgress::read_snapshot(&path).await.unwrap();
    assert_eq!(snapshot.status, RunStatus::Completed);
    assert_eq!(snapshot.activity, MAPPINGS_SUGGESTION_ACTIVITY);
    assert_eq!(snapshot.succeeded(), 1);
    assert_eq!(&snapshot, progress.state());
}

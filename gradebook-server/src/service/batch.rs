//! Batch Orchestrator
//!
//! Grades a whole roster in one call. Each entry runs its own pipeline
//! (parse address, resolve submission, grade) in a separate task, bounded by a
//! semaphore. Every failure inside a pipeline becomes that entry's terminal
//! result; the batch itself only fails on a malformed request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use gradebook_client::SourceError;
use gradebook_core::domain::grade::{GradeResult, feedback};
use gradebook_core::domain::roster::{BatchResult, GradedEntry, RosterEntry};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::service::address::parse_repository_address;
use crate::service::grading::GradingService;
use crate::service::resolver::CodeResolver;

/// Default number of entry pipelines in flight at once
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("invalid batch request: {0}")]
    InvalidRequest(String),
}

pub type Result<T> = std::result::Result<T, BatchError>;

/// Outcome of one entry's pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryOutcome {
    pub grade: GradeResult,
    pub graded_file_url: Option<String>,
}

impl EntryOutcome {
    fn failed(feedback: &str) -> Self {
        Self {
            grade: GradeResult::zero(feedback),
            graded_file_url: None,
        }
    }
}

/// Feedback classification for a resolution failure
pub fn classify_source_error(err: &SourceError) -> &'static str {
    match err {
        SourceError::NotFound(_) => feedback::REPOSITORY_NOT_FOUND,
        SourceError::RateLimited(_) => feedback::RATE_LIMITED,
        SourceError::Host(_) => feedback::FETCH_FAILED,
    }
}

/// Fans roster entries out across resolver and grader
pub struct BatchOrchestrator {
    resolver: Arc<CodeResolver>,
    grader: Arc<GradingService>,
    semaphore: Arc<Semaphore>,
}

impl BatchOrchestrator {
    pub fn new(resolver: Arc<CodeResolver>, grader: Arc<GradingService>) -> Self {
        Self::with_concurrency(resolver, grader, DEFAULT_MAX_CONCURRENCY)
    }

    /// `max_concurrency` is raised to 1 if zero
    pub fn with_concurrency(
        resolver: Arc<CodeResolver>,
        grader: Arc<GradingService>,
        max_concurrency: usize,
    ) -> Self {
        Self {
            resolver,
            grader,
            semaphore: Arc::new(Semaphore::new(max_concurrency.max(1))),
        }
    }

    /// Grade every roster entry, preserving input order
    pub async fn grade_roster(
        &self,
        reference_solution: &str,
        roster: Vec<RosterEntry>,
        problem_statement: &str,
    ) -> Result<BatchResult> {
        if reference_solution.trim().is_empty() {
            return Err(BatchError::InvalidRequest(
                "reference solution is required".to_string(),
            ));
        }

        let batch_id = Uuid::new_v4();
        let graded_at = Utc::now();
        info!(%batch_id, entries = roster.len(), "Grading roster");

        let reference: Arc<str> = Arc::from(reference_solution);
        let problem: Arc<str> = Arc::from(problem_statement);

        let handles = roster
            .iter()
            .enumerate()
            .map(|(index, entry)| {
                let resolver = Arc::clone(&self.resolver);
                let grader = Arc::clone(&self.grader);
                let semaphore = Arc::clone(&self.semaphore);
                let reference = Arc::clone(&reference);
                let problem = Arc::clone(&problem);
                let address = entry.repository_address.clone();

                tokio::spawn(async move {
                    // The semaphore is never closed
                    let _permit = semaphore.acquire_owned().await.ok();
                    debug!(%batch_id, index, "Entry pipeline started");
                    run_entry(&resolver, &grader, &address, &reference, &problem).await
                })
            })
            .collect();
        let mut tasks = EntryTasks(handles);

        let mut entries = Vec::with_capacity(roster.len());
        for (index, (entry, handle)) in roster.into_iter().zip(tasks.0.iter_mut()).enumerate() {
            let outcome = match handle.await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!(%batch_id, index, "Entry pipeline panicked: {}", e);
                    EntryOutcome::failed(feedback::INTERNAL_ERROR)
                }
            };
            entries.push(assemble(entry, outcome, graded_at));
        }

        info!(%batch_id, entries = entries.len(), "Roster graded");
        Ok(BatchResult { entries })
    }
}

/// In-flight entry pipelines, aborted if the batch is dropped before they finish
struct EntryTasks(Vec<JoinHandle<EntryOutcome>>);

impl Drop for EntryTasks {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

fn assemble(entry: RosterEntry, outcome: EntryOutcome, graded_at: DateTime<Utc>) -> GradedEntry {
    GradedEntry::new(entry, outcome.grade, outcome.graded_file_url, graded_at)
}

/// One entry's pipeline; never fails
async fn run_entry(
    resolver: &CodeResolver,
    grader: &GradingService,
    address: &str,
    reference: &str,
    problem: &str,
) -> EntryOutcome {
    let repo = match parse_repository_address(address) {
        Ok(repo) => repo,
        Err(e) => {
            warn!("Skipping entry: {}", e);
            return EntryOutcome::failed(feedback::UNPARSEABLE_ADDRESS);
        }
    };

    let submission = match resolver.resolve(&repo).await {
        Ok(Some(submission)) => submission,
        Ok(None) => {
            debug!("{}: no source file found", repo);
            return EntryOutcome {
                grade: GradeResult::no_code_found(),
                graded_file_url: None,
            };
        }
        Err(e) => {
            warn!("{}: fetch failed: {}", repo, e);
            return EntryOutcome::failed(classify_source_error(&e));
        }
    };

    debug!("{}: grading {}", repo, submission.filename);
    let grade = grader
        .grade(reference, Some(&submission.source_text), problem)
        .await;

    EntryOutcome {
        grade,
        graded_file_url: Some(submission.source_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::grading::tests::ScriptedOracle;
    use crate::service::resolver::tests::{FakeHost, FakeRepo, file, latest};
    use async_trait::async_trait;
    use gradebook_client::SourceHost;
    use gradebook_client::source_host::SourceResult;
    use gradebook_core::domain::repository::{FileRef, HistoryEntry, HistorySummary, RepositoryRef};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn orchestrator(host: FakeHost, oracle: ScriptedOracle) -> BatchOrchestrator {
        BatchOrchestrator::with_concurrency(
            Arc::new(CodeResolver::new(Arc::new(host))),
            Arc::new(GradingService::new(Arc::new(oracle))),
            2,
        )
    }

    /// Oracle double scoring by a marker embedded in the candidate source
    fn marker_oracle() -> ScriptedOracle {
        ScriptedOracle::new(|prompt| {
            let marks = if prompt.contains("SCORE90") {
                90
            } else if prompt.contains("SCORE55") {
                55
            } else {
                10
            };
            Ok(format!(
                "Here you go: {{\"marks\": {marks}, \"feedback\": \"scored {marks}\"}}"
            ))
        })
    }

    #[tokio::test]
    async fn test_mixed_roster_preserves_order() {
        let host = FakeHost::default()
            .with_repo("ada/good", latest("c1", &["solve.py"]))
            .with_raw("raw://solve.py", "# SCORE90");
        let orchestrator = orchestrator(host, marker_oracle());

        let roster = vec![
            RosterEntry::new("https://github.com/ada/good").with_identity("name", "Ada"),
            RosterEntry::new("https://github.com/ada").with_identity("name", "Bob"),
            RosterEntry::new("https://github.com/ada/missing").with_identity("name", "Cy"),
        ];

        let result = orchestrator
            .grade_roster("reference", roster, "problem")
            .await
            .unwrap();

        assert_eq!(result.entries.len(), 3);

        let first = &result.entries[0];
        assert_eq!(first.entry.display_name(), Some("Ada"));
        assert_eq!(first.marks, 90);
        assert_eq!(first.feedback, "scored 90");
        assert_eq!(first.graded_file_url.as_deref(), Some("view://solve.py"));

        let second = &result.entries[1];
        assert_eq!(second.entry.display_name(), Some("Bob"));
        assert_eq!((second.marks, second.feedback.as_str()), (0, "unparseable address"));
        assert_eq!(second.graded_file_url, None);

        let third = &result.entries[2];
        assert_eq!(third.entry.display_name(), Some("Cy"));
        assert_eq!((third.marks, third.feedback.as_str()), (0, "repository not found"));
    }

    #[tokio::test]
    async fn test_absent_submission_is_not_graded() {
        let host = FakeHost::default().with_repo(
            "ada/docs",
            FakeRepo {
                history: Some(vec![]),
                listing: Some(vec![file("README.md")]),
                ..Default::default()
            },
        );
        let oracle = Arc::new(marker_oracle());
        let orchestrator = BatchOrchestrator::new(
            Arc::new(CodeResolver::new(Arc::new(host))),
            Arc::new(GradingService::new(oracle.clone())),
        );

        let result = orchestrator
            .grade_roster("reference", vec![RosterEntry::new("https://github.com/ada/docs")], "")
            .await
            .unwrap();

        let entry = &result.entries[0];
        assert_eq!((entry.marks, entry.feedback.as_str()), (0, "no code found"));
        assert_eq!(entry.graded_file_url, None);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_host_failures_are_classified() {
        let host = FakeHost::default()
            .with_repo(
                "ada/limited",
                FakeRepo {
                    listing_error: Some(|| SourceError::RateLimited("quota".to_string())),
                    ..Default::default()
                },
            )
            .with_repo(
                "ada/broken",
                FakeRepo {
                    listing_error: Some(|| SourceError::Host("502".to_string())),
                    ..Default::default()
                },
            );
        let orchestrator = orchestrator(host, marker_oracle());

        let result = orchestrator
            .grade_roster(
                "reference",
                vec![
                    RosterEntry::new("https://github.com/ada/limited"),
                    RosterEntry::new("https://github.com/ada/broken"),
                ],
                "problem",
            )
            .await
            .unwrap();

        let feedback: Vec<&str> = result.entries.iter().map(|e| e.feedback.as_str()).collect();
        assert_eq!(feedback, vec!["rate limited", "fetch failed"]);
        assert!(result.entries.iter().all(|e| e.marks == 0));
    }

    #[tokio::test]
    async fn test_large_roster_keeps_positions() {
        let mut host = FakeHost::default();
        let mut roster = Vec::new();
        for i in 0..25 {
            let name = format!("repo{i}");
            let path = format!("s{i}.py");
            let marker = if i % 2 == 0 { "SCORE90" } else { "SCORE55" };
            host = host
                .with_repo(&format!("ada/{name}"), latest(&format!("c{i}"), &[path.as_str()]))
                .with_raw(&format!("raw://{path}"), marker);
            roster.push(RosterEntry::new(format!("https://github.com/ada/{name}")).with_identity("seq", i));
        }
        let orchestrator = orchestrator(host, marker_oracle());

        let result = orchestrator.grade_roster("reference", roster, "p").await.unwrap();

        assert_eq!(result.entries.len(), 25);
        for (i, entry) in result.entries.iter().enumerate() {
            assert_eq!(entry.entry.identity["seq"], i);
            assert_eq!(entry.marks, if i % 2 == 0 { 90 } else { 55 });
            assert_eq!(entry.graded_file_url, Some(format!("view://s{i}.py")));
        }
    }

    #[tokio::test]
    async fn test_identical_inputs_give_identical_results() {
        let build = || {
            FakeHost::default()
                .with_repo("ada/good", latest("c1", &["solve.py"]))
                .with_raw("raw://solve.py", "# SCORE55")
        };
        let roster = vec![
            RosterEntry::new("https://github.com/ada/good"),
            RosterEntry::new("not a url"),
        ];

        let first = orchestrator(build(), marker_oracle())
            .grade_roster("reference", roster.clone(), "p")
            .await
            .unwrap();
        let second = orchestrator(build(), marker_oracle())
            .grade_roster("reference", roster, "p")
            .await
            .unwrap();

        let strip = |r: &BatchResult| {
            r.entries
                .iter()
                .map(|e| (e.entry.clone(), e.marks, e.feedback.clone(), e.graded_file_url.clone()))
                .collect::<Vec<_>>()
        };
        assert_eq!(strip(&first), strip(&second));
    }

    #[tokio::test]
    async fn test_all_entries_share_batch_timestamp() {
        let orchestrator = orchestrator(FakeHost::default(), marker_oracle());
        let roster = vec![RosterEntry::new("x"), RosterEntry::new("y")];

        let result = orchestrator.grade_roster("reference", roster, "p").await.unwrap();

        assert_eq!(result.entries[0].graded_at, result.entries[1].graded_at);
    }

    #[tokio::test]
    async fn test_missing_reference_is_rejected() {
        let orchestrator = orchestrator(FakeHost::default(), marker_oracle());

        let result = orchestrator
            .grade_roster("  ", vec![RosterEntry::new("https://github.com/ada/good")], "p")
            .await;

        assert!(matches!(result, Err(BatchError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_empty_roster_is_empty_result() {
        let orchestrator = orchestrator(FakeHost::default(), marker_oracle());

        let result = orchestrator.grade_roster("reference", vec![], "p").await.unwrap();

        assert!(result.entries.is_empty());
    }

    /// Host double that holds every call for `delay` and tracks overlap
    struct SlowHost {
        delay: std::time::Duration,
        in_flight: AtomicUsize,
        peak: AtomicUsize,
        completed: AtomicUsize,
    }

    impl SlowHost {
        fn new(delay: std::time::Duration) -> Self {
            Self {
                delay,
                in_flight: AtomicUsize::new(0),
                peak: AtomicUsize::new(0),
                completed: AtomicUsize::new(0),
            }
        }

        async fn pause(&self) {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl SourceHost for SlowHost {
        async fn list_recent_history(
            &self,
            repo: &RepositoryRef,
            _limit: usize,
            _path: Option<&str>,
        ) -> SourceResult<Vec<HistorySummary>> {
            self.pause().await;
            Err(SourceError::Host(format!("{repo}: history unavailable")))
        }

        async fn get_history_entry(
            &self,
            repo: &RepositoryRef,
            _entry_id: &str,
        ) -> SourceResult<HistoryEntry> {
            Err(SourceError::Host(repo.to_string()))
        }

        async fn list_directory(&self, repo: &RepositoryRef, _path: &str) -> SourceResult<Vec<FileRef>> {
            self.pause().await;
            Err(SourceError::NotFound(repo.to_string()))
        }

        async fn fetch_raw(&self, locator: &str) -> SourceResult<String> {
            Err(SourceError::Host(locator.to_string()))
        }

        async fn get_repository(&self, _repo: &RepositoryRef) -> SourceResult<()> {
            Ok(())
        }
    }

    fn slow_orchestrator(host: Arc<SlowHost>, ceiling: usize) -> BatchOrchestrator {
        BatchOrchestrator::with_concurrency(
            Arc::new(CodeResolver::new(host)),
            Arc::new(GradingService::new(Arc::new(marker_oracle()))),
            ceiling,
        )
    }

    #[tokio::test]
    async fn test_panicking_entry_is_isolated() {
        let host = FakeHost::default()
            .with_repo("ada/first", latest("c1", &["a.py"]))
            .with_repo("ada/crash", latest("c2", &["b.py"]))
            .with_repo("ada/last", latest("c3", &["c.py"]))
            .with_raw("raw://a.py", "# SCORE90")
            .with_raw("raw://b.py", "# CRASH")
            .with_raw("raw://c.py", "# SCORE55");
        let oracle = ScriptedOracle::new(|prompt| {
            if prompt.contains("CRASH") {
                panic!("oracle double blew up");
            }
            let marks = if prompt.contains("SCORE90") { 90 } else { 55 };
            Ok(format!("{{\"marks\": {marks}, \"feedback\": \"ok\"}}"))
        });
        let orchestrator = orchestrator(host, oracle);

        let result = orchestrator
            .grade_roster(
                "reference",
                vec![
                    RosterEntry::new("https://github.com/ada/first").with_identity("seq", 0),
                    RosterEntry::new("https://github.com/ada/crash").with_identity("seq", 1),
                    RosterEntry::new("https://github.com/ada/last").with_identity("seq", 2),
                ],
                "problem",
            )
            .await
            .unwrap();

        let summary: Vec<(u8, &str)> = result
            .entries
            .iter()
            .map(|e| (e.marks, e.feedback.as_str()))
            .collect();
        assert_eq!(summary, vec![(90, "ok"), (0, "internal error"), (55, "ok")]);
        for (i, entry) in result.entries.iter().enumerate() {
            assert_eq!(entry.entry.identity["seq"], i);
        }
        assert_eq!(result.entries[1].graded_file_url, None);
    }

    #[tokio::test]
    async fn test_in_flight_pipelines_never_exceed_ceiling() {
        let host = Arc::new(SlowHost::new(std::time::Duration::from_millis(20)));
        let orchestrator = slow_orchestrator(Arc::clone(&host), 2);
        let roster = (0..8)
            .map(|i| RosterEntry::new(format!("https://github.com/ada/repo{i}")))
            .collect();

        let result = orchestrator.grade_roster("reference", roster, "p").await.unwrap();

        assert_eq!(result.entries.len(), 8);
        assert!(result.entries.iter().all(|e| e.feedback == "repository not found"));
        assert_eq!(host.peak.load(Ordering::SeqCst), 2);
        assert_eq!(host.completed.load(Ordering::SeqCst), 16);
    }

    #[tokio::test]
    async fn test_dropped_batch_stops_its_pipelines() {
        let host = Arc::new(SlowHost::new(std::time::Duration::from_millis(200)));
        let orchestrator = slow_orchestrator(Arc::clone(&host), 4);
        let roster = (0..4)
            .map(|i| RosterEntry::new(format!("https://github.com/ada/repo{i}")))
            .collect();

        let cut_short = tokio::time::timeout(
            std::time::Duration::from_millis(20),
            orchestrator.grade_roster("reference", roster, "p"),
        )
        .await;
        assert!(cut_short.is_err());
        assert_eq!(host.peak.load(Ordering::SeqCst), 4);

        tokio::time::sleep(std::time::Duration::from_millis(400)).await;
        assert_eq!(host.completed.load(Ordering::SeqCst), 0);
    }
}

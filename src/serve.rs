//! JSON-lines serve loop on stdio.
//!
//! One request per line in, one event per line out. Editors stream `change`
//! events as a buffer is edited; the loop debounces per file, reruns the
//! advisor once the file goes quiet, and answers with a `jobs` event (an
//! empty `jobs` array tells the editor to clear stale advice). `accept`,
//! `reject`, and `list` are answered immediately. Malformed input produces
//! an `error` event; only EOF or a broken pipe ends the loop.

use std::collections::HashMap;
use std::io::{self, Write};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::time::Instant;
use tracing::{debug, info};

use nudge_core::error::{NudgeError, OutputErrorCode};
use nudge_core::job::JobId;
use nudge_core::types::Position;

use crate::engine::Engine;
use crate::output::{
    emit_response_compact, AcceptedEvent, ErrorEvent, JobView, JobsEvent, ListEvent,
    RejectedEvent,
};

// ============================================================================
// Client requests
// ============================================================================

/// One request line from the client.
#[derive(Debug, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum ClientEvent {
    /// The buffer for `path` changed; advise once the file goes quiet.
    Change { path: String, text: String },
    /// Apply a job against the client's current buffer text.
    Accept { job: String, text: String },
    /// Retire a job without applying it.
    Reject { job: String },
    /// Report every live job.
    List,
}

// ============================================================================
// Debouncer
// ============================================================================

/// Per-file debouncer: keeps only the newest text for each path and
/// releases it once the path has been quiet for the configured window.
#[derive(Debug)]
struct Debouncer {
    quiet: Duration,
    pending: HashMap<String, Pending>,
}

#[derive(Debug)]
struct Pending {
    text: String,
    due: Instant,
}

impl Debouncer {
    fn new(quiet: Duration) -> Self {
        Debouncer {
            quiet,
            pending: HashMap::new(),
        }
    }

    /// Record the newest text for `path` and restart its quiet window.
    fn record(&mut self, path: String, text: String) {
        let due = Instant::now() + self.quiet;
        self.pending.insert(path, Pending { text, due });
    }

    /// The earliest pending deadline, if anything is waiting.
    fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().map(|pending| pending.due).min()
    }

    /// Drain every entry whose quiet window has elapsed, in path order.
    fn take_due(&mut self) -> Vec<(String, String)> {
        let now = Instant::now();
        let mut due: Vec<String> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.due <= now)
            .map(|(path, _)| path.clone())
            .collect();
        due.sort();
        due.into_iter()
            .filter_map(|path| {
                self.pending
                    .remove(&path)
                    .map(|pending| (path, pending.text))
            })
            .collect()
    }

    /// Drain everything, deadlines notwithstanding. Used at EOF.
    fn take_all(&mut self) -> Vec<(String, String)> {
        let mut all: Vec<(String, String)> = self
            .pending
            .drain()
            .map(|(path, pending)| (path, pending.text))
            .collect();
        all.sort_by(|a, b| a.0.cmp(&b.0));
        all
    }
}

// ============================================================================
// Session
// ============================================================================

/// Serve session state: the engine plus the per-file debouncer.
#[derive(Debug)]
struct Session {
    engine: Engine,
    debouncer: Debouncer,
}

impl Session {
    fn new(engine: Engine, quiet: Duration) -> Self {
        Session {
            engine,
            debouncer: Debouncer::new(quiet),
        }
    }

    fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    /// Handle one request line. `change` is deferred to the debouncer;
    /// everything else is answered immediately.
    fn handle_line(&mut self, line: &str, out: &mut impl Write) -> io::Result<()> {
        let event = match serde_json::from_str::<ClientEvent>(line) {
            Ok(event) => event,
            Err(err) => {
                let code = OutputErrorCode::InvalidArguments.code();
                let event = ErrorEvent::new(code, format!("malformed request: {}", err));
                return emit(&event, out);
            }
        };

        match event {
            ClientEvent::Change { path, text } => {
                debug!(file = %path, bytes = text.len(), "change queued");
                self.debouncer.record(path, text);
                Ok(())
            }
            ClientEvent::Accept { job, text } => {
                match self.engine.accept(&JobId::from(job.as_str()), &text) {
                    Ok(job) => emit(&AcceptedEvent::new(&job), out),
                    Err(err) => emit(&ErrorEvent::from_error(&err), out),
                }
            }
            ClientEvent::Reject { job } => {
                match self.engine.reject(&JobId::from(job.as_str())) {
                    Ok(job) => emit(&RejectedEvent::new(job.id.to_string()), out),
                    Err(err) => emit(&ErrorEvent::from_error(&err), out),
                }
            }
            ClientEvent::List => {
                let mut views: Vec<JobView> =
                    self.engine.store().iter().map(JobView::from_job).collect();
                views.sort_by(|a, b| {
                    (a.file.as_str(), a.id.as_str()).cmp(&(b.file.as_str(), b.id.as_str()))
                });
                emit(&ListEvent::new(views), out)
            }
        }
    }

    /// Run the advisor for every file whose quiet window has elapsed.
    fn flush_due(&mut self, out: &mut impl Write) -> io::Result<()> {
        for (path, text) in self.debouncer.take_due() {
            self.advise_and_emit(path, text, out)?;
        }
        Ok(())
    }

    /// Advise everything still pending. Run at EOF so a trailing burst of
    /// changes still gets its `jobs` event before the loop exits.
    fn drain(&mut self, out: &mut impl Write) -> io::Result<()> {
        for (path, text) in self.debouncer.take_all() {
            self.advise_and_emit(path, text, out)?;
        }
        Ok(())
    }

    fn advise_and_emit(
        &mut self,
        path: String,
        text: String,
        out: &mut impl Write,
    ) -> io::Result<()> {
        match self.engine.advise_text(&path, &text, Position::default()) {
            Ok(_) => {
                let views: Vec<JobView> = self
                    .engine
                    .store()
                    .jobs_for_file(&path)
                    .into_iter()
                    .map(JobView::from_job)
                    .collect();
                emit(&JobsEvent::new(path, views), out)
            }
            Err(err) => emit(&ErrorEvent::from_error(&err), out),
        }
    }
}

fn emit<T: Serialize>(event: &T, out: &mut impl Write) -> io::Result<()> {
    emit_response_compact(event, out)?;
    out.flush()
}

// ============================================================================
// Loop
// ============================================================================

/// Drive a serve session over stdio until the client closes the stream.
pub async fn run(engine: Engine, quiet: Duration) -> Result<(), NudgeError> {
    let mut session = Session::new(engine, quiet);
    let mut lines = BufReader::new(stdin()).lines();
    let mut out = io::stdout();
    info!(debounce_ms = quiet.as_millis() as u64, "serving on stdio");

    loop {
        let deadline = session.next_deadline();
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    session.handle_line(line, &mut out)?;
                }
                None => break,
            },
            _ = sleep_until_or_forever(deadline) => {
                session.flush_due(&mut out)?;
            }
        }
    }

    session.drain(&mut out)?;
    info!("client closed the stream");
    Ok(())
}

async fn sleep_until_or_forever(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use nudge_core::advisor::AdvisorConfig;
    use serde_json::json;

    const IMPROVABLE: &str = "function a() { b(); }\nfunction b() {}\n";
    const ORDERED: &str = "function a() {}\nfunction b() { a(); }\n";

    fn session(quiet_ms: u64) -> Session {
        Session::new(
            Engine::new(AdvisorConfig::default()),
            Duration::from_millis(quiet_ms),
        )
    }

    fn change_line(path: &str, text: &str) -> String {
        json!({ "event": "change", "path": path, "text": text }).to_string()
    }

    fn events(out: &[u8]) -> Vec<serde_json::Value> {
        String::from_utf8_lossy(out)
            .lines()
            .map(|line| serde_json::from_str(line).expect("valid JSON line"))
            .collect()
    }

    /// Queue a change for `app.ts`, let it fire, and return the job id.
    async fn advised_job_id(session: &mut Session, out: &mut Vec<u8>) -> String {
        session
            .handle_line(&change_line("app.ts", IMPROVABLE), out)
            .unwrap();
        tokio::time::advance(Duration::from_millis(300)).await;
        session.flush_due(out).unwrap();
        let all = events(out);
        all.last().unwrap()["jobs"][0]["id"]
            .as_str()
            .expect("job id")
            .to_string()
    }

    mod debounce {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn quiet_period_elapses_before_advice() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("app.ts", IMPROVABLE), &mut out)
                .unwrap();
            assert!(out.is_empty());
            assert!(session.next_deadline().is_some());

            tokio::time::advance(Duration::from_millis(299)).await;
            session.flush_due(&mut out).unwrap();
            assert!(out.is_empty());

            tokio::time::advance(Duration::from_millis(1)).await;
            session.flush_due(&mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired.len(), 1);
            assert_eq!(fired[0]["event"], "jobs");
            assert_eq!(fired[0]["path"], "app.ts");
            assert_eq!(fired[0]["jobs"].as_array().unwrap().len(), 1);
            assert!(session.next_deadline().is_none());
        }

        #[tokio::test(start_paused = true)]
        async fn burst_coalesces_to_one_run_with_the_newest_text() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("app.ts", "function x() {}\n"), &mut out)
                .unwrap();
            tokio::time::advance(Duration::from_millis(200)).await;
            session
                .handle_line(&change_line("app.ts", IMPROVABLE), &mut out)
                .unwrap();

            // The second change restarted the quiet window.
            tokio::time::advance(Duration::from_millis(200)).await;
            session.flush_due(&mut out).unwrap();
            assert!(out.is_empty());

            tokio::time::advance(Duration::from_millis(100)).await;
            session.flush_due(&mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired.len(), 1);
            assert_eq!(fired[0]["jobs"].as_array().unwrap().len(), 1);
        }

        #[tokio::test(start_paused = true)]
        async fn files_debounce_independently() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("a.ts", IMPROVABLE), &mut out)
                .unwrap();
            tokio::time::advance(Duration::from_millis(150)).await;
            session
                .handle_line(&change_line("b.ts", IMPROVABLE), &mut out)
                .unwrap();

            tokio::time::advance(Duration::from_millis(150)).await;
            session.flush_due(&mut out).unwrap();
            let first = events(&out);
            assert_eq!(first.len(), 1);
            assert_eq!(first[0]["path"], "a.ts");

            tokio::time::advance(Duration::from_millis(150)).await;
            session.flush_due(&mut out).unwrap();
            let both = events(&out);
            assert_eq!(both.len(), 2);
            assert_eq!(both[1]["path"], "b.ts");
        }

        #[tokio::test(start_paused = true)]
        async fn ordered_file_reports_an_empty_jobs_array() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("app.ts", ORDERED), &mut out)
                .unwrap();
            tokio::time::advance(Duration::from_millis(300)).await;
            session.flush_due(&mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "jobs");
            assert_eq!(fired[0]["jobs"].as_array().unwrap().len(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn eof_drain_flushes_pending_changes() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("app.ts", IMPROVABLE), &mut out)
                .unwrap();
            session.drain(&mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired.len(), 1);
            assert_eq!(fired[0]["event"], "jobs");
        }
    }

    mod lifecycle {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn accept_answers_with_the_replacement() {
            let mut session = session(300);
            let mut out = Vec::new();
            let id = advised_job_id(&mut session, &mut out).await;
            out.clear();

            let request = json!({ "event": "accept", "job": id, "text": IMPROVABLE });
            session
                .handle_line(&request.to_string(), &mut out)
                .unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "accepted");
            assert_eq!(fired[0]["job"], id);
            assert_eq!(
                fired[0]["text"],
                "function b() {}\nfunction a() { b(); }\n"
            );
        }

        #[tokio::test(start_paused = true)]
        async fn accept_with_drifted_text_is_a_stale_error() {
            let mut session = session(300);
            let mut out = Vec::new();
            let id = advised_job_id(&mut session, &mut out).await;
            out.clear();

            let drifted = "function a() { b(); c(); }\nfunction b() {}\n";
            let request = json!({ "event": "accept", "job": id, "text": drifted });
            session
                .handle_line(&request.to_string(), &mut out)
                .unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "error");
            assert_eq!(fired[0]["code"], 5);
        }

        #[tokio::test(start_paused = true)]
        async fn reject_retires_the_job() {
            let mut session = session(300);
            let mut out = Vec::new();
            let id = advised_job_id(&mut session, &mut out).await;
            out.clear();

            let request = json!({ "event": "reject", "job": id });
            session
                .handle_line(&request.to_string(), &mut out)
                .unwrap();
            session.handle_line(r#"{"event":"list"}"#, &mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "rejected");
            assert_eq!(fired[0]["job"], id);
            assert_eq!(fired[1]["event"], "list");
            assert_eq!(fired[1]["jobs"].as_array().unwrap().len(), 0);
        }

        #[tokio::test(start_paused = true)]
        async fn list_reports_live_jobs() {
            let mut session = session(300);
            let mut out = Vec::new();
            let id = advised_job_id(&mut session, &mut out).await;
            out.clear();

            session.handle_line(r#"{"event":"list"}"#, &mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "list");
            assert_eq!(fired[0]["jobs"][0]["id"], id);
        }

        #[tokio::test(start_paused = true)]
        async fn unknown_job_is_reported_with_code_3() {
            let mut session = session(300);
            let mut out = Vec::new();

            let request = json!({ "event": "reject", "job": "job_0000000000000000" });
            session
                .handle_line(&request.to_string(), &mut out)
                .unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "error");
            assert_eq!(fired[0]["code"], 3);
        }
    }

    mod protocol {
        use super::*;

        #[test]
        fn malformed_json_is_an_error_event() {
            let mut session = session(300);
            let mut out = Vec::new();

            session.handle_line("this is not json", &mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "error");
            assert_eq!(fired[0]["code"], 2);
        }

        #[test]
        fn unknown_event_name_is_an_error_event() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(r#"{"event":"nuke","path":"a.ts"}"#, &mut out)
                .unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "error");
            assert_eq!(fired[0]["code"], 2);
        }

        #[tokio::test(start_paused = true)]
        async fn unsupported_path_reports_an_error_event() {
            let mut session = session(300);
            let mut out = Vec::new();

            session
                .handle_line(&change_line("notes.md", "# not source\n"), &mut out)
                .unwrap();
            tokio::time::advance(Duration::from_millis(300)).await;
            session.flush_due(&mut out).unwrap();
            let fired = events(&out);
            assert_eq!(fired[0]["event"], "error");
            assert_eq!(fired[0]["code"], 2);
        }
    }
}

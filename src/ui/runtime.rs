use crate::config::DashboardConfig;
use crate::error::ExtractionError;
use crate::session::{Message, Role, Thread};
use crate::ui::dedupe::{ComponentCandidate, DedupeKey, Deduplicator};
use crate::ui::intent::{display_name, infer_subject};
use crate::ui::registry::ComponentRegistry;
use crate::ui::scanner::{contains_marker, scan};
use crate::ui::schema::{split_origin, validate};
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Still streaming, or nothing usable has been extracted yet.
    Watching,
    /// A tool call marker was seen; extraction fires at the pending deadline.
    Settling,
    Accepted,
}

#[derive(Debug, Clone)]
struct MessageState {
    last_observed_len: usize,
    phase: Phase,
    pending_deadline: Option<Instant>,
    accepted_keys: BTreeSet<DedupeKey>,
}

impl Default for MessageState {
    fn default() -> Self {
        Self {
            last_observed_len: 0,
            phase: Phase::Watching,
            pending_deadline: None,
            accepted_keys: BTreeSet::new(),
        }
    }
}

/// Fresh components from one assistant message, ready to be stored.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionBatch {
    pub message_id: String,
    /// Text of the user message that prompted the reply, when there is one.
    pub user_query: Option<String>,
    pub subject: String,
    pub components: Vec<ComponentCandidate>,
}

pub trait ComponentSink {
    /// Stores the batch and returns the ids assigned to its components.
    fn accept(&mut self, batch: ExtractionBatch) -> Result<Vec<String>, ExtractionError>;
}

/// Watches assistant messages as they grow and turns their tool calls into
/// workspace components once each message has been quiet for the debounce window.
pub struct ExtractionRuntime {
    registry: ComponentRegistry,
    debounce: Duration,
    min_message_len: usize,
    states: HashMap<String, MessageState>,
}

impl ExtractionRuntime {
    pub fn new(debounce: Duration, min_message_len: usize) -> Self {
        Self {
            registry: ComponentRegistry::new(),
            debounce,
            min_message_len,
            states: HashMap::new(),
        }
    }

    pub fn from_config(config: &DashboardConfig) -> Self {
        Self::new(config.debounce(), config.min_message_len)
    }

    pub fn observe_thread(&mut self, thread: &Thread, now: Instant) {
        for message in thread.messages() {
            self.observe(message, now);
        }
    }

    pub fn observe(&mut self, message: &Message, now: Instant) {
        if message.role != Role::Assistant {
            return;
        }
        let text = message.text();
        let len = text.len();
        let state = self.states.entry(message.id.clone()).or_default();
        let growing = len != state.last_observed_len;
        if !growing && state.phase == Phase::Accepted {
            return;
        }
        state.last_observed_len = len;

        if contains_marker(&text) {
            if growing {
                state.pending_deadline = Some(now + self.debounce);
                state.phase = Phase::Settling;
            }
            return;
        }

        if len < self.min_message_len || growing {
            state.phase = Phase::Watching;
        } else if len > 0 {
            tracing::debug!(message = %message.id, "reply settled without components");
            state.phase = Phase::Accepted;
        }
    }

    /// Runs extraction for every message whose deadline has passed and returns
    /// how many components the sink took.
    pub fn poll(&mut self, now: Instant, thread: &Thread, sink: &mut dyn ComponentSink) -> usize {
        let due: Vec<String> = thread
            .messages()
            .iter()
            .filter(|message| {
                self.states
                    .get(&message.id)
                    .and_then(|state| state.pending_deadline)
                    .is_some_and(|deadline| deadline <= now)
            })
            .map(|message| message.id.clone())
            .collect();

        let mut accepted = 0;
        for message_id in &due {
            accepted += self.extract(message_id, thread, sink);
        }
        accepted
    }

    fn extract(&mut self, message_id: &str, thread: &Thread, sink: &mut dyn ComponentSink) -> usize {
        let Some(state) = self.states.get_mut(message_id) else {
            return 0;
        };
        state.pending_deadline = None;

        let Some(message) = thread.get(message_id) else {
            state.phase = Phase::Watching;
            return 0;
        };
        let text = message.text();
        state.last_observed_len = text.len();

        let candidates: Vec<ComponentCandidate> = scan(&text)
            .into_iter()
            .filter_map(|fragment| {
                let kind = self.registry.resolve(&fragment.kind_name)?;
                let (args, origin) = split_origin(&fragment.args);
                Some(ComponentCandidate::new(validate(kind, &args), origin))
            })
            .collect();
        let found = candidates.len();
        let fresh = Deduplicator::with_seen(state.accepted_keys.iter().cloned()).dedupe(candidates);

        let mut accepted = 0;
        if !fresh.is_empty() {
            let user_query = thread
                .triggering_user_message(message_id)
                .map(|user| user.text().into_owned());
            let subject = fresh
                .iter()
                .find_map(|candidate| candidate.origin.subject.clone())
                .map(|subject| display_name(subject.split(',').next().unwrap_or_default().trim()))
                .filter(|subject| !subject.is_empty())
                .unwrap_or_else(|| infer_subject(user_query.as_deref().unwrap_or_default()));
            let keys: Vec<DedupeKey> = fresh.iter().map(ComponentCandidate::key).collect();
            let batch = ExtractionBatch {
                message_id: message_id.to_string(),
                user_query,
                subject,
                components: fresh,
            };

            match sink.accept(batch) {
                Ok(ids) => {
                    accepted = ids.len();
                    state.accepted_keys.extend(keys);
                    tracing::info!(message = message_id, found, accepted, "extracted components");
                }
                Err(err) => {
                    tracing::error!(message = message_id, "failed to store components: {err}");
                    state.phase = Phase::Watching;
                    return 0;
                }
            }
        }

        state.phase = if state.accepted_keys.is_empty() {
            Phase::Watching
        } else {
            Phase::Accepted
        };
        accepted
    }

    /// Earliest pending extraction, for scheduling the next wakeup.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.states
            .values()
            .filter_map(|state| state.pending_deadline)
            .min()
    }

    pub fn phase(&self, message_id: &str) -> Option<Phase> {
        self.states.get(message_id).map(|state| state.phase)
    }

    /// Cancels every pending extraction.
    pub fn shutdown(&mut self) {
        for state in self.states.values_mut() {
            if state.pending_deadline.take().is_some() {
                state.phase = Phase::Watching;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::schema::ComponentKind;

    const DEBOUNCE: Duration = Duration::from_millis(800);

    #[derive(Default)]
    struct RecordingSink {
        batches: Vec<ExtractionBatch>,
        next_id: usize,
    }

    impl RecordingSink {
        fn kinds(&self) -> Vec<ComponentKind> {
            self.batches
                .iter()
                .flat_map(|batch| batch.components.iter().map(ComponentCandidate::kind))
                .collect()
        }
    }

    impl ComponentSink for RecordingSink {
        fn accept(&mut self, batch: ExtractionBatch) -> Result<Vec<String>, ExtractionError> {
            let ids = batch
                .components
                .iter()
                .map(|_| {
                    self.next_id += 1;
                    format!("comp_{}", self.next_id)
                })
                .collect();
            self.batches.push(batch);
            Ok(ids)
        }
    }

    struct FailingSink;

    impl ComponentSink for FailingSink {
        fn accept(&mut self, _batch: ExtractionBatch) -> Result<Vec<String>, ExtractionError> {
            Err(ExtractionError::SinkUnavailable("workspace locked".to_string()))
        }
    }

    const METRIC: &str = r#"{"type":"tool","name":"show_component_MetricCard","args":{"title":"Revenue","value":"$4.2B","_company":"Tesla","_queryContext":"show tesla revenue"}}"#;
    const GRAPH: &str = r#"{"type":"tool","name":"show_component_GraphCard","args":{"title":"Revenue Trend","data":[{"label":"Q1","value":3.6}]}}"#;

    fn thread_with_reply(reply: &str) -> Thread {
        let mut thread = Thread::default();
        thread.push(Message::new("u1", Role::User, "show tesla revenue"));
        thread.push(Message::new("a1", Role::Assistant, reply));
        thread
    }

    fn set_reply(thread: &mut Thread, reply: &str) {
        *thread = thread_with_reply(reply);
    }

    fn step(runtime: &mut ExtractionRuntime, thread: &Thread, now: Instant, sink: &mut dyn ComponentSink) -> usize {
        runtime.observe_thread(thread, now);
        runtime.poll(now, thread, sink)
    }

    #[test]
    fn streaming_growth_yields_metric_then_graph() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let full = format!("Tesla revenue metrics analysis:\n{METRIC}\n{GRAPH}");
        let mut thread = thread_with_reply("");

        let mut now = start;
        let cut_points = [10, 60, METRIC.len() + 40, full.len() - 5, full.len()];
        for cut in cut_points {
            set_reply(&mut thread, &full[..cut]);
            step(&mut runtime, &thread, now, &mut sink);
            now += Duration::from_millis(100);
        }
        assert!(sink.batches.is_empty());
        assert_eq!(runtime.phase("a1"), Some(Phase::Settling));

        step(&mut runtime, &thread, now + DEBOUNCE, &mut sink);
        assert_eq!(sink.kinds(), vec![ComponentKind::Metric, ComponentKind::Graph]);
        assert_eq!(runtime.phase("a1"), Some(Phase::Accepted));

        let batch = &sink.batches[0];
        assert_eq!(batch.user_query.as_deref(), Some("show tesla revenue"));
        assert_eq!(batch.subject, "Tesla");
        assert_eq!(batch.components[0].origin.query_context.as_deref(), Some("show tesla revenue"));
        assert!(!batch.components[0].props.to_map().contains_key("_company"));
    }

    #[test]
    fn truncated_fragment_extracts_nothing_and_keeps_watching() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let thread = thread_with_reply(
            r#"Here's your data: {"type":"tool","name":"show_component_MetricCard","args":{"title":"Re"#,
        );

        step(&mut runtime, &thread, start, &mut sink);
        assert_eq!(runtime.next_deadline(), Some(start + DEBOUNCE));
        step(&mut runtime, &thread, start + DEBOUNCE, &mut sink);

        assert!(sink.batches.is_empty());
        assert_eq!(runtime.phase("a1"), Some(Phase::Watching));
        assert_eq!(runtime.next_deadline(), None);
    }

    #[test]
    fn any_sequence_of_prefixes_never_emits_a_call_twice() {
        let full = format!("Report:\n{METRIC}\n{GRAPH}\n{METRIC}");
        for stride in [1, 7, 33, 97] {
            let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
            let mut sink = RecordingSink::default();
            let mut thread = thread_with_reply("");
            let mut now = Instant::now();
            let mut cut = 0;
            while cut < full.len() {
                cut = (cut + stride).min(full.len());
                if !full.is_char_boundary(cut) {
                    continue;
                }
                set_reply(&mut thread, &full[..cut]);
                runtime.observe_thread(&thread, now);
                runtime.poll(now + DEBOUNCE, &thread, &mut sink);
                now += DEBOUNCE * 2;
            }
            step(&mut runtime, &thread, now + DEBOUNCE, &mut sink);

            assert_eq!(
                sink.kinds(),
                vec![ComponentKind::Metric, ComponentKind::Graph],
                "stride {stride}"
            );
        }
    }

    #[test]
    fn growth_before_deadline_restarts_the_window() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let mut thread = thread_with_reply(METRIC);

        step(&mut runtime, &thread, start, &mut sink);
        let later = start + Duration::from_millis(500);
        set_reply(&mut thread, &format!("{METRIC}\n{GRAPH}"));
        step(&mut runtime, &thread, later, &mut sink);

        assert_eq!(step(&mut runtime, &thread, start + DEBOUNCE, &mut sink), 0);
        assert_eq!(runtime.next_deadline(), Some(later + DEBOUNCE));
        assert_eq!(step(&mut runtime, &thread, later + DEBOUNCE, &mut sink), 2);
    }

    #[test]
    fn buffer_is_reread_when_the_deadline_fires() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let mut thread = thread_with_reply(METRIC);
        runtime.observe_thread(&thread, start);

        set_reply(&mut thread, &format!("{METRIC}\n{GRAPH}"));
        assert_eq!(runtime.poll(start + DEBOUNCE, &thread, &mut sink), 2);
    }

    #[test]
    fn accepted_message_that_grows_only_emits_new_calls() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let mut thread = thread_with_reply(METRIC);
        step(&mut runtime, &thread, start, &mut sink);
        step(&mut runtime, &thread, start + DEBOUNCE, &mut sink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Accepted));

        let later = start + DEBOUNCE * 2;
        set_reply(&mut thread, &format!("{METRIC}\n{GRAPH}"));
        step(&mut runtime, &thread, later, &mut sink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Settling));
        step(&mut runtime, &thread, later + DEBOUNCE, &mut sink);

        assert_eq!(sink.kinds(), vec![ComponentKind::Metric, ComponentKind::Graph]);
        assert_eq!(sink.batches.len(), 2);
    }

    #[test]
    fn unknown_and_malformed_fragments_do_not_block_valid_ones() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let reply = format!(
            "{}\n{}\n{GRAPH}",
            r#"{"type":"tool","name":"show_component_PieChart","args":{}}"#,
            r#"{"type":"tool","name":"show_component_MetricCard","args":{"title":}}"#,
        );
        let thread = thread_with_reply(&reply);
        step(&mut runtime, &thread, start, &mut sink);
        step(&mut runtime, &thread, start + DEBOUNCE, &mut sink);
        assert_eq!(sink.kinds(), vec![ComponentKind::Graph]);
    }

    #[test]
    fn sink_failure_keeps_message_watching_and_unrecorded() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut thread = thread_with_reply(METRIC);
        step(&mut runtime, &thread, start, &mut FailingSink);
        step(&mut runtime, &thread, start + DEBOUNCE, &mut FailingSink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Watching));

        let mut sink = RecordingSink::default();
        let later = start + DEBOUNCE * 2;
        set_reply(&mut thread, &format!("{METRIC} "));
        step(&mut runtime, &thread, later, &mut sink);
        step(&mut runtime, &thread, later + DEBOUNCE, &mut sink);
        assert_eq!(sink.kinds(), vec![ComponentKind::Metric]);
    }

    #[test]
    fn plain_replies_settle_without_components() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();

        let short = thread_with_reply("Sure.");
        step(&mut runtime, &short, start, &mut sink);
        step(&mut runtime, &short, start, &mut sink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Watching));

        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let prose = thread_with_reply("Revenue grew steadily across every region this year.");
        step(&mut runtime, &prose, start, &mut sink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Watching));
        step(&mut runtime, &prose, start, &mut sink);
        assert_eq!(runtime.phase("a1"), Some(Phase::Accepted));
        assert!(sink.batches.is_empty());
    }

    #[test]
    fn user_messages_are_ignored_and_shutdown_cancels_deadlines() {
        let start = Instant::now();
        let mut runtime = ExtractionRuntime::new(DEBOUNCE, 20);
        let mut sink = RecordingSink::default();
        let thread = thread_with_reply(METRIC);

        runtime.observe_thread(&thread, start);
        assert_eq!(runtime.phase("u1"), None);
        assert!(runtime.next_deadline().is_some());

        runtime.shutdown();
        assert_eq!(runtime.next_deadline(), None);
        assert_eq!(runtime.poll(start + DEBOUNCE, &thread, &mut sink), 0);
        assert_eq!(runtime.phase("a1"), Some(Phase::Watching));
    }
}

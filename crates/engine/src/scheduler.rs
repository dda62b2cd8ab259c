use html::{Document, NodeKey};
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(120);

/// Root a reconciliation run applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Document,
    Node(NodeKey),
}

impl Scope {
    /// The node to run against. A scope node that has left the document resolves to the root.
    pub fn resolve(self, doc: &Document) -> NodeKey {
        match self {
            Scope::Node(key) if doc.is_connected(key) => key,
            _ => doc.root(),
        }
    }
}

/// Outcome of a [`Scheduler::request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Request {
    /// Settings are not ready yet; the initial run after readiness supersedes this request.
    Dropped,
    /// A new pending run was armed.
    Scheduled,
    /// Folded into the already pending run.
    Coalesced,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    scope: Scope,
    deadline: Instant,
}

/// Debounces run requests into at most one pending run.
///
/// The deadline is fixed by the request that armed the timer. Any later request inside the window
/// widens the pending run to the whole document, so a continuous burst cannot postpone it.
#[derive(Debug, Clone)]
pub struct Scheduler {
    window: Duration,
    pending: Option<Pending>,
    coalesced: u64,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl Scheduler {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            pending: None,
            coalesced: 0,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn request(&mut self, scope: Scope, now: Instant, ready: bool) -> Request {
        if !ready {
            log::trace!(target: "scheduler", "dropping {scope:?}: settings not ready");
            return Request::Dropped;
        }
        match &mut self.pending {
            Some(pending) => {
                log::trace!(target: "scheduler", "coalescing {scope:?} into pending run");
                pending.scope = Scope::Document;
                self.coalesced = self.coalesced.saturating_add(1);
                Request::Coalesced
            }
            None => {
                self.pending = Some(Pending {
                    scope,
                    deadline: now + self.window,
                });
                Request::Scheduled
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.map(|p| p.deadline)
    }

    pub fn pending_scope(&self) -> Option<Scope> {
        self.pending.map(|p| p.scope)
    }

    /// Time left until the pending run fires.
    pub fn wait_time(&self, now: Instant) -> Option<Duration> {
        self.deadline().map(|d| d.saturating_duration_since(now))
    }

    /// Take the pending run if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Scope> {
        let pending = self.pending?;
        if now < pending.deadline {
            return None;
        }
        self.pending = None;
        if self.coalesced > 0 {
            log::trace!(target: "scheduler", "firing run; {} request(s) coalesced", self.coalesced);
            self.coalesced = 0;
        }
        Some(pending.scope)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_within_window_fires_once() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        assert_eq!(s.request(Scope::Document, t0, true), Request::Scheduled);
        for i in 1..50u64 {
            let at = t0 + Duration::from_millis(i * 2);
            assert_eq!(s.request(Scope::Document, at, true), Request::Coalesced);
        }
        assert_eq!(s.poll(t0 + Duration::from_millis(119)), None);
        assert_eq!(s.poll(t0 + DEFAULT_DEBOUNCE), Some(Scope::Document));
        assert_eq!(s.poll(t0 + Duration::from_secs(5)), None);
    }

    #[test]
    fn single_request_keeps_its_scope() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        s.request(Scope::Node(NodeKey(3)), t0, true);
        assert_eq!(s.pending_scope(), Some(Scope::Node(NodeKey(3))));
        assert_eq!(s.poll(t0 + DEFAULT_DEBOUNCE), Some(Scope::Node(NodeKey(3))));
    }

    #[test]
    fn disagreeing_scopes_widen_to_document() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        s.request(Scope::Node(NodeKey(3)), t0, true);
        s.request(Scope::Node(NodeKey(4)), t0, true);
        assert_eq!(s.pending_scope(), Some(Scope::Document));
        s.request(Scope::Node(NodeKey(3)), t0, true);
        assert_eq!(s.pending_scope(), Some(Scope::Document));
    }

    #[test]
    fn repeated_request_for_same_node_widens_to_document() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        s.request(Scope::Node(NodeKey(3)), t0, true);
        assert_eq!(
            s.request(Scope::Node(NodeKey(3)), t0, true),
            Request::Coalesced
        );
        assert_eq!(s.pending_scope(), Some(Scope::Document));
    }

    #[test]
    fn requests_before_ready_are_dropped() {
        let t0 = Instant::now();
        let mut s = Scheduler::default();
        assert_eq!(s.request(Scope::Document, t0, false), Request::Dropped);
        assert!(!s.is_pending());
    }

    #[test]
    fn deadline_is_not_extended_by_later_requests() {
        let t0 = Instant::now();
        let mut s = Scheduler::new(Duration::from_millis(100));
        s.request(Scope::Document, t0, true);
        s.request(Scope::Document, t0 + Duration::from_millis(90), true);
        assert_eq!(s.deadline(), Some(t0 + Duration::from_millis(100)));
        assert_eq!(
            s.wait_time(t0 + Duration::from_millis(40)),
            Some(Duration::from_millis(60))
        );
    }

    #[test]
    fn scope_resolves_detached_nodes_to_root() {
        let mut doc = Document::parse("<div></div>");
        let div = doc.elements_by_tag(doc.root(), "div")[0];
        assert_eq!(Scope::Node(div).resolve(&doc), div);
        doc.detach(div).unwrap();
        assert_eq!(Scope::Node(div).resolve(&doc), doc.root());
    }
}

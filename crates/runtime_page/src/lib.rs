//! Single-threaded host loop around the reconciliation engine.
//!
//! The runtime owns the page document and feeds host events to the engine: page load, mutation
//! observations, settings-store notifications and user input. Reconciliation requests go through
//! the debounce [`Scheduler`]; `run` sleeps on the event channel until the pending deadline.
use bus::{HostEvent, PageEvent, Target};
use engine::{Engine, Handled, Request, Scheduler, Scope};
use html::{Document, Effect, SubmitVia};
use settings::{SettingsStore, SettingsSync, StoreChange};
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::time::Instant;

const AUTOSUBMIT_ATTR: &str = "up-autosubmit";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Shutdown,
}

pub struct PageRuntime {
    doc: Document,
    engine: Engine,
    settings: SettingsSync,
    scheduler: Scheduler,
    outbox: Option<Sender<PageEvent>>,
    effects: Vec<Effect>,
    runs: u64,
}

impl PageRuntime {
    pub fn new(doc: Document, engine: Engine, settings: SettingsSync) -> Self {
        let scheduler = Scheduler::new(engine.config().debounce());
        Self {
            doc,
            engine,
            settings,
            scheduler,
            outbox: None,
            effects: Vec::new(),
            runs: 0,
        }
    }

    /// Mirror runs, settings changes and effects to `tx`.
    pub fn with_outbox(mut self, tx: Sender<PageEvent>) -> Self {
        self.outbox = Some(tx);
        self
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn into_document(self) -> Document {
        self.doc
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn settings(&self) -> &SettingsSync {
        &self.settings
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Completed reconciliation runs.
    pub fn runs(&self) -> u64 {
        self.runs
    }

    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }

    /// Initial settings read. Until it completes, run requests are dropped.
    pub fn start(&mut self) {
        if !self.settings.is_ready() {
            self.settings.load();
            self.emit(PageEvent::SettingsChanged {
                generation: self.settings.generation(),
            });
        }
    }

    pub fn handle(&mut self, event: HostEvent, now: Instant) -> Flow {
        log::trace!(target: "runtime", "event {event:?}");
        let flow = match event {
            HostEvent::Load => {
                self.page_loaded();
                Flow::Continue
            }
            HostEvent::FragmentInserted { target } => {
                self.fragment_inserted(&target, now);
                Flow::Continue
            }
            HostEvent::Mutation => {
                self.request(Scope::Document, now);
                Flow::Continue
            }
            HostEvent::Store(change) => {
                self.store_changed(&change, now);
                Flow::Continue
            }
            HostEvent::Click { target } => {
                self.click(&target);
                Flow::Continue
            }
            HostEvent::KeyDown { target, key } => {
                self.key_down(&target, &key);
                Flow::Continue
            }
            HostEvent::Input { target, value } => {
                self.input(&target, &value);
                Flow::Continue
            }
            HostEvent::Render { target, markup } => {
                self.render(&target, &markup);
                Flow::Continue
            }
            HostEvent::Shutdown => Flow::Shutdown,
        };
        self.observe(now);
        self.drain_effects();
        flow
    }

    /// Fire the pending run if its deadline has passed. Returns whether a run happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(scope) = self.scheduler.poll(now) else {
            return false;
        };
        self.run_now(scope);
        self.drain_effects();
        true
    }

    /// Fire the pending run regardless of its deadline.
    pub fn flush(&mut self, now: Instant) -> bool {
        match self.scheduler.deadline() {
            Some(deadline) => self.tick(deadline.max(now)),
            None => false,
        }
    }

    /// Drive the runtime from `rx` until shutdown or until every sender is gone. A run still
    /// pending at that point is flushed.
    pub fn run(&mut self, rx: &Receiver<HostEvent>) {
        loop {
            let now = Instant::now();
            self.tick(now);
            let received = match self.scheduler.wait_time(now) {
                Some(wait) => rx.recv_timeout(wait),
                None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match received {
                Ok(event) => {
                    if self.handle(event, Instant::now()) == Flow::Shutdown {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        self.flush(Instant::now());
        log::debug!(target: "runtime", "runtime stopped after {} run(s)", self.runs);
    }

    pub fn request(&mut self, scope: Scope, now: Instant) -> Request {
        self.scheduler.request(scope, now, self.settings.is_ready())
    }

    fn page_loaded(&mut self) {
        self.engine.page_loaded();
        self.start();
        self.run_now(Scope::Document);
    }

    fn fragment_inserted(&mut self, target: &Target, now: Instant) {
        let scope = target.scope(&self.doc);
        if self.settings.is_ready() {
            let prefs = self.settings.current();
            self.engine.apply_input_mode(&mut self.doc, scope, &prefs);
            self.doc.take_journal();
        }
        self.request(scope, now);
    }

    fn store_changed(&mut self, change: &StoreChange, now: Instant) {
        if self.settings.reload(change) {
            self.emit(PageEvent::SettingsChanged {
                generation: self.settings.generation(),
            });
        }
        if !self.settings.is_ready() {
            return;
        }
        let prefs = self.settings.current();
        self.engine
            .apply_input_mode(&mut self.doc, Scope::Document, &prefs);
        self.doc.take_journal();
        self.request(Scope::Document, now);
    }

    fn click(&mut self, target: &Target) {
        let Some(key) = target.resolve(&self.doc) else {
            return;
        };
        match self
            .engine
            .click(&mut self.doc, key, self.settings.generation())
        {
            Ok(Handled::Toggled { article_collapsed }) => {
                log::debug!(target: "runtime", "toggled article, collapsed={article_collapsed}");
            }
            Ok(_) => {}
            Err(err) => log::warn!(target: "runtime", "toggle failed: {err}"),
        }
        self.doc.take_journal();
    }

    fn key_down(&mut self, target: &Target, key: &str) {
        let Some(field) = target.resolve(&self.doc) else {
            return;
        };
        if let Handled::Submitted(via) = self.engine.key_down(&mut self.doc, field, key) {
            log::debug!(target: "runtime", "Enter submitted the search via {via:?}");
        }
    }

    /// Typing into a field. The host's own watcher submits fields that carry its auto-submit
    /// attribute.
    fn input(&mut self, target: &Target, value: &str) {
        let Some(field) = target.resolve(&self.doc) else {
            return;
        };
        if let Err(err) = self.doc.set_value(field, value) {
            log::warn!(target: "runtime", "input on {field:?} failed: {err}");
            return;
        }
        if !self.doc.has_attr(field, AUTOSUBMIT_ATTR) {
            return;
        }
        if let Some(form) = self
            .doc
            .closest(field, |d, k| d.is_element_named(k, "form"))
        {
            self.doc.push_effect(Effect::Submit {
                form,
                via: SubmitVia::Host,
            });
        }
    }

    fn render(&mut self, target: &Target, markup: &str) {
        let Some(key) = target.resolve(&self.doc) else {
            log::debug!(target: "runtime", "render target {target:?} not found");
            return;
        };
        if let Err(err) = self.doc.set_inner_html(key, markup) {
            log::warn!(target: "runtime", "render failed: {err}");
        }
    }

    /// Structural changes made by the host count as a mutation observation.
    fn observe(&mut self, now: Instant) {
        let journal = self.doc.take_journal();
        if journal.child_list > 0 {
            self.request(Scope::Document, now);
        }
    }

    fn run_now(&mut self, scope: Scope) {
        if !self.settings.is_ready() {
            return;
        }
        let prefs = self.settings.current();
        let generation = self.settings.generation();
        let report = self.engine.run(&mut self.doc, scope, &prefs, generation);
        // The engine's own mutations are not observations.
        self.doc.take_journal();
        self.runs += 1;
        self.emit(PageEvent::Reconciled {
            scope,
            generation,
            report,
        });
    }

    fn drain_effects(&mut self) {
        for effect in self.doc.take_effects() {
            log::debug!(target: "runtime", "effect {effect:?}");
            self.emit(PageEvent::Effect(effect.clone()));
            self.effects.push(effect);
        }
    }

    fn emit(&mut self, event: PageEvent) {
        let failed = match &self.outbox {
            Some(tx) => tx.send(event).is_err(),
            None => false,
        };
        if failed {
            log::debug!(target: "runtime", "page event receiver gone");
            self.outbox = None;
        }
    }
}

/// Forward every change notification of `store` onto the host event channel.
pub fn forward_store_changes(store: &dyn SettingsStore, tx: Sender<HostEvent>) {
    store.subscribe(Box::new(move |change| {
        let _ = tx.send(HostEvent::Store(change.clone()));
    }));
}

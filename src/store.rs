//! Keeps the compiled condition in step with the graph.
//!
//! Every successful edit recompiles the graph. Listeners hear about the new
//! document only when its canonical JSON actually changed.

use crate::compiler::Compiler;
use crate::condition::ConditionDocument;
use crate::config::{NoticeSettings, Settings};
use crate::error::{EditorError, SessionError, ValidationError};
use crate::graph::{BlockGraph, GraphEditor};
use crate::notice::{Notice, NoticeBoard, NoticeLevel};
use crate::validator::Validator;
use std::time::Instant;
use tracing::debug;

/// The latest compile output.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionSnapshot {
    pub document: Option<ConditionDocument>,
    /// Pretty-printed document; empty when nothing compiles.
    pub json: String,
    /// `None` when there is no document to validate.
    pub validation: Option<Result<(), ValidationError>>,
    pub revision: u64,
}

impl ConditionSnapshot {
    fn empty() -> Self {
        Self {
            document: None,
            json: String::new(),
            validation: None,
            revision: 0,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self.validation, Some(Ok(())))
    }
}

type Listener = Box<dyn FnMut(&ConditionSnapshot)>;

pub struct ConditionStore {
    editor: GraphEditor,
    compiler: Compiler,
    validator: Validator,
    notices: NoticeBoard,
    notice_settings: NoticeSettings,
    snapshot: ConditionSnapshot,
    canonical: String,
    listeners: Vec<Listener>,
}

impl ConditionStore {
    pub fn new(settings: &Settings) -> Self {
        Self::with_parts(GraphEditor::new(), Compiler::default(), settings)
    }

    pub fn with_parts(editor: GraphEditor, compiler: Compiler, settings: &Settings) -> Self {
        let mut store = Self {
            editor,
            compiler,
            validator: Validator::new(),
            notices: NoticeBoard::new(),
            notice_settings: settings.notices,
            snapshot: ConditionSnapshot::empty(),
            canonical: String::new(),
            listeners: Vec::new(),
        };
        store.refresh();
        store
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&ConditionSnapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Runs one editor mutation and recompiles if it succeeded.
    ///
    /// A rejected second canvas condition is also posted as an advisory
    /// notice; other rejections are returned silently.
    pub fn edit<T>(
        &mut self,
        now: Instant,
        mutation: impl FnOnce(&mut GraphEditor) -> Result<T, EditorError>,
    ) -> Result<T, EditorError> {
        match mutation(&mut self.editor) {
            Ok(value) => {
                self.notices.dismiss_level(NoticeLevel::Advisory);
                self.refresh();
                Ok(value)
            }
            Err(e) => {
                if matches!(e, EditorError::TopLevelConflict { .. }) {
                    self.notices.post(Notice::advisory(
                        e.to_string(),
                        now,
                        self.notice_settings.advisory_ttl(),
                    ));
                }
                debug!(error = %e, "edit rejected");
                Err(e)
            }
        }
    }

    /// Recompiles and notifies listeners if the document changed.
    pub fn refresh(&mut self) -> bool {
        let document = self.compiler.compile(self.editor.graph());
        let canonical = document
            .as_ref()
            .map(ConditionDocument::to_canonical_json)
            .unwrap_or_default();
        self.snapshot.revision = self.editor.revision();
        if canonical == self.canonical {
            return false;
        }

        self.snapshot = ConditionSnapshot {
            json: crate::condition::format_document(document.as_ref()),
            validation: document.as_ref().map(|d| self.validator.validate(d)),
            document,
            revision: self.editor.revision(),
        };
        self.canonical = canonical;
        debug!(revision = self.snapshot.revision, "condition changed");
        for listener in self.listeners.iter_mut() {
            listener(&self.snapshot);
        }
        true
    }

    /// Removes every block and any pending notice.
    pub fn clear(&mut self) {
        self.editor.clear();
        self.notices.clear();
        self.refresh();
    }

    /// Posts a failed session as an error notice.
    pub fn report(&mut self, error: &SessionError, now: Instant) {
        self.notices.post(Notice::error(
            error.to_string(),
            now,
            self.notice_settings.error_ttl(),
        ));
    }

    pub fn snapshot(&self) -> &ConditionSnapshot {
        &self.snapshot
    }

    pub fn document(&self) -> Option<&ConditionDocument> {
        self.snapshot.document.as_ref()
    }

    pub fn graph(&self) -> &BlockGraph {
        self.editor.graph()
    }

    pub fn editor(&self) -> &GraphEditor {
        &self.editor
    }

    pub fn compiler(&self) -> &Compiler {
        &self.compiler
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn notices_mut(&mut self) -> &mut NoticeBoard {
        &mut self.notices
    }
}

//! Shared runtime state and execution contexts
//!
//! A `Runtime` is the state shared by every context spawned from one root:
//! the registry, per-tag userdata metatables, light-userdata tag names, and
//! the failure-capture bookkeeping (frame stack + unwind status register).
//!
//! A `Context` is one thread of script execution with its own value stack.
//! Everything here is `Rc`/`RefCell`-based and deliberately `!Send`: the
//! host contract is that at most one context per runtime is executing at
//! any instant, and the type system holds it to that.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use yue_config::VmConfig;

use crate::assert::vm_assert;
use crate::error::RuntimeError;
use crate::frame::{BoundaryFrame, UnwindStatus};
use crate::table::Table;
use crate::value::{ContextRef, Str, TableRef, Value};

/// Coroutine status of a context.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoStatus {
    /// Currently executing (or ready to, for the root).
    Running,
    /// Yielded or freshly spawned; waiting to be resumed.
    Suspended,
    /// Resumed another context and is waiting for it.
    Normal,
}

pub struct Runtime {
    config: VmConfig,
    registry: TableRef,
    tag_metatables: RefCell<Vec<Option<TableRef>>>,
    light_names: RefCell<Vec<Option<Str>>>,
    /// The error-capture stack: boundary frames for wrapper calls currently
    /// on the host's call stack, innermost last.
    pub(crate) capture: RefCell<Vec<BoundaryFrame>>,
    /// Outcome of the most recently completed wrapped call.
    pub(crate) unwind: Cell<UnwindStatus>,
    last_error: RefCell<Option<RuntimeError>>,
}

impl Runtime {
    fn new(config: VmConfig) -> Rc<Runtime> {
        let udata_tags = config.userdata_tag_limit;
        let light_tags = config.light_userdata_tag_limit;
        Rc::new(Runtime {
            config,
            registry: Rc::new(RefCell::new(Table::new())),
            tag_metatables: RefCell::new(vec![None; udata_tags]),
            light_names: RefCell::new(vec![None; light_tags]),
            capture: RefCell::new(Vec::new()),
            unwind: Cell::new(UnwindStatus::Clean),
            last_error: RefCell::new(None),
        })
    }

    pub fn config(&self) -> &VmConfig {
        &self.config
    }

    /// The registry table backing named-metatable registration.
    pub fn registry(&self) -> TableRef {
        self.registry.clone()
    }

    /// Depth of the error-capture stack. Exposed so hosts and tests can
    /// verify push/pop balance around wrapped calls.
    pub fn capture_depth(&self) -> usize {
        self.capture.borrow().len()
    }

    /// Outcome of the last completed wrapped call.
    pub fn unwind_status(&self) -> UnwindStatus {
        self.unwind.get()
    }

    /// The most recently trapped failure, for host diagnostics. Not cleared
    /// by clean calls; check [`Runtime::unwind_status`] first.
    pub fn last_error(&self) -> Option<RuntimeError> {
        self.last_error.borrow().clone()
    }

    pub(crate) fn set_last_error(&self, err: RuntimeError) {
        *self.last_error.borrow_mut() = Some(err);
    }

    /// Register the metatable handed to tagged-userdata allocation for
    /// `tag`. Direct pass-through; out-of-range tags are a caller defect.
    pub fn set_tag_metatable(&self, tag: usize, mt: Option<TableRef>) {
        let mut tables = self.tag_metatables.borrow_mut();
        vm_assert!(tag < tables.len(), "set_tag_metatable");
        if let Some(slot) = tables.get_mut(tag) {
            *slot = mt;
        }
    }

    pub fn tag_metatable(&self, tag: usize) -> Option<TableRef> {
        self.tag_metatables.borrow().get(tag).cloned().flatten()
    }

    pub(crate) fn set_light_name(&self, tag: usize, name: Str) -> Result<(), RuntimeError> {
        let mut names = self.light_names.borrow_mut();
        match names.get_mut(tag) {
            Some(slot) => {
                *slot = Some(name);
                Ok(())
            }
            None => Err(RuntimeError::InvalidTag(tag)),
        }
    }

    pub fn light_name(&self, tag: usize) -> Option<Str> {
        self.light_names.borrow().get(tag).cloned().flatten()
    }
}

pub struct Context {
    runtime: Rc<Runtime>,
    stack: RefCell<Vec<Value>>,
    status: Cell<CoStatus>,
    interrupt: Cell<bool>,
    root: bool,
}

impl Context {
    /// Create a root context and the runtime it anchors.
    pub fn new(config: VmConfig) -> ContextRef {
        let capacity = config.initial_stack_capacity;
        let runtime = Runtime::new(config);
        Rc::new(Context {
            runtime,
            stack: RefCell::new(Vec::with_capacity(capacity)),
            status: Cell::new(CoStatus::Running),
            interrupt: Cell::new(false),
            root: true,
        })
    }

    /// Spawn a sibling context sharing this one's runtime.
    pub(crate) fn spawn(&self) -> ContextRef {
        Rc::new(Context {
            runtime: self.runtime.clone(),
            stack: RefCell::new(Vec::with_capacity(
                self.runtime.config.initial_stack_capacity,
            )),
            status: Cell::new(CoStatus::Suspended),
            interrupt: Cell::new(false),
            root: false,
        })
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    pub fn status(&self) -> CoStatus {
        self.status.get()
    }

    pub(crate) fn set_status(&self, status: CoStatus) {
        self.status.set(status);
    }

    pub fn is_root(&self) -> bool {
        self.root
    }

    /// True once a cooperative interrupt has been requested and not yet
    /// honored at a safe point.
    pub fn interrupt_requested(&self) -> bool {
        self.interrupt.get()
    }

    pub(crate) fn request_interrupt(&self) {
        self.interrupt.set(true);
    }

    /// A context is reset when it is back in its reusable idle shape.
    pub fn is_reset(&self) -> bool {
        self.stack.borrow().is_empty()
            && !self.interrupt.get()
            && self.status.get() == if self.root { CoStatus::Running } else { CoStatus::Suspended }
    }

    pub(crate) fn reset(&self) {
        self.stack.borrow_mut().clear();
        self.interrupt.set(false);
        self.status.set(if self.root {
            CoStatus::Running
        } else {
            CoStatus::Suspended
        });
    }

    // ===== value stack (direct pass-throughs, cannot fail internally) =====

    pub fn top(&self) -> usize {
        self.stack.borrow().len()
    }

    pub fn push(&self, v: Value) {
        self.stack.borrow_mut().push(v);
    }

    pub fn push_nil(&self) {
        self.push(Value::Nil);
    }

    pub fn push_boolean(&self, b: bool) {
        self.push(Value::Boolean(b));
    }

    pub fn push_number(&self, n: f64) {
        self.push(Value::Number(n));
    }

    /// Pop the top value; nil when the stack is empty.
    pub fn pop(&self) -> Value {
        self.stack.borrow_mut().pop().unwrap_or(Value::Nil)
    }

    pub fn pop_n(&self, n: usize) {
        let mut stack = self.stack.borrow_mut();
        let len = stack.len();
        stack.truncate(len.saturating_sub(n));
    }

    pub fn truncate(&self, len: usize) {
        self.stack.borrow_mut().truncate(len);
    }

    /// Resolve a 1-based (positive) or top-relative (negative) index to a
    /// stack slot. Zero and out-of-range indices resolve to nothing.
    pub fn abs_index(&self, idx: i32) -> Option<usize> {
        let top = self.top() as i64;
        let idx = idx as i64;
        if idx > 0 && idx <= top {
            Some((idx - 1) as usize)
        } else if idx < 0 && -idx <= top {
            Some((top + idx) as usize)
        } else {
            None
        }
    }

    pub fn value_at_opt(&self, idx: i32) -> Option<Value> {
        let slot = self.abs_index(idx)?;
        Some(self.stack.borrow()[slot].clone())
    }

    /// Value at `idx`; nil when the index addresses nothing.
    pub fn value_at(&self, idx: i32) -> Value {
        self.value_at_opt(idx).unwrap_or(Value::Nil)
    }

    pub(crate) fn replace_slot(&self, slot: usize, v: Value) {
        let mut stack = self.stack.borrow_mut();
        vm_assert!(slot < stack.len(), "replace_slot");
        if let Some(cell) = stack.get_mut(slot) {
            *cell = v;
        }
    }

    /// Keep only the top `keep` values, moved to the stack base. Used when a
    /// context suspends with its yield values.
    pub(crate) fn keep_top(&self, keep: usize) {
        let mut stack = self.stack.borrow_mut();
        let len = stack.len();
        vm_assert!(keep <= len, "keep_top");
        let keep = keep.min(len);
        stack.drain(..len - keep);
    }
}

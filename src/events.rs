//! Grid events and listener registry
//!
//! Events form a closed enum matched exhaustively by listeners. For every
//! emitted event, internal listeners (cross-component wiring) run before
//! external ones; within a scope, listeners run in registration order.

use std::fmt;

use crate::error::{GridError, Result};
use crate::geometry::Rect;
use crate::model::RowRef;
use crate::view::CellRef;

/// Payload of cell-level events
#[derive(Debug, Clone)]
pub struct CellEvent {
    pub cell: CellRef,
    pub row: RowRef,
    pub column_key: String,
    /// Visible rectangle of the cell in device pixels
    pub rect: Rect,
}

#[derive(Debug, Clone)]
pub enum TableEvent {
    CellClick(CellEvent),
    CellDoubleClick(CellEvent),
    HoverEnter(CellEvent),
    HoverLeave(CellEvent),
    /// Raw wheel delta in device pixels; the grid does not scroll by itself
    Scroll { delta_x: f64, delta_y: f64 },
    HeaderClick { col: usize, column_key: String },
}

impl TableEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            TableEvent::CellClick(_) => EventKind::CellClick,
            TableEvent::CellDoubleClick(_) => EventKind::CellDoubleClick,
            TableEvent::HoverEnter(_) => EventKind::HoverEnter,
            TableEvent::HoverLeave(_) => EventKind::HoverLeave,
            TableEvent::Scroll { .. } => EventKind::Scroll,
            TableEvent::HeaderClick { .. } => EventKind::HeaderClick,
        }
    }

    /// Cell payload, for cell-level events
    pub fn cell(&self) -> Option<&CellEvent> {
        match self {
            TableEvent::CellClick(e)
            | TableEvent::CellDoubleClick(e)
            | TableEvent::HoverEnter(e)
            | TableEvent::HoverLeave(e) => Some(e),
            TableEvent::Scroll { .. } | TableEvent::HeaderClick { .. } => None,
        }
    }
}

/// Event discriminant used for subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CellClick,
    CellDoubleClick,
    HoverEnter,
    HoverLeave,
    Scroll,
    HeaderClick,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerScope {
    /// Wiring between grid components; runs first
    Internal,
    /// Host application callbacks
    External,
}

pub type Handler = Box<dyn FnMut(&TableEvent)>;

struct Listener {
    id: SubscriptionId,
    kind: EventKind,
    scope: ListenerScope,
    handler: Handler,
}

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<Listener>,
    destroyed: bool,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("destroyed", &self.destroyed)
            .finish()
    }
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a host callback
    pub fn on(&mut self, kind: EventKind, handler: impl FnMut(&TableEvent) + 'static) -> Result<SubscriptionId> {
        self.subscribe(kind, ListenerScope::External, Box::new(handler))
    }

    /// Register a component-wiring callback that runs before host callbacks
    pub fn on_internal(
        &mut self,
        kind: EventKind,
        handler: impl FnMut(&TableEvent) + 'static,
    ) -> Result<SubscriptionId> {
        self.subscribe(kind, ListenerScope::Internal, Box::new(handler))
    }

    fn subscribe(&mut self, kind: EventKind, scope: ListenerScope, handler: Handler) -> Result<SubscriptionId> {
        if self.destroyed {
            return Err(GridError::Destroyed);
        }
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.listeners.push(Listener {
            id,
            kind,
            scope,
            handler,
        });
        tracing::trace!(?kind, ?scope, id = id.0, "listener registered");
        Ok(id)
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|l| l.id != id);
        self.listeners.len() != before
    }

    pub fn emit(&mut self, event: &TableEvent) {
        let kind = event.kind();
        for scope in [ListenerScope::Internal, ListenerScope::External] {
            for listener in self
                .listeners
                .iter_mut()
                .filter(|l| l.kind == kind && l.scope == scope)
            {
                (listener.handler)(event);
            }
        }
    }

    /// Drop every listener and refuse new ones
    pub fn destroy(&mut self) {
        self.listeners.clear();
        self.destroyed = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

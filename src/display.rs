//! Feed of calculator display results that a plot can follow.
//!
//! Producers publish [`DisplayState`] snapshots through a [`DisplayHub`];
//! every published snapshot gets a strictly increasing [`EventId`] so a
//! subscriber can drop anything that arrives out of order.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

use serde::{Deserialize, Serialize};

use crate::expr::{Expression, Variable};

/// How the displayed result was computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operation {
    Simplify,
    Elementary,
    Numeric,
}

impl Operation {
    /// Symbolic operations keep free variables in their result.
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Operation::Simplify | Operation::Elementary)
    }
}

/// Snapshot of what the calculator display currently shows.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayState {
    pub valid: bool,
    pub result: Option<String>,
    pub operation: Operation,
}

impl DisplayState {
    pub fn new(result: impl Into<String>, operation: Operation) -> Self {
        Self {
            valid: true,
            result: Some(result.into()),
            operation,
        }
    }

    pub fn invalid() -> Self {
        Self {
            valid: false,
            result: None,
            operation: Operation::Numeric,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventId(u64);

impl EventId {
    /// Id that precedes every published event.
    pub const FIRST: EventId = EventId(0);

    pub fn new(sequence: u64) -> Self {
        Self(sequence)
    }

    pub fn is_after(&self, other: &EventId) -> bool {
        self.0 > other.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DisplayEvent {
    pub id: EventId,
    pub state: DisplayState,
}

/// A result can be plotted when it came from a symbolic operation and has
/// exactly one free variable.
pub fn is_plot_possible(expression: &Expression, operation: Operation) -> bool {
    operation.is_symbolic() && expression.free_variables().len() == 1
}

/// The variable to plot over, when the expression has one.
pub fn plot_variable(expression: &Expression) -> Option<Variable> {
    expression
        .free_variables()
        .into_iter()
        .next()
        .and_then(|name| Variable::new(&name).ok())
}

type Waker = Box<dyn Fn() + Send + Sync>;

struct HubInner {
    next_id: u64,
    subscribers: Vec<Sender<DisplayEvent>>,
    latest: Option<DisplayEvent>,
}

/// Fan-out publisher of display changes.
///
/// Id allocation, delivery and the `latest` update happen under one lock, so
/// every subscriber sees ids in increasing order and `latest` never moves
/// back to an older event.
pub struct DisplayHub {
    inner: Mutex<HubInner>,
    waker: Option<Waker>,
}

impl DisplayHub {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(HubInner {
                next_id: 1,
                subscribers: Vec::new(),
                latest: None,
            }),
            waker: None,
        }
    }

    /// A hub that calls `waker` after every publish, so the event loop that
    /// polls the subscribers wakes up.
    pub fn with_waker<W>(waker: W) -> Self
    where
        W: Fn() + Send + Sync + 'static,
    {
        Self {
            waker: Some(Box::new(waker)),
            ..Self::new()
        }
    }

    /// Register a new listener. Closed receivers are pruned on the next publish.
    pub fn subscribe(&self) -> Receiver<DisplayEvent> {
        let (tx, rx) = mpsc::channel();
        if let Ok(mut inner) = self.inner.lock() {
            inner.subscribers.push(tx);
        }
        rx
    }

    pub fn publish(&self, state: DisplayState) -> EventId {
        let id = match self.inner.lock() {
            Ok(mut inner) => {
                let id = EventId(inner.next_id);
                inner.next_id += 1;
                let event = DisplayEvent { id, state };
                inner.subscribers.retain(|tx| tx.send(event.clone()).is_ok());
                inner.latest = Some(event);
                id
            }
            Err(_) => {
                tracing::error!("Display hub lock poisoned, dropping update");
                return EventId::FIRST;
            }
        };
        if let Some(waker) = &self.waker {
            waker();
        }
        id
    }

    /// The most recently published event, if any.
    pub fn latest(&self) -> Option<DisplayEvent> {
        self.inner.lock().ok().and_then(|inner| inner.latest.clone())
    }
}

impl Default for DisplayHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    use super::*;

    #[test]
    fn plot_possible_needs_symbolic_single_variable() {
        let one = Expression::parse("x^2 + pi").unwrap();
        let two = Expression::parse("x*y").unwrap();
        let none = Expression::parse("2 + 3").unwrap();
        assert!(is_plot_possible(&one, Operation::Simplify));
        assert!(is_plot_possible(&one, Operation::Elementary));
        assert!(!is_plot_possible(&one, Operation::Numeric));
        assert!(!is_plot_possible(&two, Operation::Simplify));
        assert!(!is_plot_possible(&none, Operation::Simplify));
    }

    #[test]
    fn extracts_the_free_variable() {
        let expr = Expression::parse("sin(t) * e").unwrap();
        assert_eq!(plot_variable(&expr).unwrap().name(), "t");
    }

    #[test]
    fn publish_assigns_increasing_ids() {
        let hub = DisplayHub::new();
        let rx = hub.subscribe();
        let first = hub.publish(DisplayState::new("x", Operation::Simplify));
        let second = hub.publish(DisplayState::invalid());
        assert!(second.is_after(&first));
        assert!(first.is_after(&EventId::FIRST));
        assert_eq!(rx.try_recv().unwrap().id, first);
        assert_eq!(rx.try_recv().unwrap().id, second);
        assert_eq!(hub.latest().unwrap().id, second);
    }

    #[test]
    fn dropped_subscribers_are_pruned() {
        let hub = DisplayHub::new();
        drop(hub.subscribe());
        let live = hub.subscribe();
        hub.publish(DisplayState::invalid());
        assert_eq!(hub.inner.lock().unwrap().subscribers.len(), 1);
        assert!(live.try_recv().is_ok());
    }

    #[test]
    fn concurrent_publishers_keep_order() {
        let hub = Arc::new(DisplayHub::new());
        let rx = hub.subscribe();
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let hub = Arc::clone(&hub);
                thread::spawn(move || {
                    for _ in 0..250 {
                        hub.publish(DisplayState::new("x", Operation::Simplify));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let ids: Vec<EventId> = rx.try_iter().map(|event| event.id).collect();
        assert_eq!(ids.len(), 1000);
        assert!(ids.windows(2).all(|w| w[1].is_after(&w[0])));
        assert_eq!(hub.latest().unwrap().id, *ids.last().unwrap());
    }

    #[test]
    fn publish_wakes_the_listener() {
        let wakes = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&wakes);
        let hub = DisplayHub::with_waker(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        let _rx = hub.subscribe();
        hub.publish(DisplayState::new("x", Operation::Simplify));
        hub.publish(DisplayState::invalid());
        assert_eq!(wakes.load(Ordering::SeqCst), 2);
    }
}

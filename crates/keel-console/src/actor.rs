//! Mailbox plumbing shared by every pipeline stage.
//!
//! Each stage is a tokio task that owns its state and drains an unbounded
//! FIFO mailbox. Other stages only ever hold an [`Addr`] (the sending half,
//! typed by the stage's inbox message) or a [`Recipient`] (a view of an
//! address that accepts a single message type). Sending never blocks.

use std::fmt;
use std::sync::Arc;

use tokio::sync::mpsc;

/// Receiving half of a stage's mailbox.
pub type Mailbox<M> = mpsc::UnboundedReceiver<M>;

/// Address of a stage whose inbox accepts `M`.
pub struct Addr<M> {
    name: Arc<str>,
    tx: mpsc::UnboundedSender<M>,
}

impl<M: Send + 'static> Addr<M> {
    /// Create a named mailbox and its address.
    pub fn new(name: &str) -> (Self, Mailbox<M>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                name: Arc::from(name),
                tx,
            },
            rx,
        )
    }

    /// Stage name, used in log messages.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fire-and-forget send. Messages to a stopped stage are dropped.
    pub fn tell(&self, msg: impl Into<M>) {
        if self.tx.send(msg.into()).is_err() {
            log::warn!("{}: mailbox closed, message dropped", self.name);
        }
    }

    /// Whether the receiving stage has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// A recipient for any message convertible into `M`.
    pub fn recipient<T>(&self) -> Recipient<T>
    where
        T: Into<M> + 'static,
    {
        self.recipient_with(|msg: T| msg.into())
    }

    /// A recipient that wraps each message with `wrap` before delivery.
    pub fn recipient_with<T, F>(&self, wrap: F) -> Recipient<T>
    where
        T: 'static,
        F: Fn(T) -> M + Send + Sync + 'static,
    {
        let tx = self.tx.clone();
        Recipient {
            name: Arc::clone(&self.name),
            deliver: Arc::new(move |msg| tx.send(wrap(msg)).is_ok()),
        }
    }
}

impl<M> Clone for Addr<M> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            tx: self.tx.clone(),
        }
    }
}

impl<M> fmt::Debug for Addr<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Addr").field(&self.name).finish()
    }
}

/// A sink for messages of type `T`, detached from the receiver's inbox type.
pub struct Recipient<T> {
    name: Arc<str>,
    deliver: Arc<dyn Fn(T) -> bool + Send + Sync>,
}

impl<T: 'static> Recipient<T> {
    /// Build a recipient from a closure. The closure returns `false` when
    /// the message could not be delivered.
    pub fn from_fn<F>(name: &str, deliver: F) -> Self
    where
        F: Fn(T) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            deliver: Arc::new(deliver),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fire-and-forget send.
    pub fn tell(&self, msg: T) {
        if !(self.deliver)(msg) {
            log::warn!("{}: recipient closed, message dropped", self.name);
        }
    }

    /// A recipient for `U` that converts into `T` on delivery.
    pub fn map<U, F>(&self, convert: F) -> Recipient<U>
    where
        U: 'static,
        F: Fn(U) -> T + Send + Sync + 'static,
    {
        let deliver = Arc::clone(&self.deliver);
        Recipient {
            name: Arc::clone(&self.name),
            deliver: Arc::new(move |msg| deliver(convert(msg))),
        }
    }
}

impl<T> Clone for Recipient<T> {
    fn clone(&self) -> Self {
        Self {
            name: Arc::clone(&self.name),
            deliver: Arc::clone(&self.deliver),
        }
    }
}

impl<T> fmt::Debug for Recipient<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Recipient").field(&self.name).finish()
    }
}

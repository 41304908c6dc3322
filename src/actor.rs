//! Channels between actors. Every message carries the span it was sent from
//! so the receiver can handle it inside that span.

pub mod controller;
pub mod watcher;

use tokio::sync::mpsc;
use tracing::Span;

pub struct Sender<E>(mpsc::UnboundedSender<(Span, E)>);

pub struct Receiver<E>(mpsc::UnboundedReceiver<(Span, E)>);

pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), Receiver(rx))
}

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<E> Sender<E> {
    /// Sends an event, dropping it if the receiver has gone away.
    pub fn send(&self, event: E) { _ = self.try_send(event); }

    pub fn try_send(&self, event: E) -> Result<(), mpsc::error::SendError<E>> {
        self.0
            .send((Span::current(), event))
            .map_err(|mpsc::error::SendError((_, event))| mpsc::error::SendError(event))
    }

    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

impl<E> Receiver<E> {
    pub async fn recv(&mut self) -> Option<(Span, E)> { self.0.recv().await }

    pub fn try_recv(&mut self) -> Option<(Span, E)> { self.0.try_recv().ok() }
}

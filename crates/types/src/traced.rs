use std::fmt;
use tokio::sync::mpsc::{error::SendError, UnboundedSender};

/// A service message paired with the span that was current when it was sent.
///
/// The receiving loop instruments its handler with `span`, so log lines
/// emitted while handling a LIB update are attributed to whoever reported it.
pub struct Traced<T> {
    pub inner: T,
    pub span: tracing::Span,
}

impl<T> Traced<T> {
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            span: tracing::Span::current(),
        }
    }

    pub fn into_parts(self) -> (T, tracing::Span) {
        (self.inner, self.span)
    }
}

impl<T: fmt::Debug> fmt::Debug for Traced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traced")
            .field("inner", &self.inner)
            .finish()
    }
}

pub trait SendTraced<T> {
    /// Sends `msg` under the caller's current span.
    fn send_traced(&self, msg: T) -> Result<(), SendError<Traced<T>>>;
}

impl<T> SendTraced<T> for UnboundedSender<Traced<T>> {
    fn send_traced(&self, msg: T) -> Result<(), SendError<Traced<T>>> {
        self.send(Traced::new(msg))
    }
}

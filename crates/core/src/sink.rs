/* 
This Source Code Form is subject to the terms of the Mozilla Public License, v. 2.0. 
If a copy of the MPL was not distributed with this file, 
You can obtain one at https://mozilla.org/MPL/2.0/. 
*/

//! Completion sinks - the callbacks a timer invokes whenever it completes an interval.
//! 
//! A sink is a shared, thread-safe handle to a zero-argument closure. The timer only 
//! ever holds a reference to it; whatever state the closure captures still belongs 
//! to whoever built it, so the same sink can be handed to several timers or kept 
//! around by the caller to inspect afterwards.
//! 
//! Sinks run synchronously, in-line with the tick that completed the interval. 
//! Keep them short - a sink that blocks stalls the frame.

use alloc::sync::Arc;

/// Trait alias for anything that can be used as a completion callback.
pub trait CompletionSinkFn: Send + Sync + Fn() {}
impl<F: Send + Sync + Fn()> CompletionSinkFn for F {}

/// The underlying 'backend' type for CompletionSink
type CompletionSinkValue = Arc<dyn CompletionSinkFn>;

/// A cheaply clonable handle to a completion callback.
/// 
/// Failures inside the callback are not the timer's business; 
/// if the closure panics, the panic unwinds straight through the tick.
#[derive(Clone)]
pub struct CompletionSink {
    wrapped: CompletionSinkValue
}

impl CompletionSink {
    #[inline]
    pub fn new<F: CompletionSinkFn + 'static>(callback: F) -> Self {
        Self { wrapped: Arc::new(callback) }
    }

    /// Runs the wrapped callback once.
    #[inline]
    pub fn notify(&self) {
        (self.wrapped)()
    }

    /// True if both handles point at the very same callback.
    pub fn same_callback(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.wrapped, &other.wrapped)
    }
}

impl From<Arc<dyn CompletionSinkFn>> for CompletionSink {
    fn from(value: Arc<dyn CompletionSinkFn>) -> Self {
        Self { wrapped: value }
    }
}

impl core::fmt::Debug for CompletionSink {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "CompletionSink({:p})", Arc::as_ptr(&self.wrapped))
    }
}

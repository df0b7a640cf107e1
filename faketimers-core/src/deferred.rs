//! ## faketimers-core::deferred
//! **FIFO of calls deferred to the next time advance**
//!
//! Built on crossbeam's segmented queue: unbounded, so enqueueing never fails.

use crossbeam::queue::SegQueue;

/// A `(function, context, parameter)` triple bound for one invocation against `S`.
pub struct DeferredCall<S> {
    invoke: Box<dyn FnOnce(&mut S)>,
}

impl<S> DeferredCall<S> {
    pub fn new<F, X, P>(function: F, context: X, parameter: P) -> Self
    where
        F: FnOnce(&mut S, X, P) + 'static,
        X: 'static,
        P: 'static,
    {
        Self {
            invoke: Box::new(move |target| function(target, context, parameter)),
        }
    }

    /// Consumes the call.
    #[inline]
    pub fn invoke(self, target: &mut S) {
        (self.invoke)(target)
    }
}

pub struct DeferredCallQueue<S> {
    queue: SegQueue<DeferredCall<S>>,
}

impl<S> Default for DeferredCallQueue<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> DeferredCallQueue<S> {
    pub fn new() -> Self {
        Self {
            queue: SegQueue::new(),
        }
    }

    /// Appends to the tail. Always succeeds.
    pub fn call_enqueue(&self, call: DeferredCall<S>) -> bool {
        self.queue.push(call);
        true
    }

    /// Removes the head, if any.
    pub fn call_dequeue(&self) -> Option<DeferredCall<S>> {
        self.queue.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

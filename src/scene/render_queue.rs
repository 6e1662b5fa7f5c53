// SPDX-License-Identifier: GPL-3.0-only

//! Deferred task submission onto the render thread
//!
//! The render thread owns the scene and drains its [`RenderQueue`] once per
//! frame. Any other thread holds a [`RenderQueueHandle`] and either posts a
//! task (`submit`) or posts it and waits for it to finish (`run` /
//! `submit_and_wait`). Tasks never run anywhere but on the render thread.

use crate::errors::{HudError, HudResult};
use std::panic::{self, AssertUnwindSafe};
use std::thread::{self, ThreadId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, warn};

/// Unit of work executed against the render thread's state
pub type RenderTask<T> = Box<dyn FnOnce(&mut T) + Send + 'static>;

struct Envelope<T> {
    task: RenderTask<T>,
    reply: Option<oneshot::Sender<HudResult<()>>>,
}

/// Receiving side, owned by the render thread
pub struct RenderQueue<T> {
    receiver: mpsc::UnboundedReceiver<Envelope<T>>,
    handle: RenderQueueHandle<T>,
}

/// Sending side, cheap to clone and usable from any thread
pub struct RenderQueueHandle<T> {
    sender: mpsc::UnboundedSender<Envelope<T>>,
    render_thread: ThreadId,
}

impl<T> Clone for RenderQueueHandle<T> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            render_thread: self.render_thread,
        }
    }
}

/// A task taken off the queue, ready to run
pub struct PendingTask<T>(Envelope<T>);

impl<T> RenderQueue<T> {
    /// Create a queue whose render thread is the calling thread
    pub fn new() -> Self {
        Self::for_thread(thread::current().id())
    }

    /// Create a queue drained by the given thread
    pub fn for_thread(render_thread: ThreadId) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        Self {
            receiver,
            handle: RenderQueueHandle {
                sender,
                render_thread,
            },
        }
    }

    pub fn handle(&self) -> RenderQueueHandle<T> {
        self.handle.clone()
    }

    /// Take the next queued task without blocking
    pub fn next_task(&mut self) -> Option<PendingTask<T>> {
        self.receiver.try_recv().ok().map(PendingTask)
    }

    /// Refuse new tasks and drop everything still queued.
    ///
    /// Waiters on dropped tasks observe `HudError::QueueClosed`.
    pub fn close(&mut self) {
        self.receiver.close();
        let mut dropped = 0usize;
        while self.receiver.try_recv().is_ok() {
            dropped += 1;
        }
        if dropped > 0 {
            debug!(dropped, "Render queue closed with pending tasks");
        }
    }
}

impl<T> Default for RenderQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PendingTask<T> {
    /// Run the task against `target`, reporting the outcome to any waiter.
    ///
    /// A panicking task is contained here so it cannot take down the render
    /// thread.
    pub fn run(self, target: &mut T) -> HudResult<()> {
        let Envelope { task, reply } = self.0;
        let result = panic::catch_unwind(AssertUnwindSafe(|| task(target))).map_err(|payload| {
            let message = panic_message(payload.as_ref());
            error!(error = %message, "Render task panicked");
            HudError::TaskPanicked(message)
        });

        if let Some(reply) = reply {
            // Waiter may have given up (timeout); nothing to report then
            let _ = reply.send(result.clone());
        }
        result
    }
}

impl<T> RenderQueueHandle<T> {
    /// Whether the caller is the render thread
    pub fn is_render_thread(&self) -> bool {
        thread::current().id() == self.render_thread
    }

    /// Post a task without waiting for it
    pub fn submit<F>(&self, task: F) -> HudResult<()>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        self.sender
            .send(Envelope {
                task: Box::new(task),
                reply: None,
            })
            .map_err(|_| HudError::QueueClosed)
    }

    /// Post a task and resolve once the render thread has run it
    pub async fn run<F>(&self, task: F) -> HudResult<()>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(Envelope {
                task: Box::new(task),
                reply: Some(reply_tx),
            })
            .map_err(|_| HudError::QueueClosed)?;

        reply_rx.await.map_err(|_| HudError::QueueClosed)?
    }

    /// Blocking form of [`run`](Self::run) for plain threads.
    ///
    /// Must not be called from the render thread itself, which would wait on
    /// its own queue forever.
    pub fn submit_and_wait<F>(&self, task: F) -> HudResult<()>
    where
        F: FnOnce(&mut T) + Send + 'static,
    {
        if self.is_render_thread() {
            warn!("submit_and_wait called on the render thread");
            return Err(HudError::InvalidArgument(
                "submit_and_wait would block the render thread".to_string(),
            ));
        }
        pollster::block_on(self.run(task))
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn drain(queue: &mut RenderQueue<Vec<u32>>, state: &mut Vec<u32>) -> usize {
        let mut ran = 0;
        while let Some(task) = queue.next_task() {
            let _ = task.run(state);
            ran += 1;
        }
        ran
    }

    #[test]
    fn test_tasks_run_in_submission_order() {
        let mut queue = RenderQueue::new();
        let handle = queue.handle();
        for i in 0..5 {
            handle.submit(move |v: &mut Vec<u32>| v.push(i)).unwrap();
        }

        let mut state = Vec::new();
        assert_eq!(drain(&mut queue, &mut state), 5);
        assert_eq!(state, vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_submit_and_wait_from_worker_thread() {
        let mut queue = RenderQueue::new();
        let handle = queue.handle();

        let worker = thread::spawn(move || {
            assert!(!handle.is_render_thread());
            handle.submit_and_wait(|v: &mut Vec<u32>| v.push(7))
        });

        let mut state = Vec::new();
        while !worker.is_finished() {
            drain(&mut queue, &mut state);
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(worker.join().unwrap(), Ok(()));
        assert_eq!(state, vec![7]);
    }

    #[test]
    fn test_submit_and_wait_refused_on_render_thread() {
        let queue: RenderQueue<Vec<u32>> = RenderQueue::new();
        let handle = queue.handle();
        assert!(handle.is_render_thread());
        assert!(matches!(
            handle.submit_and_wait(|v| v.push(1)),
            Err(HudError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_panicking_task_is_contained() {
        let mut queue = RenderQueue::new();
        let handle = queue.handle();
        handle.submit(|_: &mut Vec<u32>| panic!("boom")).unwrap();
        handle.submit(|v: &mut Vec<u32>| v.push(1)).unwrap();

        let mut state = Vec::new();
        let first = queue.next_task().unwrap().run(&mut state);
        assert_eq!(first, Err(HudError::TaskPanicked("boom".to_string())));
        drain(&mut queue, &mut state);
        assert_eq!(state, vec![1]);
    }

    #[test]
    fn test_close_fails_waiters_and_new_submissions() {
        let mut queue: RenderQueue<Vec<u32>> = RenderQueue::new();
        let handle = queue.handle();

        let waiter_handle = handle.clone();
        let waiter = thread::spawn(move || waiter_handle.submit_and_wait(|v| v.push(1)));

        // Let the waiter enqueue before closing
        thread::sleep(Duration::from_millis(50));
        queue.close();

        assert_eq!(waiter.join().unwrap(), Err(HudError::QueueClosed));
        assert_eq!(handle.submit(|v| v.push(2)), Err(HudError::QueueClosed));
        assert!(handle.is_closed());
    }
}

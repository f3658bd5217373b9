use std::fmt;

type Task = Box<dyn FnOnce() + Send + 'static>;

/// A unit of work: an executable body together with the context it owns.
///
/// The context is whatever the closure captures, so ownership of it moves
/// into the job on submission and on to the worker that runs it. A job
/// created with [`Job::empty`] has no body; workers skip it.
pub struct Job {
    task: Option<Task>,
}

impl Job {
    /// Creates a job that runs `f` once.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Job {
            task: Some(Box::new(f)),
        }
    }

    /// Creates a job that calls `f(ctx)`.
    pub fn with_context<C>(f: fn(C), ctx: C) -> Self
    where
        C: Send + 'static,
    {
        Job::new(move || f(ctx))
    }

    /// Creates a job with no body.
    pub fn empty() -> Self {
        Job { task: None }
    }

    /// Returns `true` if this job has no body.
    pub fn is_empty(&self) -> bool {
        self.task.is_none()
    }

    /// Runs the job on the calling thread.
    ///
    /// Returns `false` without doing anything if the job is empty. A panic
    /// inside the body propagates to the caller.
    pub fn run(self) -> bool {
        match self.task {
            Some(task) => {
                task();
                true
            }
            None => false,
        }
    }
}

impl Default for Job {
    fn default() -> Self {
        Job::empty()
    }
}

impl fmt::Debug for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Job")
            .field("empty", &self.is_empty())
            .finish()
    }
}

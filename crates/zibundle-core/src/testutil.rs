//! Shared test doubles for the runner seam.

use std::cell::RefCell;
use std::io;

use crate::runner::{Completed, Invocation, ToolRunner};

type Responder = Box<dyn Fn(&Invocation) -> io::Result<Completed>>;

/// A [`ToolRunner`] that records every invocation and answers from a
/// scripted responder. Single-threaded by construction, like the
/// pipeline itself.
pub(crate) struct FakeRunner {
    calls: RefCell<Vec<Invocation>>,
    respond: Responder,
}

impl FakeRunner {
    pub(crate) fn new(respond: impl Fn(&Invocation) -> io::Result<Completed> + 'static) -> Self {
        Self {
            calls: RefCell::new(Vec::new()),
            respond: Box::new(respond),
        }
    }

    /// Every command exits zero with no output.
    pub(crate) fn all_ok() -> Self {
        Self::new(|_| Ok(ok()))
    }

    /// Every command exits with the given code.
    pub(crate) fn all_fail(code: i32) -> Self {
        Self::new(move |_| Ok(fail(code)))
    }

    /// Every command exits zero; captured stdout is the given bytes.
    pub(crate) fn ok_with_stdout(stdout: Vec<u8>) -> Self {
        Self::new(move |_| {
            Ok(Completed {
                code: Some(0),
                stdout: stdout.clone(),
            })
        })
    }

    /// Every command fails to spawn.
    pub(crate) fn spawn_error() -> Self {
        Self::new(|_| Err(io::Error::new(io::ErrorKind::NotFound, "no such tool")))
    }

    /// Snapshot of the recorded invocations.
    pub(crate) fn calls(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }
}

impl ToolRunner for FakeRunner {
    fn run(&self, invocation: &Invocation) -> io::Result<Completed> {
        self.calls.borrow_mut().push(invocation.clone());
        (self.respond)(invocation)
    }
}

/// A zero exit with no output.
pub(crate) fn ok() -> Completed {
    Completed {
        code: Some(0),
        stdout: Vec::new(),
    }
}

/// A non-zero exit with no output.
pub(crate) fn fail(code: i32) -> Completed {
    Completed {
        code: Some(code),
        stdout: Vec::new(),
    }
}

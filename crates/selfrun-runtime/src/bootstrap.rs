//! Startup sequence.
//!
//! ```text
//! Init ──▶ LibrariesLoaded ──▶ PayloadLoaded ──▶ Running ──▶ Done
//!   └──────────────┴──────────────────┴─────────────┴──────▶ Failed
//! ```
//!
//! Each step runs once, in order; calling one from any other stage returns
//! [`LaunchError::OutOfOrder`]. The first engine or payload error moves the
//! sequence to `Failed` and is handed back to the caller, which is expected
//! to report it and exit. The engine is torn down when the [`Bootstrap`] is
//! dropped.

use std::fmt;
use std::path::Path;

use crate::args::Arguments;
use crate::bundle::{self, PayloadReader};
use crate::engine::Engine;
use crate::error::LaunchError;
use crate::options::LaunchOptions;

/// Where a launch currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    LibrariesLoaded,
    PayloadLoaded,
    Running,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "init",
            Stage::LibrariesLoaded => "libraries-loaded",
            Stage::PayloadLoaded => "payload-loaded",
            Stage::Running => "running",
            Stage::Done => "done",
            Stage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// Drives one engine instance through the startup stages.
pub struct Bootstrap<E: Engine> {
    engine: E,
    options: LaunchOptions,
    stage: Stage,
}

impl<E: Engine> Bootstrap<E> {
    pub fn new(engine: E, options: LaunchOptions) -> Self {
        Self {
            engine,
            options,
            stage: Stage::Init,
        }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    /// `Init → LibrariesLoaded`: register the standard libraries with the
    /// collector paused, so registration garbage is not collected mid-way.
    pub fn open_libraries(&mut self) -> Result<(), LaunchError> {
        self.require(Stage::Init, "open libraries")?;
        if self.options.pause_collector {
            self.engine.pause_collector();
        }
        let result = self.engine.open_libraries();
        if self.options.pause_collector {
            self.engine.resume_collector();
        }
        self.advance(result, Stage::LibrariesLoaded)
    }

    /// `LibrariesLoaded → PayloadLoaded`: locate the payload in `exe` and
    /// stream it into the engine.
    pub fn load_payload(&mut self, exe: &Path) -> Result<(), LaunchError> {
        self.require(Stage::LibrariesLoaded, "load the payload")?;
        let result = self.stream_payload(exe);
        self.advance(result, Stage::PayloadLoaded)
    }

    fn stream_payload(&mut self, exe: &Path) -> Result<(), LaunchError> {
        let range = bundle::locate(exe)?;
        let chunk_name = self.options.chunk_name_for(exe);
        let mut reader = PayloadReader::from_range(range, self.options.chunk_size);
        let result = self.engine.load(&chunk_name, &mut reader);
        drop(reader);
        result
    }

    /// `PayloadLoaded → Running → Done`: publish the argument table and call
    /// the payload with the forwarded arguments.
    pub fn run(&mut self, args: &Arguments) -> Result<(), LaunchError> {
        self.require(Stage::PayloadLoaded, "run the payload")?;
        let result = self.engine.set_arg_table(&self.options.arg_global, args);
        self.advance(result, Stage::Running)?;
        let result = self.engine.call(args.forwarded());
        self.advance(result, Stage::Done)
    }

    /// Steps run once, in order. A misplaced call leaves the stage as is.
    fn require(&self, stage: Stage, step: &'static str) -> Result<(), LaunchError> {
        if self.stage == stage {
            Ok(())
        } else {
            Err(LaunchError::OutOfOrder {
                step,
                stage: self.stage,
            })
        }
    }

    fn advance(&mut self, result: Result<(), LaunchError>, next: Stage) -> Result<(), LaunchError> {
        match result {
            Ok(()) => {
                tracing::debug!(from = %self.stage, to = %next, "bootstrap stage");
                self.stage = next;
                Ok(())
            }
            Err(err) => {
                tracing::debug!(from = %self.stage, error = %err, "bootstrap failed");
                self.stage = Stage::Failed;
                Err(err)
            }
        }
    }
}

/// Run the full sequence against the payload glued onto `exe`.
pub fn launch<E: Engine>(
    engine: E,
    exe: &Path,
    args: &Arguments,
    options: LaunchOptions,
) -> Result<(), LaunchError> {
    let mut boot = Bootstrap::new(engine, options);
    boot.open_libraries()?;
    boot.load_payload(exe)?;
    boot.run(args)
}

//! Public host-facing API for embedding the simulator core.
//!
//! [`Simulator`] owns memory, `pc`, flags, the register window and the I/O
//! hook. External mutators are gated by the run scope: while a [`RunScope`]
//! is held they report [`WriteOutcome::Refused`] and change nothing, while
//! instruction handlers keep writing through the internal path.

use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::execute::{step_one, Retired};
use crate::fault::{ConfigError, FaultCode, StepError};
use crate::memory::{words_from_be_bytes, Memory, DEFAULT_MEMORY_CELLS, MAX_MEMORY_CELLS};
use crate::state::{Flags, Register, RunState, WriteOutcome, WINDOW_REGISTER_COUNT};

/// Default program counter at construction.
pub const DEFAULT_START_PC: u16 = 0x10;

/// Construction-time configuration for a simulator instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub struct SimConfig {
    /// Initial program counter.
    pub start_pc: u16,
    /// Memory size in 16-bit cells.
    pub memory_size: usize,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            start_pc: DEFAULT_START_PC,
            memory_size: DEFAULT_MEMORY_CELLS,
        }
    }
}

impl SimConfig {
    /// Checks that memory can hold a register window, fits the 16-bit address
    /// space, and contains the start PC.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] violated.
    pub const fn validate(&self) -> Result<(), ConfigError> {
        if self.memory_size < WINDOW_REGISTER_COUNT {
            return Err(ConfigError::MemoryTooSmall {
                size: self.memory_size,
                min: WINDOW_REGISTER_COUNT,
            });
        }
        if self.memory_size > MAX_MEMORY_CELLS {
            return Err(ConfigError::MemoryTooLarge {
                size: self.memory_size,
                max: MAX_MEMORY_CELLS,
            });
        }
        if self.start_pc as usize >= self.memory_size {
            return Err(ConfigError::StartPcOutOfRange {
                start_pc: self.start_pc,
                size: self.memory_size,
            });
        }
        Ok(())
    }
}

/// Peripheral I/O capability bound to a simulator.
///
/// Called with an I/O address and `Some(data)` for writes or `None` for
/// reads. Reads return the value read; the return value of writes is ignored.
pub trait IoHook {
    /// Performs one I/O access.
    fn access(&mut self, addr: u16, data: Option<u16>) -> Option<u16>;
}

impl<F> IoHook for F
where
    F: FnMut(u16, Option<u16>) -> Option<u16>,
{
    fn access(&mut self, addr: u16, data: Option<u16>) -> Option<u16> {
        self(addr, data)
    }
}

/// Boxed hook as stored by the simulator.
pub type BoxedIoHook = Box<dyn IoHook + Send>;

/// Boneless machine state and step engine.
pub struct Simulator {
    pub(crate) memory: Memory,
    pub(crate) pc: u16,
    pub(crate) window: u16,
    pub(crate) flags: Flags,
    run_state: RunState,
    io_hook: Option<BoxedIoHook>,
}

impl fmt::Debug for Simulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Simulator")
            .field("memory_size", &self.memory.len())
            .field("pc", &self.pc)
            .field("window", &self.window)
            .field("flags", &self.flags)
            .field("run_state", &self.run_state)
            .field("io_hook", &self.io_hook.is_some())
            .finish()
    }
}

impl Simulator {
    /// Creates a simulator with zeroed memory, `window = 0`, cleared flags
    /// and no I/O hook.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] when `config` fails [`SimConfig::validate`].
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        tracing::debug!(
            start_pc = format_args!("{:#06x}", config.start_pc),
            memory_size = config.memory_size,
            "simulator created"
        );
        Ok(Self {
            memory: Memory::new(config.memory_size),
            pc: config.start_pc,
            window: 0,
            flags: Flags::default(),
            run_state: RunState::Idle,
            io_hook: None,
        })
    }

    /// Binds an I/O hook at construction.
    #[must_use]
    pub fn with_io_hook(mut self, hook: impl IoHook + Send + 'static) -> Self {
        self.io_hook = Some(Box::new(hook));
        self
    }

    /// Current program counter.
    #[must_use]
    pub const fn pc(&self) -> u16 {
        self.pc
    }

    /// Current register window base.
    #[must_use]
    pub const fn window(&self) -> u16 {
        self.window
    }

    /// Current condition flags.
    #[must_use]
    pub const fn flags(&self) -> Flags {
        self.flags
    }

    /// Current run-scope state.
    #[must_use]
    pub const fn run_state(&self) -> RunState {
        self.run_state
    }

    /// Returns true while a run scope is held.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.run_state.is_active()
    }

    /// Read-only view of all memory.
    #[must_use]
    pub fn memory(&self) -> &[u16] {
        self.memory.as_slice()
    }

    /// Reads one memory cell.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when `addr` is past the end.
    pub fn read_memory(&self, addr: u16) -> Result<u16, FaultCode> {
        self.memory.read(usize::from(addr))
    }

    /// The 16 cells of the current register window.
    #[must_use]
    pub fn regs(&self) -> &[u16] {
        let base = usize::from(self.window);
        &self.memory.as_slice()[base..base + WINDOW_REGISTER_COUNT]
    }

    /// Reads `reg` from the current window.
    #[must_use]
    pub fn read_register(&self, reg: Register) -> u16 {
        self.memory.as_slice()[self.register_address(reg)]
    }

    /// Writes `reg` from outside the step loop.
    pub fn write_register(&mut self, reg: Register, value: u16) -> WriteOutcome {
        if self.is_active() {
            return self.refuse("write_register");
        }
        self.write_register_internal(reg, value);
        WriteOutcome::Applied
    }

    /// Sets the program counter from outside the step loop.
    ///
    /// A `pc` past the end of memory is accepted here and faults on the next
    /// fetch.
    pub fn set_pc(&mut self, pc: u16) -> WriteOutcome {
        if self.is_active() {
            return self.refuse("set_pc");
        }
        self.pc = pc;
        WriteOutcome::Applied
    }

    /// Moves the register window from outside the step loop.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when the window would extend past
    /// the end of memory.
    pub fn set_window(&mut self, window: u16) -> Result<WriteOutcome, FaultCode> {
        if self.is_active() {
            return Ok(self.refuse("set_window"));
        }
        self.memory.slice(usize::from(window), WINDOW_REGISTER_COUNT)?;
        self.window = window;
        Ok(WriteOutcome::Applied)
    }

    /// Copies `words` into memory starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::OutOfBounds`] when the program overruns memory;
    /// nothing is written in that case.
    pub fn load_program(&mut self, words: &[u16], start: u16) -> Result<WriteOutcome, FaultCode> {
        if self.is_active() {
            return Ok(self.refuse("load_program"));
        }
        self.memory.load(usize::from(start), words)?;
        tracing::debug!(
            start = format_args!("{start:#06x}"),
            words = words.len(),
            "program loaded"
        );
        Ok(WriteOutcome::Applied)
    }

    /// Copies a big-endian byte stream into memory starting at `start`.
    ///
    /// # Errors
    ///
    /// Returns [`FaultCode::InvalidEncoding`] for an odd byte count and
    /// [`FaultCode::OutOfBounds`] when the program overruns memory.
    pub fn load_program_bytes(
        &mut self,
        bytes: &[u8],
        start: u16,
    ) -> Result<WriteOutcome, FaultCode> {
        if self.is_active() {
            return Ok(self.refuse("load_program_bytes"));
        }
        let words = words_from_be_bytes(bytes)?;
        self.load_program(&words, start)
    }

    /// Replaces the I/O hook, or removes it with `None`.
    pub fn rebind_io_hook(&mut self, hook: Option<BoxedIoHook>) -> WriteOutcome {
        if self.is_active() {
            return self.refuse("rebind_io_hook");
        }
        self.io_hook = hook;
        WriteOutcome::Applied
    }

    /// Returns true when an I/O hook is bound.
    #[must_use]
    pub const fn has_io_hook(&self) -> bool {
        self.io_hook.is_some()
    }

    /// Performs one access through the bound I/O hook.
    ///
    /// Returns `None` when no hook is bound or the access produced no value.
    pub fn io_access(&mut self, addr: u16, data: Option<u16>) -> Option<u16> {
        self.io_hook.as_mut()?.access(addr, data)
    }

    /// Enters the run scope. External mutators are refused until the
    /// returned guard is dropped.
    pub fn enter_run_scope(&mut self) -> RunScope<'_> {
        let previous = self.run_state;
        self.run_state = RunState::Active;
        tracing::debug!(pc = format_args!("{:#06x}", self.pc), "run scope entered");
        RunScope {
            sim: self,
            previous,
        }
    }

    /// Executes one instruction.
    ///
    /// # Errors
    ///
    /// Returns a [`StepError`] for unimplemented classes, invalid encodings
    /// and out-of-bounds fetches. State is unchanged on error.
    pub fn step(&mut self) -> Result<Retired, StepError> {
        step_one(self)
    }

    /// Steps up to `max_steps` instructions inside a run scope.
    ///
    /// Stops early at the first fault. The scope is released on both paths.
    pub fn run(&mut self, max_steps: u32) -> RunOutcome {
        let mut scope = self.enter_run_scope();
        let mut steps = 0;

        while steps < max_steps {
            if let Err(fault) = scope.step() {
                tracing::warn!(%fault, steps, "run stopped on fault");
                return RunOutcome {
                    steps,
                    stop: RunStop::Fault(fault),
                };
            }
            steps += 1;
        }

        RunOutcome {
            steps,
            stop: RunStop::StepLimit,
        }
    }

    /// Handler write path; ignores the run scope.
    pub(crate) fn write_register_internal(&mut self, reg: Register, value: u16) {
        let addr = self.register_address(reg);
        self.memory.as_mut_slice()[addr] = value;
    }

    /// Absolute address of `reg`; in range because `window + 16 <= memsize`.
    fn register_address(&self, reg: Register) -> usize {
        usize::from(self.window) + reg.index()
    }

    fn refuse(&self, operation: &'static str) -> WriteOutcome {
        tracing::debug!(operation, run_state = ?self.run_state, "external mutation refused");
        WriteOutcome::Refused
    }
}

/// Guard holding the run scope; dropping it restores the previous run state.
///
/// Dereferences to the [`Simulator`], so stepping happens through the guard.
#[must_use = "the run scope is released as soon as the guard is dropped"]
pub struct RunScope<'a> {
    sim: &'a mut Simulator,
    previous: RunState,
}

impl fmt::Debug for RunScope<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunScope")
            .field("sim", &self.sim)
            .field("previous", &self.previous)
            .finish()
    }
}

impl Deref for RunScope<'_> {
    type Target = Simulator;

    fn deref(&self) -> &Simulator {
        self.sim
    }
}

impl DerefMut for RunScope<'_> {
    fn deref_mut(&mut self) -> &mut Simulator {
        self.sim
    }
}

impl Drop for RunScope<'_> {
    fn drop(&mut self) {
        self.sim.run_state = self.previous;
        tracing::debug!(pc = format_args!("{:#06x}", self.sim.pc), "run scope exited");
    }
}

/// Why [`Simulator::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunStop {
    /// `max_steps` instructions retired.
    StepLimit,
    /// A step faulted; the faulting instruction did not retire.
    Fault(StepError),
}

/// Aggregated outcome of [`Simulator::run`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunOutcome {
    /// Number of retired instructions.
    pub steps: u32,
    /// Reason the run stopped.
    pub stop: RunStop,
}

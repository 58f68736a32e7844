//! A cycle-accurate simulator of a Tomasulo-style out-of-order core with a
//! reorder buffer.
//!
//! The [`engine`] module is the microarchitectural state machine:
//! reservation stations, the reorder buffer, the per-cycle issue/execute/
//! commit stages, and the scheduler that drives them. [`asm`] is the
//! external collaborator that turns program text into the [`isa::Instruction`]
//! stream the engine consumes. [`config`] and [`error`] are the ambient
//! configuration and error-reporting surface shared by the library and its
//! CLI driver.
//!
//! ```
//! use tomasulo_core::{asm, config::Config, engine::Engine};
//!
//! let program = asm::parse("ADD R1, R0, R0\nHALT\n").unwrap();
//! let mut engine = Engine::new(Config::default());
//! let report = engine.run(&program);
//! assert_eq!(report.registers[1], 0);
//! ```

pub mod arch;
pub mod asm;
pub mod config;
pub mod engine;
pub mod error;
pub mod isa;
pub mod stats;

pub use error::SimError;

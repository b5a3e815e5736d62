//! Crate error type.
//!
//! Only the outer surface (terminal session setup, the blocking event
//! loop) reports errors. Everything inside the runtime follows the
//! degrade-don't-crash policy: misuse is logged and the operation becomes
//! a no-op.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal io: {0}")]
    Io(#[from] std::io::Error),

    #[error("event loop is already running at depth {0}")]
    LoopReentered(u32),
}

pub type Result<T> = std::result::Result<T, Error>;

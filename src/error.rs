//! Error types shared by the cartridge loader and the emulation core.
//!
//! Cartridge problems are ordinary `Result` errors: the host decides what
//! to do with a bad image. Faults raised while emulating are not; they go
//! through [`fatal`] and stop the process.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CartridgeError {
    #[error("file is not in iNES file format")]
    InvalidFormat,

    #[error("iNES version {0} is not supported")]
    UnsupportedVersion(u8),

    #[error("{section} truncated: expected {expected} bytes, got {actual}")]
    Truncated {
        section: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// What went wrong with a memory access.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Violation {
    #[error("read from write-only register")]
    WriteOnly,

    #[error("write to read-only location")]
    ReadOnly,

    #[error("unmapped address")]
    Unmapped,
}

/// Unrecoverable conditions hit by a running program.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("address violation at {addr:#06x}: {kind}")]
    AddressViolation { addr: u16, kind: Violation },

    #[error("unknown opcode {code:#04x} at {pc:#06x}")]
    UnknownOpcode { code: u8, pc: u16 },
}

pub(crate) fn fatal(fault: Fault) -> ! {
    log::error!("{}", fault);
    panic!("{}", fault)
}

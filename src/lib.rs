//! A 6502 CPU, PPU and iNES cartridge loader wired together over a
//! memory-mapped bus. The host drives everything through `CPU::step` /
//! `CPU::run_with_callback`; presentation and input stay on the host side.

pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod error;
pub mod opcodes;
pub mod ppu;
pub mod trace;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate bitflags;

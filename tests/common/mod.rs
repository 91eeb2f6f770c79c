#![allow(dead_code)]

use tiny_nes::bus::Bus;
use tiny_nes::cartridge::{Rom, CHR_ROM_PAGE_SIZE, PRG_ROM_PAGE_SIZE};
use tiny_nes::cpu::CPU;

pub const NES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];

/// Raw iNES image builder.
pub struct InesImage {
    pub prg_pages: u8,
    pub chr_pages: u8,
    pub flags6: u8,
    pub flags7: u8,
    pub trainer: bool,
    prg_rom: Vec<u8>,
}

impl InesImage {
    pub fn new(prg_pages: u8) -> Self {
        InesImage {
            prg_pages,
            chr_pages: 1,
            flags6: 0,
            flags7: 0,
            trainer: false,
            prg_rom: vec![0; prg_pages as usize * PRG_ROM_PAGE_SIZE],
        }
    }

    /// Places `program` at $8000 and points the reset vector there.
    pub fn program(mut self, program: &[u8]) -> Self {
        self.prg_rom[..program.len()].copy_from_slice(program);
        self.vector(0xFFFC, 0x8000)
    }

    /// Writes a vector at a CPU address in $8000-$FFFF.
    pub fn vector(mut self, addr: u16, target: u16) -> Self {
        let offset = (addr as usize - 0x8000) % self.prg_rom.len();
        self.prg_rom[offset] = (target & 0xff) as u8;
        self.prg_rom[offset + 1] = (target >> 8) as u8;
        self
    }

    pub fn flags6(mut self, flags6: u8) -> Self {
        self.flags6 = flags6;
        self
    }

    pub fn flags7(mut self, flags7: u8) -> Self {
        self.flags7 = flags7;
        self
    }

    pub fn with_trainer(mut self) -> Self {
        self.trainer = true;
        self.flags6 |= 0b100;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(&NES_TAG);
        raw.extend_from_slice(&[self.prg_pages, self.chr_pages, self.flags6, self.flags7]);
        raw.extend_from_slice(&[0; 8]);
        if self.trainer {
            raw.extend_from_slice(&[0xEE; 512]);
        }
        raw.extend_from_slice(&self.prg_rom);
        raw.extend(std::iter::repeat(0x5A).take(self.chr_pages as usize * CHR_ROM_PAGE_SIZE));
        raw
    }

    pub fn rom(&self) -> Rom {
        Rom::new(&self.build()).expect("test image should parse")
    }
}

/// A reset CPU running `program` from a 16KB cartridge.
pub fn cpu_with(program: &[u8]) -> CPU<'static> {
    let mut cpu = CPU::new(Bus::new(InesImage::new(1).program(program).rom()));
    cpu.reset();
    cpu
}

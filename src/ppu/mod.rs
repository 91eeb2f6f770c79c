pub mod registers;

use crate::cartridge::Mirroring;
use crate::error::{fatal, Fault, Violation};
use registers::addr::AddrRegister;
use registers::control::ControlRegister;
use registers::mask::MaskRegister;
use registers::oam::OamRegisters;
use registers::scroll::ScrollRegister;
use registers::status::StatusRegister;

// PPU memory map
//
// $0000 - $1FFF  pattern tables (CHR ROM)
// $2000 - $2FFF  nametables (2KB VRAM, mirrored by cartridge wiring)
// $3000 - $3EFF  mirror of $2000 - $2EFF (not mapped here)
// $3F00 - $3FFF  palette RAM, 32 bytes mirrored

const SCANLINE_DOTS: usize = 341;
const VBLANK_SCANLINE: u16 = 241;
const FRAME_SCANLINES: u16 = 262;

/// Register-level interface the CPU bus talks to.
pub trait PPU {
    fn write_to_ctrl(&mut self, value: u8);
    fn write_to_mask(&mut self, value: u8);
    fn read_status(&mut self) -> u8;
    fn write_to_oam_addr(&mut self, value: u8);
    fn write_to_oam_data(&mut self, value: u8);
    fn read_oam_data(&self) -> u8;
    fn write_to_scroll(&mut self, value: u8);
    fn write_to_ppu_addr(&mut self, value: u8);
    fn write_to_data(&mut self, value: u8);
    fn read_data(&mut self) -> u8;
    fn write_oam_dma(&mut self, value: &[u8; 256]);
}

pub struct NesPPU {
    chr_rom: Vec<u8>,
    palette_table: [u8; 32],
    vram: [u8; 2048],
    oam: OamRegisters,
    mirroring: Mirroring,

    addr: AddrRegister,
    ctrl: ControlRegister,
    mask: MaskRegister,
    scroll: ScrollRegister,
    status: StatusRegister,
    internal_data_buf: u8,

    scanline: u16,
    cycles: usize,
    nmi_interrupt: Option<u8>,
}

impl NesPPU {
    pub fn new_empty_rom() -> Self {
        NesPPU::new(vec![0; 2048], Mirroring::HORIZONTAL)
    }

    pub fn new(chr_rom: Vec<u8>, mirroring: Mirroring) -> Self {
        NesPPU {
            chr_rom,
            mirroring,
            vram: [0; 2048],
            oam: OamRegisters::new(),
            palette_table: [0; 32],
            addr: AddrRegister::new(),
            ctrl: ControlRegister::new(),
            mask: MaskRegister::new(),
            scroll: ScrollRegister::new(),
            status: StatusRegister::new(),
            internal_data_buf: 0,
            scanline: 0,
            cycles: 0,
            nmi_interrupt: None,
        }
    }

    /// Advances the PPU by `cycles` dots. Returns true when a frame completed.
    pub fn tick(&mut self, cycles: u16) -> bool {
        self.cycles += cycles as usize;
        let mut frame_complete = false;

        while self.cycles >= SCANLINE_DOTS {
            self.cycles -= SCANLINE_DOTS;
            self.scanline += 1;

            if self.scanline == VBLANK_SCANLINE {
                self.status.set_vblank_status(true);
                self.status.set_sprite_zero_hit(true);
                if self.ctrl.generate_vblank_nmi() {
                    self.nmi_interrupt = Some(1);
                }
            }

            if self.scanline >= FRAME_SCANLINES {
                self.scanline = 0;
                self.nmi_interrupt = None;
                self.status.set_sprite_zero_hit(false);
                self.status.reset_vblank_status();
                log::trace!("frame complete");
                frame_complete = true;
            }
        }
        frame_complete
    }

    pub fn poll_nmi_interrupt(&mut self) -> Option<u8> {
        self.nmi_interrupt.take()
    }

    // Horizontal:
    //   [ A ] [ a ]
    //   [ B ] [ b ]
    //
    // Vertical:
    //   [ A ] [ B ]
    //   [ a ] [ b ]
    pub fn mirror_vram_addr(&self, addr: u16) -> u16 {
        let mirrored_vram = addr & 0b10_1111_1111_1111; // $3000-$3EFF down to $2000-$2EFF
        let vram_index = mirrored_vram - 0x2000;
        let name_table = vram_index / 0x400;
        match (&self.mirroring, name_table) {
            (Mirroring::VERTICAL, 2) | (Mirroring::VERTICAL, 3) => vram_index - 0x800,
            (Mirroring::FOUR_SCREEN, 2) | (Mirroring::FOUR_SCREEN, 3) => vram_index - 0x800,
            (Mirroring::HORIZONTAL, 2) => vram_index - 0x400,
            (Mirroring::HORIZONTAL, 1) => vram_index - 0x400,
            (Mirroring::HORIZONTAL, 3) => vram_index - 0x800,
            _ => vram_index,
        }
    }

    fn mirror_palette_addr(addr: u16) -> usize {
        let index = (addr - 0x3f00) as usize % 32;
        match index {
            0x10 | 0x14 | 0x18 | 0x1c => index - 0x10,
            _ => index,
        }
    }

    fn increment_vram_addr(&mut self) {
        self.addr.increment(self.ctrl.vram_addr_increment());
    }

    pub fn chr_rom(&self) -> &[u8] {
        &self.chr_rom
    }

    pub fn vram(&self) -> &[u8; 2048] {
        &self.vram
    }

    pub fn oam_data(&self) -> &[u8; 256] {
        self.oam.data()
    }

    pub fn oam_addr(&self) -> u8 {
        self.oam.addr()
    }

    pub fn palette_table(&self) -> &[u8; 32] {
        &self.palette_table
    }

    pub fn mirroring(&self) -> Mirroring {
        self.mirroring
    }

    pub fn ctrl(&self) -> &ControlRegister {
        &self.ctrl
    }

    pub fn mask(&self) -> &MaskRegister {
        &self.mask
    }

    pub fn scroll(&self) -> &ScrollRegister {
        &self.scroll
    }

    pub fn status(&self) -> &StatusRegister {
        &self.status
    }

    pub fn scanline(&self) -> u16 {
        self.scanline
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }
}

impl PPU for NesPPU {
    fn write_to_ctrl(&mut self, value: u8) {
        let before_nmi_status = self.ctrl.generate_vblank_nmi();
        self.ctrl.update(value);
        if !before_nmi_status && self.ctrl.generate_vblank_nmi() && self.status.is_in_vblank() {
            self.nmi_interrupt = Some(1);
        }
    }

    fn write_to_mask(&mut self, value: u8) {
        self.mask.update(value);
    }

    fn read_status(&mut self) -> u8 {
        let data = self.status.snapshot();
        self.status.reset_vblank_status();
        self.addr.reset_latch();
        self.scroll.reset_latch();
        data
    }

    fn write_to_oam_addr(&mut self, value: u8) {
        self.oam.write_addr(value);
    }

    fn write_to_oam_data(&mut self, value: u8) {
        self.oam.write_data(value);
    }

    fn read_oam_data(&self) -> u8 {
        self.oam.read_data()
    }

    fn write_to_scroll(&mut self, value: u8) {
        self.scroll.write(value);
    }

    fn write_to_ppu_addr(&mut self, value: u8) {
        self.addr.update(value);
    }

    fn write_to_data(&mut self, value: u8) {
        let addr = self.addr.get();
        match addr {
            0..=0x1fff => log::warn!("attempt to write to chr rom space {:#06x}", addr),
            0x2000..=0x2fff => {
                self.vram[self.mirror_vram_addr(addr) as usize] = value;
            }
            0x3000..=0x3eff => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
            0x3f00..=0x3fff => {
                self.palette_table[Self::mirror_palette_addr(addr)] = value;
            }
            _ => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
        }
        self.increment_vram_addr();
    }

    fn read_data(&mut self) -> u8 {
        let addr = self.addr.get();
        self.increment_vram_addr();

        match addr {
            0..=0x1fff => {
                let result = self.internal_data_buf;
                self.internal_data_buf = self.chr_rom.get(addr as usize).copied().unwrap_or(0);
                result
            }
            0x2000..=0x2fff => {
                let result = self.internal_data_buf;
                self.internal_data_buf = self.vram[self.mirror_vram_addr(addr) as usize];
                result
            }
            0x3000..=0x3eff => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
            0x3f00..=0x3fff => self.palette_table[Self::mirror_palette_addr(addr)],
            _ => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
        }
    }

    fn write_oam_dma(&mut self, data: &[u8; 256]) {
        self.oam.write_dma(data);
    }
}

use crate::cartridge::{Rom, PRG_ROM_PAGE_SIZE};
use crate::cpu::Mem;
use crate::error::{fatal, Fault, Violation};
use crate::ppu::{NesPPU, PPU};

//  _______________ $10000
// | PRG ROM       |
// |               |
// |_______________| $8000
// | unmapped      |
// |_______________| $4020
// | OAM DMA $4014 |
// |_______________| $4000
// | PPU registers |
// | (mirrored)    |
// |_______________| $2000
// | RAM           |
// | (mirrored)    |
// |_______________| $0000

const RAM: u16 = 0x0000;
const RAM_MIRRORS_END: u16 = 0x1FFF;
const PPU_REGISTERS: u16 = 0x2000;
const PPU_REGISTERS_MIRRORS_END: u16 = 0x3FFF;
const OAM_DMA: u16 = 0x4014;
const PRG_ROM: u16 = 0x8000;
const PRG_ROM_END: u16 = 0xFFFF;
const RESET_VECTOR: u16 = 0xFFFC;

const PPU_CYCLES_PER_CPU_CYCLE: u16 = 3;

pub struct Bus<'call> {
    cpu_vram: [u8; 2048],
    prg_rom: Vec<u8>,
    ppu: NesPPU,

    cycles: usize,
    gameloop_callback: Option<Box<dyn FnMut(&NesPPU) + 'call>>,
}

impl<'call> Bus<'call> {
    pub fn new(rom: Rom) -> Bus<'call> {
        let ppu = NesPPU::new(rom.chr_rom, rom.screen_mirroring);

        Bus {
            cpu_vram: [0; 2048],
            prg_rom: rom.prg_rom,
            ppu,
            cycles: 0,
            gameloop_callback: None,
        }
    }

    /// Like `new`, calling `gameloop_callback` each time the PPU finishes a frame.
    pub fn with_frame_callback<F>(rom: Rom, gameloop_callback: F) -> Bus<'call>
    where
        F: FnMut(&NesPPU) + 'call,
    {
        let mut bus = Bus::new(rom);
        bus.gameloop_callback = Some(Box::new(gameloop_callback));
        bus
    }

    fn prg_rom_index(&self, addr: u16) -> usize {
        let mut addr = addr - PRG_ROM;
        if self.prg_rom.len() == PRG_ROM_PAGE_SIZE && addr >= 0x4000 {
            // mirror if needed
            addr %= 0x4000;
        }
        addr as usize
    }

    fn read_prg_rom(&self, addr: u16) -> u8 {
        match self.prg_rom.get(self.prg_rom_index(addr)) {
            Some(data) => *data,
            None => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
        }
    }

    pub fn tick(&mut self, cycles: u8) {
        self.cycles += cycles as usize;

        let frame_complete = self.ppu.tick(cycles as u16 * PPU_CYCLES_PER_CPU_CYCLE);
        if frame_complete {
            if let Some(callback) = self.gameloop_callback.as_mut() {
                callback(&self.ppu);
            }
        }
    }

    pub fn poll_nmi_status(&mut self) -> Option<u8> {
        self.ppu.poll_nmi_interrupt()
    }

    /// Reads RAM or PRG without touching any device. `None` for register windows.
    pub fn peek(&self, addr: u16) -> Option<u8> {
        match addr {
            RAM..=RAM_MIRRORS_END => Some(self.cpu_vram[(addr & 0b0000_0111_1111_1111) as usize]),
            PRG_ROM..=PRG_ROM_END => self.prg_rom.get(self.prg_rom_index(addr)).copied(),
            _ => None,
        }
    }

    pub fn ram(&self) -> &[u8; 2048] {
        &self.cpu_vram
    }

    pub fn ppu(&self) -> &NesPPU {
        &self.ppu
    }

    pub fn cycles(&self) -> usize {
        self.cycles
    }

    /// Copies `program` to `base` and points the reset vector at it.
    /// Cartridge addresses patch the PRG image, which is widened to 32KB first.
    pub fn load_program(&mut self, base: u16, program: &[u8]) {
        self.widen_prg_rom();
        for (i, data) in program.iter().enumerate() {
            self.flash(base.wrapping_add(i as u16), *data);
        }
        self.flash(RESET_VECTOR, (base & 0xff) as u8);
        self.flash(RESET_VECTOR + 1, (base >> 8) as u8);
    }

    fn widen_prg_rom(&mut self) {
        match self.prg_rom.len() {
            0 => self.prg_rom = vec![0; 2 * PRG_ROM_PAGE_SIZE],
            PRG_ROM_PAGE_SIZE => {
                let lower = self.prg_rom.clone();
                self.prg_rom.extend_from_slice(&lower);
            }
            _ => {}
        }
    }

    fn flash(&mut self, addr: u16, data: u8) {
        match addr {
            PRG_ROM..=PRG_ROM_END => {
                let index = self.prg_rom_index(addr);
                self.prg_rom[index] = data;
            }
            _ => self.mem_write(addr, data),
        }
    }
}

impl Mem for Bus<'_> {
    fn mem_read(&mut self, addr: u16) -> u8 {
        match addr {
            RAM..=RAM_MIRRORS_END => {
                // 2KB of RAM is wired to 11 of the 13 address lines
                let mirror_down_addr = addr & 0b0000_0111_1111_1111;
                self.cpu_vram[mirror_down_addr as usize]
            }
            0x2000 | 0x2001 | 0x2003 | 0x2005 | 0x2006 | OAM_DMA => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::WriteOnly,
            }),
            0x2002 => self.ppu.read_status(),
            0x2004 => self.ppu.read_oam_data(),
            0x2007 => self.ppu.read_data(),

            0x2008..=PPU_REGISTERS_MIRRORS_END => {
                let mirror_down_addr = addr & 0b0010_0000_0000_0111;
                self.mem_read(mirror_down_addr)
            }
            PRG_ROM..=PRG_ROM_END => self.read_prg_rom(addr),
            _ => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
        }
    }

    fn mem_write(&mut self, addr: u16, data: u8) {
        match addr {
            RAM..=RAM_MIRRORS_END => {
                let mirror_down_addr = addr & 0b0000_0111_1111_1111;
                self.cpu_vram[mirror_down_addr as usize] = data;
            }
            PPU_REGISTERS => self.ppu.write_to_ctrl(data),
            0x2001 => self.ppu.write_to_mask(data),
            0x2002 => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::ReadOnly,
            }),
            0x2003 => self.ppu.write_to_oam_addr(data),
            0x2004 => self.ppu.write_to_oam_data(data),
            0x2005 => self.ppu.write_to_scroll(data),
            0x2006 => self.ppu.write_to_ppu_addr(data),
            0x2007 => self.ppu.write_to_data(data),

            0x2008..=PPU_REGISTERS_MIRRORS_END => {
                let mirror_down_addr = addr & 0b0010_0000_0000_0111;
                self.mem_write(mirror_down_addr, data);
            }

            // https://wiki.nesdev.com/w/index.php/PPU_programmer_reference#OAM_DMA_.28.244014.29_.3E_write
            OAM_DMA => {
                let mut buffer: [u8; 256] = [0; 256];
                let hi: u16 = (data as u16) << 8;
                for i in 0..256u16 {
                    buffer[i as usize] = self.mem_read(hi + i);
                }

                self.ppu.write_oam_dma(&buffer);
            }

            PRG_ROM..=PRG_ROM_END => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::ReadOnly,
            }),
            _ => fatal(Fault::AddressViolation {
                addr,
                kind: Violation::Unmapped,
            }),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::cartridge::test::test_rom;
    use crate::cartridge::Mirroring;
    use std::cell::Cell;

    fn half_rom() -> Rom {
        let mut prg_rom = vec![0; PRG_ROM_PAGE_SIZE];
        prg_rom[0] = 0x11;
        prg_rom[0x3FFF] = 0x22;
        Rom {
            prg_rom,
            chr_rom: vec![],
            mapper: 0,
            screen_mirroring: Mirroring::HORIZONTAL,
        }
    }

    #[test]
    fn test_mem_read_write_to_ram() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x01, 0x55);
        assert_eq!(bus.mem_read(0x01), 0x55);
    }

    #[test]
    fn test_ram_is_mirrored_every_2kb() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x0805, 0x42);
        assert_eq!(bus.mem_read(0x0005), 0x42);
        assert_eq!(bus.mem_read(0x1005), 0x42);
        assert_eq!(bus.mem_read(0x1805), 0x42);
        assert_eq!(bus.ram()[0x0005], 0x42);
    }

    #[test]
    fn test_ppu_registers_are_mirrored_every_8_bytes() {
        let mut bus = Bus::new(test_rom(&[]));
        // $3FFE -> $2006, $2FFF -> $2007
        bus.mem_write(0x3FFE, 0x23);
        bus.mem_write(0x3FFE, 0x05);
        bus.mem_write(0x2FFF, 0x66);

        bus.mem_write(0x2006, 0x23);
        bus.mem_write(0x2006, 0x05);
        bus.mem_read(0x200F); // load into buffer
        assert_eq!(bus.mem_read(0x2007), 0x66);
    }

    #[test]
    fn test_status_read_through_mirror() {
        let mut bus = Bus::new(test_rom(&[]));
        for _ in 0..(341 * 241 / 3 / 100 + 1) {
            bus.tick(100);
        }
        assert_eq!(bus.mem_read(0x200A) & 0x80, 0x80);
        assert_eq!(bus.mem_read(0x2002) & 0x80, 0x00);
    }

    #[test]
    fn test_prg_rom_read() {
        let bus = &mut Bus::new(test_rom(&[0xa9, 0x05]));
        assert_eq!(bus.mem_read(0x8000), 0xa9);
        assert_eq!(bus.mem_read_u16(0xFFFC), 0x8000);
    }

    #[test]
    fn test_16kb_prg_is_mirrored() {
        let mut bus = Bus::new(half_rom());
        assert_eq!(bus.mem_read(0x8000), 0x11);
        assert_eq!(bus.mem_read(0xC000), 0x11);
        assert_eq!(bus.mem_read(0xBFFF), 0x22);
        assert_eq!(bus.mem_read(0xFFFF), 0x22);
    }

    #[test]
    fn test_oam_dma_copies_cpu_page() {
        let mut bus = Bus::new(test_rom(&[]));
        for i in 0..256u16 {
            bus.mem_write(0x0200 + i, i as u8);
        }
        bus.mem_write(0x2003, 0x00);
        bus.mem_write(0x4014, 0x02);

        assert_eq!(bus.ppu().oam_data()[0x00], 0x00);
        assert_eq!(bus.ppu().oam_data()[0x80], 0x80);
        assert_eq!(bus.ppu().oam_data()[0xff], 0xff);
    }

    #[test]
    fn test_tick_runs_ppu_three_times_faster() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.tick(7);
        assert_eq!(bus.cycles(), 7);
        assert_eq!(bus.ppu().cycles(), 21);
    }

    #[test]
    fn test_frame_callback() {
        let frames = Cell::new(0);
        let mut bus = Bus::with_frame_callback(test_rom(&[]), |_ppu: &NesPPU| {
            frames.set(frames.get() + 1);
        });
        // one frame is 341 * 262 dots = 29780.67 CPU cycles
        for _ in 0..298 {
            bus.tick(100);
        }
        assert_eq!(frames.get(), 1);
    }

    #[test]
    fn test_nmi_surfaces_through_bus() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x2000, 0b1000_0000);
        assert_eq!(bus.poll_nmi_status(), None);
        for _ in 0..274 {
            bus.tick(100);
        }
        assert_eq!(bus.poll_nmi_status(), Some(1));
        assert_eq!(bus.poll_nmi_status(), None);
    }

    #[test]
    fn test_peek_has_no_side_effects() {
        let mut bus = Bus::new(test_rom(&[0xea]));
        bus.mem_write(0x10, 0x77);
        assert_eq!(bus.peek(0x0810), Some(0x77));
        assert_eq!(bus.peek(0x8000), Some(0xea));
        assert_eq!(bus.peek(0x2002), None);
        assert_eq!(bus.peek(0x4016), None);
    }

    #[test]
    fn test_load_program_into_ram() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.load_program(0x0600, &[0x20, 0x06, 0x06]);
        assert_eq!(bus.mem_read(0x0600), 0x20);
        assert_eq!(bus.mem_read(0x0602), 0x06);
        assert_eq!(bus.mem_read_u16(0xFFFC), 0x0600);
    }

    #[test]
    fn test_load_program_widens_16kb_prg() {
        let mut bus = Bus::new(half_rom());
        bus.load_program(0x8000, &[0xe8]);
        assert_eq!(bus.mem_read(0x8000), 0xe8);
        // upper half is a separate copy now
        assert_eq!(bus.mem_read(0xC000), 0x11);
        assert_eq!(bus.mem_read(0xFFFF), 0x80);
        assert_eq!(bus.mem_read(0xBFFF), 0x22);
    }

    #[test]
    fn test_load_program_into_empty_prg() {
        let mut rom = half_rom();
        rom.prg_rom.clear();
        let mut bus = Bus::new(rom);
        bus.load_program(0x8000, &[0xe8]);
        assert_eq!(bus.mem_read(0x8000), 0xe8);
        assert_eq!(bus.mem_read_u16(0xFFFC), 0x8000);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x2000: read from write-only register")]
    fn test_read_write_only_register_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_read(0x2000);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x4014: read from write-only register")]
    fn test_read_dma_register_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_read(0x4014);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x2002: write to read-only location")]
    fn test_write_status_register_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x200A, 0x00);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x8000: write to read-only location")]
    fn test_write_rom_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x8000, 0x00);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x5000: unmapped address")]
    fn test_unmapped_read_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_read(0x5000);
    }

    #[test]
    #[should_panic(expected = "address violation at 0x4016: unmapped address")]
    fn test_unmapped_write_is_fatal() {
        let mut bus = Bus::new(test_rom(&[]));
        bus.mem_write(0x4016, 0x01);
    }
}

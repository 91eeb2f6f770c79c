mod common;

use common::InesImage;
use std::cell::Cell;
use tiny_nes::bus::Bus;
use tiny_nes::cpu::{CpuFlags, Mem, CPU};
use tiny_nes::ppu::NesPPU;

// LDA #$80 ; STA $2000 ; loop: JMP loop ; nmi: INX ; BRK
const NMI_PROGRAM: [u8; 10] = [0xa9, 0x80, 0x8d, 0x00, 0x20, 0x4c, 0x05, 0x80, 0xe8, 0x00];

#[test]
fn test_vblank_nmi_reaches_the_cpu() {
    let rom = InesImage::new(1).program(&NMI_PROGRAM).vector(0xFFFA, 0x8008).rom();
    let mut cpu = CPU::new(Bus::new(rom));
    cpu.reset();
    cpu.run();

    assert_eq!(cpu.register_x, 1);
    assert_eq!(cpu.bus.ppu().scanline(), 241);
    assert!(cpu.bus.ppu().status().is_in_vblank());
    assert!(cpu.status.contains(CpuFlags::INTERRUPT_DISABLE));
    assert_eq!(cpu.stack_pointer, 0xfa);
    assert_eq!(cpu.mem_read_u16(0x01fc), 0x8005);
    assert!(cpu.bus.cycles() * 3 >= 341 * 241);
}

#[test]
fn test_frame_callback_fires_once_per_frame() {
    let frames = Cell::new(0);
    // spin forever without NMI
    let rom = InesImage::new(1).program(&[0x4c, 0x00, 0x80]).rom();
    let bus = Bus::with_frame_callback(rom, |ppu: &NesPPU| {
        assert_eq!(ppu.scanline(), 0);
        frames.set(frames.get() + 1);
    });
    let mut cpu = CPU::new(bus);
    cpu.reset();

    // two frames are 2 * 341 * 262 / 3 CPU cycles
    cpu.run_with_callback(|cpu| {
        if cpu.bus.cycles() >= 59_600 {
            cpu.halt();
        }
    });

    assert_eq!(frames.get(), 2);
}

#[test]
fn test_ppu_data_port_through_cpu() {
    // LDA #$21 ; STA $2006 ; LDA #$08 ; STA $2006 ; LDA #$7E ; STA $2007
    // LDA #$21 ; STA $2006 ; LDA #$08 ; STA $2006 ; LDA $2007 ; LDA $2007 ; BRK
    let rom = InesImage::new(1)
        .program(&[
            0xa9, 0x21, 0x8d, 0x06, 0x20, 0xa9, 0x08, 0x8d, 0x06, 0x20, 0xa9, 0x7e, 0x8d, 0x07,
            0x20, 0xa9, 0x21, 0x8d, 0x06, 0x20, 0xa9, 0x08, 0x8d, 0x06, 0x20, 0xad, 0x07, 0x20,
            0xad, 0x07, 0x20, 0x00,
        ])
        .rom();
    let mut cpu = CPU::new(Bus::new(rom));
    cpu.reset();
    cpu.run();

    assert_eq!(cpu.register_a, 0x7e);
    // horizontal mirroring: $2108 lands at 0x108
    assert_eq!(cpu.bus.ppu().vram()[0x108], 0x7e);
}

#[test]
fn test_oam_dma_through_cpu() {
    // LDA #$33 ; STA $0203 ; LDA #$02 ; STA $4014 ; BRK
    let rom = InesImage::new(1)
        .program(&[0xa9, 0x33, 0x8d, 0x03, 0x02, 0xa9, 0x02, 0x8d, 0x14, 0x40, 0x00])
        .rom();
    let mut cpu = CPU::new(Bus::new(rom));
    cpu.reset();
    cpu.run();

    assert_eq!(cpu.bus.ppu().oam_data()[3], 0x33);
}

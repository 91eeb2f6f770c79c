use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process;

use tiny_nes::bus::Bus;
use tiny_nes::cartridge::Rom;
use tiny_nes::cpu::CPU;
use tiny_nes::trace::trace;

/// Runs a cartridge (or a bare 6502 program) until BRK or the step limit.
#[derive(Parser, Debug)]
#[command(name = "tiny_nes")]
#[command(about = "6502 + PPU core runner", long_about = None)]
struct Args {
    /// Path to the iNES image
    rom: PathBuf,

    /// Treat the file as a bare program loaded at $8000
    #[arg(long)]
    raw: bool,

    /// Stop after this many instructions (0 = no limit)
    #[arg(long, default_value_t = 1_000_000)]
    max_steps: u64,

    /// Print a trace line before every instruction
    #[arg(short, long)]
    trace: bool,

    /// Dump CPU state after execution
    #[arg(short = 'c', long)]
    dump_cpu: bool,

    /// Dump PPU state after execution
    #[arg(short = 'p', long)]
    dump_ppu: bool,
}

fn main() {
    let args = Args::parse();

    let bytes = match fs::read(&args.rom) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("Failed to read {}: {}", args.rom.display(), e);
            process::exit(1);
        }
    };

    let mut cpu = if args.raw {
        let mut cpu = CPU::new(Bus::new(Rom::blank()));
        cpu.load(bytes);
        cpu
    } else {
        let rom = match Rom::new(&bytes) {
            Ok(rom) => rom,
            Err(e) => {
                eprintln!("Failed to load cartridge: {}", e);
                process::exit(1);
            }
        };
        println!("Loaded cartridge:");
        println!("  PRG ROM: {} bytes", rom.prg_rom.len());
        println!("  CHR ROM: {} bytes", rom.chr_rom.len());
        println!("  Mapper: {}", rom.mapper);
        println!("  Mirroring: {:?}", rom.screen_mirroring);
        CPU::new(Bus::new(rom))
    };
    cpu.reset();

    let mut steps: u64 = 0;
    cpu.run_with_callback(|cpu| {
        if args.max_steps != 0 && steps >= args.max_steps {
            cpu.halt();
            return;
        }
        if args.trace {
            println!("{}", trace(cpu));
        }
        steps += 1;
    });

    println!(
        "Stopped after {} instructions, {} cycles.",
        steps,
        cpu.bus.cycles()
    );

    if args.dump_cpu {
        dump_cpu_state(&cpu);
    }

    if args.dump_ppu {
        dump_ppu_state(&cpu);
    }
}

fn dump_cpu_state(cpu: &CPU) {
    println!("\nCPU State:");
    println!("  A:    ${:02X}", cpu.register_a);
    println!("  X:    ${:02X}", cpu.register_x);
    println!("  Y:    ${:02X}", cpu.register_y);
    println!("  PC:   ${:04X}", cpu.program_counter);
    println!("  SP:   ${:02X}", cpu.stack_pointer);
    println!("  P:    {:08b}", cpu.status.bits());
    println!("  State: {:?}", cpu.state);
}

fn dump_ppu_state(cpu: &CPU) {
    let ppu = cpu.bus.ppu();

    println!("\nPPU State:");
    println!("  Scanline: {}", ppu.scanline());
    println!("  Dot: {}", ppu.cycles());
    println!("  Mirroring: {:?}", ppu.mirroring());

    let ctrl = ppu.ctrl();
    println!("  CTRL: {:08b}", ctrl.bits());
    println!("    nametable ${:04X}, increment {}", ctrl.nametable_addr(), ctrl.vram_addr_increment());
    println!(
        "    sprite pattern ${:04X}, background pattern ${:04X}, sprite size 8x{}",
        ctrl.sprt_pattern_addr(),
        ctrl.bknd_pattern_addr(),
        ctrl.sprite_size()
    );
    println!(
        "    master/slave {}, NMI on vblank {}",
        ctrl.master_slave_select(),
        ctrl.generate_vblank_nmi()
    );

    let mask = ppu.mask();
    println!("  MASK: {:08b}", mask.bits());
    println!(
        "    background {} (left 8px {}), sprites {} (left 8px {})",
        mask.show_background(),
        mask.leftmost_8pxl_background(),
        mask.show_sprites(),
        mask.leftmost_8pxl_sprite()
    );
    println!("    greyscale {}, emphasis {:?}", mask.is_grayscale(), mask.emphasise());

    println!("  STATUS: {:08b}", ppu.status().snapshot());
    println!("  VBLANK: {}", ppu.status().is_in_vblank());
    println!("  Scroll: ({}, {})", ppu.scroll().scroll_x, ppu.scroll().scroll_y);
    println!("  OAM addr: ${:02X}", ppu.oam_addr());
}

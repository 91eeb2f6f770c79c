use crate::bus::Bus;
use crate::error::{fatal, Fault};
use crate::opcodes::{self, Mnemonic};

bitflags! {
    /// # Status Register (P) http://wiki.nesdev.com/w/index.php/Status_flags
    ///
    ///  7 6 5 4 3 2 1 0
    ///  N V _ B D I Z C
    ///  | |   | | | | +--- Carry Flag
    ///  | |   | | | +----- Zero Flag
    ///  | |   | | +------- Interrupt Disable
    ///  | |   | +--------- Decimal Mode (not used on NES)
    ///  | |   +----------- Break Command
    ///  | +--------------- Overflow Flag
    ///  +----------------- Negative Flag
    ///
    pub struct CpuFlags: u8 {
        const CARRY             = 0b0000_0001;
        const ZERO              = 0b0000_0010;
        const INTERRUPT_DISABLE = 0b0000_0100;
        const DECIMAL_MODE      = 0b0000_1000;
        const BREAK             = 0b0001_0000;
        const BREAK2            = 0b0010_0000;
        const OVERFLOW          = 0b0100_0000;
        const NEGATIV           = 0b1000_0000;
    }
}

const STACK: u16 = 0x0100;
const STACK_RESET: u8 = 0xfd;
const STATUS_RESET: u8 = 0b0010_0100;
const NMI_VECTOR: u16 = 0xFFFA;
const RESET_VECTOR: u16 = 0xFFFC;
const PROGRAM_BASE: u16 = 0x8000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
    Running,
    Halted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(non_camel_case_types)]
pub enum AddressingMode {
    Immediate,
    ZeroPage,
    ZeroPage_X,
    ZeroPage_Y,
    Absolute,
    Absolute_X,
    Absolute_Y,
    Indirect_X,
    Indirect_Y,
    NoneAddressing,
}

pub trait Mem {
    fn mem_read(&mut self, addr: u16) -> u8;

    fn mem_write(&mut self, addr: u16, data: u8);

    fn mem_read_u16(&mut self, pos: u16) -> u16 {
        let lo = self.mem_read(pos) as u16;
        let hi = self.mem_read(pos.wrapping_add(1)) as u16;
        (hi << 8) | lo
    }

    fn mem_write_u16(&mut self, pos: u16, data: u16) {
        let hi = (data >> 8) as u8;
        let lo = (data & 0xff) as u8;
        self.mem_write(pos, lo);
        self.mem_write(pos.wrapping_add(1), hi);
    }
}

pub struct CPU<'a> {
    pub register_a: u8,
    pub register_x: u8,
    pub register_y: u8,
    pub status: CpuFlags,
    pub stack_pointer: u8,
    pub program_counter: u16,
    pub state: CpuState,
    pub bus: Bus<'a>,
}

impl Mem for CPU<'_> {
    fn mem_read(&mut self, addr: u16) -> u8 {
        self.bus.mem_read(addr)
    }

    fn mem_write(&mut self, addr: u16, data: u8) {
        self.bus.mem_write(addr, data)
    }

    fn mem_read_u16(&mut self, pos: u16) -> u16 {
        self.bus.mem_read_u16(pos)
    }

    fn mem_write_u16(&mut self, pos: u16, data: u16) {
        self.bus.mem_write_u16(pos, data)
    }
}

impl<'a> CPU<'a> {
    pub fn new(bus: Bus<'a>) -> CPU<'a> {
        CPU {
            register_a: 0,
            register_x: 0,
            register_y: 0,
            status: CpuFlags::from_bits_truncate(STATUS_RESET),
            stack_pointer: STACK_RESET,
            program_counter: 0,
            state: CpuState::Running,
            bus,
        }
    }

    /// Effective address for `mode`, reading the operand bytes at `addr`.
    ///
    /// Immediate and NoneAddressing have no effective address; callers
    /// handle them before getting here.
    pub fn get_absolute_address(&mut self, mode: &AddressingMode, addr: u16) -> u16 {
        match mode {
            // LDA $C0 -> A5 C0
            AddressingMode::ZeroPage => self.mem_read(addr) as u16,

            // LDA $C000 -> AD 00 C0
            AddressingMode::Absolute => self.mem_read_u16(addr),

            // LDA $C0,X -> B5 C0, wraps inside the zero page
            AddressingMode::ZeroPage_X => {
                let pos = self.mem_read(addr);
                pos.wrapping_add(self.register_x) as u16
            }
            AddressingMode::ZeroPage_Y => {
                let pos = self.mem_read(addr);
                pos.wrapping_add(self.register_y) as u16
            }

            // LDA $C000,X -> BD 00 C0
            AddressingMode::Absolute_X => {
                let base = self.mem_read_u16(addr);
                base.wrapping_add(self.register_x as u16)
            }
            AddressingMode::Absolute_Y => {
                let base = self.mem_read_u16(addr);
                base.wrapping_add(self.register_y as u16)
            }

            // LDA ($C0,X) -> A1 C0, both pointer bytes stay in page zero
            AddressingMode::Indirect_X => {
                let base = self.mem_read(addr);
                let ptr: u8 = base.wrapping_add(self.register_x);
                let lo = self.mem_read(ptr as u16);
                let hi = self.mem_read(ptr.wrapping_add(1) as u16);
                (hi as u16) << 8 | (lo as u16)
            }

            // LDA ($C0),Y -> B1 C0
            AddressingMode::Indirect_Y => {
                let base = self.mem_read(addr);
                let lo = self.mem_read(base as u16);
                let hi = self.mem_read(base.wrapping_add(1) as u16);
                let deref_base = (hi as u16) << 8 | (lo as u16);
                deref_base.wrapping_add(self.register_y as u16)
            }

            AddressingMode::Immediate | AddressingMode::NoneAddressing => {
                panic!("mode {:?} is not supported", mode);
            }
        }
    }

    fn get_operand_address(&mut self, mode: &AddressingMode) -> u16 {
        match mode {
            AddressingMode::Immediate => self.program_counter,
            _ => self.get_absolute_address(mode, self.program_counter),
        }
    }

    fn stack_pop(&mut self) -> u8 {
        self.stack_pointer = self.stack_pointer.wrapping_add(1);
        self.mem_read(STACK + self.stack_pointer as u16)
    }

    fn stack_push(&mut self, data: u8) {
        self.mem_write(STACK + self.stack_pointer as u16, data);
        self.stack_pointer = self.stack_pointer.wrapping_sub(1);
    }

    fn stack_push_u16(&mut self, data: u16) {
        let hi = (data >> 8) as u8;
        let lo = (data & 0xff) as u8;
        self.stack_push(hi);
        self.stack_push(lo);
    }

    fn stack_pop_u16(&mut self) -> u16 {
        let lo = self.stack_pop() as u16;
        let hi = self.stack_pop() as u16;
        hi << 8 | lo
    }

    fn update_zero_and_negative_flags(&mut self, result: u8) {
        self.status.set(CpuFlags::ZERO, result == 0);
        self.status.set(CpuFlags::NEGATIV, result & 0b1000_0000 != 0);
    }

    fn set_register_a(&mut self, value: u8) {
        self.register_a = value;
        self.update_zero_and_negative_flags(self.register_a);
    }

    /// A + data + carry, shared by ADC and SBC.
    fn add_to_register_a(&mut self, data: u8) {
        let sum = self.register_a as u16
            + data as u16
            + if self.status.contains(CpuFlags::CARRY) { 1 } else { 0 };

        self.status.set(CpuFlags::CARRY, sum > 0xff);

        let result = sum as u8;

        self.status.set(
            CpuFlags::OVERFLOW,
            (data ^ result) & (result ^ self.register_a) & 0x80 != 0,
        );

        self.set_register_a(result);
    }

    fn adc(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.add_to_register_a(value);
    }

    fn sbc(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.add_to_register_a(!value);
    }

    fn and(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.set_register_a(value & self.register_a);
    }

    fn eor(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.set_register_a(value ^ self.register_a);
    }

    fn ora(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.set_register_a(value | self.register_a);
    }

    fn asl_accumulator(&mut self) {
        let data = self.register_a;
        self.status.set(CpuFlags::CARRY, data >> 7 == 1);
        self.set_register_a(data << 1);
    }

    fn asl(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let mut data = self.mem_read(addr);
        self.status.set(CpuFlags::CARRY, data >> 7 == 1);
        data <<= 1;
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn lsr_accumulator(&mut self) {
        let data = self.register_a;
        self.status.set(CpuFlags::CARRY, data & 1 == 1);
        self.set_register_a(data >> 1);
    }

    fn lsr(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let mut data = self.mem_read(addr);
        self.status.set(CpuFlags::CARRY, data & 1 == 1);
        data >>= 1;
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn rol_accumulator(&mut self) {
        let mut data = self.register_a;
        let old_carry = self.status.contains(CpuFlags::CARRY);

        self.status.set(CpuFlags::CARRY, data >> 7 == 1);
        data <<= 1;
        if old_carry {
            data |= 1;
        }
        self.set_register_a(data);
    }

    fn rol(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let mut data = self.mem_read(addr);
        let old_carry = self.status.contains(CpuFlags::CARRY);

        self.status.set(CpuFlags::CARRY, data >> 7 == 1);
        data <<= 1;
        if old_carry {
            data |= 1;
        }
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn ror_accumulator(&mut self) {
        let mut data = self.register_a;
        let old_carry = self.status.contains(CpuFlags::CARRY);

        self.status.set(CpuFlags::CARRY, data & 1 == 1);
        data >>= 1;
        if old_carry {
            data |= 0b1000_0000;
        }
        self.set_register_a(data);
    }

    fn ror(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let mut data = self.mem_read(addr);
        let old_carry = self.status.contains(CpuFlags::CARRY);

        self.status.set(CpuFlags::CARRY, data & 1 == 1);
        data >>= 1;
        if old_carry {
            data |= 0b1000_0000;
        }
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn inc(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let data = self.mem_read(addr).wrapping_add(1);
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn dec(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let data = self.mem_read(addr).wrapping_sub(1);
        self.mem_write(addr, data);
        self.update_zero_and_negative_flags(data);
    }

    fn inx(&mut self) {
        self.register_x = self.register_x.wrapping_add(1);
        self.update_zero_and_negative_flags(self.register_x);
    }

    fn iny(&mut self) {
        self.register_y = self.register_y.wrapping_add(1);
        self.update_zero_and_negative_flags(self.register_y);
    }

    fn dex(&mut self) {
        self.register_x = self.register_x.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.register_x);
    }

    fn dey(&mut self) {
        self.register_y = self.register_y.wrapping_sub(1);
        self.update_zero_and_negative_flags(self.register_y);
    }

    fn compare(&mut self, mode: &AddressingMode, compare_with: u8) {
        let addr = self.get_operand_address(mode);
        let data = self.mem_read(addr);
        self.status.set(CpuFlags::CARRY, data <= compare_with);
        self.update_zero_and_negative_flags(compare_with.wrapping_sub(data));
    }

    // A & M lands in CARRY, N and V are copied from the operand.
    fn bit(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let data = self.mem_read(addr);
        self.status.set(CpuFlags::CARRY, self.register_a & data == 0);
        self.status.set(CpuFlags::NEGATIV, data & 0b1000_0000 != 0);
        self.status.set(CpuFlags::OVERFLOW, data & 0b0100_0000 != 0);
    }

    fn lda(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        let value = self.mem_read(addr);
        self.set_register_a(value);
    }

    fn ldx(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        self.register_x = self.mem_read(addr);
        self.update_zero_and_negative_flags(self.register_x);
    }

    fn ldy(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        self.register_y = self.mem_read(addr);
        self.update_zero_and_negative_flags(self.register_y);
    }

    fn sta(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        self.mem_write(addr, self.register_a);
    }

    fn stx(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        self.mem_write(addr, self.register_x);
    }

    fn sty(&mut self, mode: &AddressingMode) {
        let addr = self.get_operand_address(mode);
        self.mem_write(addr, self.register_y);
    }

    fn tax(&mut self) {
        self.register_x = self.register_a;
        self.update_zero_and_negative_flags(self.register_x);
    }

    fn tay(&mut self) {
        self.register_y = self.register_a;
        self.update_zero_and_negative_flags(self.register_y);
    }

    fn tsx(&mut self) {
        self.register_x = self.stack_pointer;
        self.update_zero_and_negative_flags(self.register_x);
    }

    fn txa(&mut self) {
        self.set_register_a(self.register_x);
    }

    fn tya(&mut self) {
        self.set_register_a(self.register_y);
    }

    fn txs(&mut self) {
        self.stack_pointer = self.register_x;
    }

    fn pha(&mut self) {
        self.stack_push(self.register_a);
    }

    fn pla(&mut self) {
        let data = self.stack_pop();
        self.set_register_a(data);
    }

    fn php(&mut self) {
        let mut flags = self.status;
        flags.insert(CpuFlags::BREAK);
        flags.insert(CpuFlags::BREAK2);
        self.stack_push(flags.bits());
    }

    fn plp(&mut self) {
        self.status = CpuFlags::from_bits_truncate(self.stack_pop());
        self.status.remove(CpuFlags::BREAK);
        self.status.insert(CpuFlags::BREAK2);
    }

    fn rti(&mut self) {
        self.status = CpuFlags::from_bits_truncate(self.stack_pop());
        self.status.remove(CpuFlags::BREAK);
        self.status.insert(CpuFlags::BREAK2);

        self.program_counter = self.stack_pop_u16();
    }

    fn jmp_absolute(&mut self) {
        self.program_counter = self.mem_read_u16(self.program_counter);
    }

    // 6502 page boundary bug: JMP ($30FF) takes the low byte from $30FF
    // and the high byte from $3000 instead of $3100.
    fn jmp_indirect(&mut self) {
        let addr = self.mem_read_u16(self.program_counter);
        let indirect_ref = if addr & 0x00FF == 0x00FF {
            let lo = self.mem_read(addr);
            let hi = self.mem_read(addr & 0xFF00);
            (hi as u16) << 8 | (lo as u16)
        } else {
            self.mem_read_u16(addr)
        };
        self.program_counter = indirect_ref;
    }

    fn jsr(&mut self) {
        self.stack_push_u16(self.program_counter.wrapping_add(1));
        self.program_counter = self.mem_read_u16(self.program_counter);
    }

    fn rts(&mut self) {
        self.program_counter = self.stack_pop_u16().wrapping_add(1);
    }

    fn branch(&mut self, condition: bool) {
        if condition {
            let jump: i8 = self.mem_read(self.program_counter) as i8;
            self.program_counter = self
                .program_counter
                .wrapping_add(1)
                .wrapping_add(jump as u16);
        }
    }

    fn interrupt_nmi(&mut self) {
        log::trace!("NMI at {:#06x}", self.program_counter);
        self.stack_push_u16(self.program_counter);
        let mut flag = self.status;
        flag.remove(CpuFlags::BREAK);
        flag.insert(CpuFlags::BREAK2);

        self.stack_push(flag.bits());
        self.status.insert(CpuFlags::INTERRUPT_DISABLE);

        self.bus.tick(2);
        self.program_counter = self.mem_read_u16(NMI_VECTOR);
    }

    pub fn load_and_run(&mut self, program: Vec<u8>) {
        self.load(program);
        self.reset();
        self.run();
    }

    pub fn load(&mut self, program: Vec<u8>) {
        self.load_at(PROGRAM_BASE, &program);
    }

    /// Writes `program` at `base` and points the reset vector at it.
    pub fn load_at(&mut self, base: u16, program: &[u8]) {
        log::debug!("loading {} bytes at {:#06x}", program.len(), base);
        self.bus.load_program(base, program);
    }

    pub fn reset(&mut self) {
        self.register_a = 0;
        self.register_x = 0;
        self.status = CpuFlags::from_bits_truncate(STATUS_RESET);
        self.stack_pointer = STACK_RESET;
        self.state = CpuState::Running;

        self.program_counter = self.mem_read_u16(RESET_VECTOR);
        log::debug!("reset, entry point {:#06x}", self.program_counter);
    }

    /// Stops the run loop before the next fetch.
    pub fn halt(&mut self) {
        self.state = CpuState::Halted;
    }

    pub fn is_halted(&self) -> bool {
        self.state == CpuState::Halted
    }

    pub fn run(&mut self) {
        self.run_with_callback(|_| {});
    }

    pub fn run_with_callback<F>(&mut self, mut callback: F)
    where
        F: FnMut(&mut CPU<'a>),
    {
        while self.state == CpuState::Running {
            self.step_with_callback(&mut callback);
        }
    }

    pub fn step(&mut self) -> CpuState {
        self.step_with_callback(|_| {})
    }

    /// Executes one instruction, calling `callback` right before the fetch.
    pub fn step_with_callback<F>(&mut self, mut callback: F) -> CpuState
    where
        F: FnMut(&mut CPU<'a>),
    {
        if self.state == CpuState::Halted {
            return self.state;
        }

        if let Some(_nmi) = self.bus.poll_nmi_status() {
            self.interrupt_nmi();
        }

        callback(self);
        if self.state == CpuState::Halted {
            return self.state;
        }

        let code = self.mem_read(self.program_counter);
        self.program_counter = self.program_counter.wrapping_add(1);
        let program_counter_state = self.program_counter;

        let opcode = match opcodes::OPCODES_MAP.get(&code) {
            Some(opcode) => *opcode,
            None => fatal(Fault::UnknownOpcode {
                code,
                pc: program_counter_state.wrapping_sub(1),
            }),
        };

        match opcode.mnemonic {
            Mnemonic::BRK => {
                self.state = CpuState::Halted;
                return self.state;
            }
            Mnemonic::NOP => {}

            Mnemonic::ADC => self.adc(&opcode.mode),
            Mnemonic::SBC => self.sbc(&opcode.mode),
            Mnemonic::AND => self.and(&opcode.mode),
            Mnemonic::EOR => self.eor(&opcode.mode),
            Mnemonic::ORA => self.ora(&opcode.mode),

            Mnemonic::ASL if opcode.mode == AddressingMode::NoneAddressing => self.asl_accumulator(),
            Mnemonic::ASL => self.asl(&opcode.mode),
            Mnemonic::LSR if opcode.mode == AddressingMode::NoneAddressing => self.lsr_accumulator(),
            Mnemonic::LSR => self.lsr(&opcode.mode),
            Mnemonic::ROL if opcode.mode == AddressingMode::NoneAddressing => self.rol_accumulator(),
            Mnemonic::ROL => self.rol(&opcode.mode),
            Mnemonic::ROR if opcode.mode == AddressingMode::NoneAddressing => self.ror_accumulator(),
            Mnemonic::ROR => self.ror(&opcode.mode),

            Mnemonic::INC => self.inc(&opcode.mode),
            Mnemonic::INX => self.inx(),
            Mnemonic::INY => self.iny(),
            Mnemonic::DEC => self.dec(&opcode.mode),
            Mnemonic::DEX => self.dex(),
            Mnemonic::DEY => self.dey(),

            Mnemonic::CMP => self.compare(&opcode.mode, self.register_a),
            Mnemonic::CPX => self.compare(&opcode.mode, self.register_x),
            Mnemonic::CPY => self.compare(&opcode.mode, self.register_y),

            Mnemonic::JMP if code == 0x6c => self.jmp_indirect(),
            Mnemonic::JMP => self.jmp_absolute(),
            Mnemonic::JSR => self.jsr(),
            Mnemonic::RTS => self.rts(),
            Mnemonic::RTI => self.rti(),

            Mnemonic::BNE => self.branch(!self.status.contains(CpuFlags::ZERO)),
            Mnemonic::BEQ => self.branch(self.status.contains(CpuFlags::ZERO)),
            Mnemonic::BVC => self.branch(!self.status.contains(CpuFlags::OVERFLOW)),
            Mnemonic::BVS => self.branch(self.status.contains(CpuFlags::OVERFLOW)),
            Mnemonic::BCC => self.branch(!self.status.contains(CpuFlags::CARRY)),
            Mnemonic::BCS => self.branch(self.status.contains(CpuFlags::CARRY)),
            Mnemonic::BPL => self.branch(!self.status.contains(CpuFlags::NEGATIV)),
            Mnemonic::BMI => self.branch(self.status.contains(CpuFlags::NEGATIV)),

            Mnemonic::BIT => self.bit(&opcode.mode),

            Mnemonic::LDA => self.lda(&opcode.mode),
            Mnemonic::LDX => self.ldx(&opcode.mode),
            Mnemonic::LDY => self.ldy(&opcode.mode),
            Mnemonic::STA => self.sta(&opcode.mode),
            Mnemonic::STX => self.stx(&opcode.mode),
            Mnemonic::STY => self.sty(&opcode.mode),

            Mnemonic::CLD => self.status.remove(CpuFlags::DECIMAL_MODE),
            Mnemonic::CLI => self.status.remove(CpuFlags::INTERRUPT_DISABLE),
            Mnemonic::CLV => self.status.remove(CpuFlags::OVERFLOW),
            Mnemonic::CLC => self.status.remove(CpuFlags::CARRY),
            Mnemonic::SEC => self.status.insert(CpuFlags::CARRY),
            Mnemonic::SEI => self.status.insert(CpuFlags::INTERRUPT_DISABLE),
            Mnemonic::SED => self.status.insert(CpuFlags::DECIMAL_MODE),

            Mnemonic::TAX => self.tax(),
            Mnemonic::TAY => self.tay(),
            Mnemonic::TSX => self.tsx(),
            Mnemonic::TXA => self.txa(),
            Mnemonic::TXS => self.txs(),
            Mnemonic::TYA => self.tya(),

            Mnemonic::PHA => self.pha(),
            Mnemonic::PLA => self.pla(),
            Mnemonic::PHP => self.php(),
            Mnemonic::PLP => self.plp(),
        }

        self.bus.tick(opcode.cycles);

        // PC unchanged means the instruction did not jump; a jump or taken
        // branch whose target equals the post-fetch PC is also advanced.
        if program_counter_state == self.program_counter {
            self.program_counter = self
                .program_counter
                .wrapping_add((opcode.len - 1) as u16);
        }

        self.state
    }
}

use crate::cpu::AddressingMode;
use crate::cpu::CPU;
use crate::opcodes;

fn peek(cpu: &CPU, addr: u16) -> u8 {
    cpu.bus.peek(addr).unwrap_or(0)
}

fn peek_u16(cpu: &CPU, addr: u16) -> u16 {
    let lo = peek(cpu, addr) as u16;
    let hi = peek(cpu, addr.wrapping_add(1)) as u16;
    hi << 8 | lo
}

fn peek_zero_page_u16(cpu: &CPU, ptr: u8) -> u16 {
    let lo = peek(cpu, ptr as u16) as u16;
    let hi = peek(cpu, ptr.wrapping_add(1) as u16) as u16;
    hi << 8 | lo
}

/// Effective address of the operand at `addr`, resolved without side effects.
fn operand_address(cpu: &CPU, mode: &AddressingMode, addr: u16) -> u16 {
    match mode {
        AddressingMode::ZeroPage => peek(cpu, addr) as u16,
        AddressingMode::Absolute => peek_u16(cpu, addr),
        AddressingMode::ZeroPage_X => peek(cpu, addr).wrapping_add(cpu.register_x) as u16,
        AddressingMode::ZeroPage_Y => peek(cpu, addr).wrapping_add(cpu.register_y) as u16,
        AddressingMode::Absolute_X => peek_u16(cpu, addr).wrapping_add(cpu.register_x as u16),
        AddressingMode::Absolute_Y => peek_u16(cpu, addr).wrapping_add(cpu.register_y as u16),
        AddressingMode::Indirect_X => {
            let ptr = peek(cpu, addr).wrapping_add(cpu.register_x);
            peek_zero_page_u16(cpu, ptr)
        }
        AddressingMode::Indirect_Y => {
            let base = peek_zero_page_u16(cpu, peek(cpu, addr));
            base.wrapping_add(cpu.register_y as u16)
        }
        AddressingMode::Immediate | AddressingMode::NoneAddressing => 0,
    }
}

/// One nestest-style line for the instruction at the program counter.
pub fn trace(cpu: &CPU) -> String {
    let begin = cpu.program_counter;
    let code = peek(cpu, begin);
    let ops = match opcodes::OPCODES_MAP.get(&code) {
        Some(ops) => *ops,
        None => {
            return format!(
                "{:47} A:{:02x} X:{:02x} Y:{:02x} P:{:02x} SP:{:02x}",
                format!("{:04x}  {:02x}        ???", begin, code),
                cpu.register_a,
                cpu.register_x,
                cpu.register_y,
                cpu.status.bits(),
                cpu.stack_pointer,
            )
            .to_ascii_uppercase()
        }
    };

    let mut hex_dump = vec![code];

    let (mem_addr, stored_value) = match ops.mode {
        AddressingMode::Immediate | AddressingMode::NoneAddressing => (0, 0),
        _ => {
            let addr = operand_address(cpu, &ops.mode, begin.wrapping_add(1));
            (addr, peek(cpu, addr))
        }
    };

    let tmp = match ops.len {
        1 => match ops.code {
            0x0a | 0x4a | 0x2a | 0x6a => "A ".to_string(),
            _ => String::from(""),
        },
        2 => {
            let address: u8 = peek(cpu, begin.wrapping_add(1));
            hex_dump.push(address);

            match ops.mode {
                AddressingMode::Immediate => format!("#${:02x}", address),
                AddressingMode::ZeroPage => format!("${:02x} = {:02x}", mem_addr, stored_value),
                AddressingMode::ZeroPage_X => format!(
                    "${:02x},X @ {:02x} = {:02x}",
                    address, mem_addr, stored_value
                ),
                AddressingMode::ZeroPage_Y => format!(
                    "${:02x},Y @ {:02x} = {:02x}",
                    address, mem_addr, stored_value
                ),
                AddressingMode::Indirect_X => format!(
                    "(${:02x},X) @ {:02x} = {:04x} = {:02x}",
                    address,
                    address.wrapping_add(cpu.register_x),
                    mem_addr,
                    stored_value
                ),
                AddressingMode::Indirect_Y => format!(
                    "(${:02x}),Y = {:04x} @ {:04x} = {:02x}",
                    address,
                    mem_addr.wrapping_sub(cpu.register_y as u16),
                    mem_addr,
                    stored_value
                ),
                // branches: target is relative to the next instruction
                _ => {
                    let target = begin.wrapping_add(2).wrapping_add((address as i8) as u16);
                    format!("${:04x}", target)
                }
            }
        }
        _ => {
            let address_lo = peek(cpu, begin.wrapping_add(1));
            let address_hi = peek(cpu, begin.wrapping_add(2));
            hex_dump.push(address_lo);
            hex_dump.push(address_hi);

            let address = peek_u16(cpu, begin.wrapping_add(1));

            match ops.mode {
                AddressingMode::NoneAddressing => {
                    if ops.code == 0x6c {
                        // jmp indirect, page boundary bug included
                        let jmp_addr = if address & 0x00FF == 0x00FF {
                            let lo = peek(cpu, address);
                            let hi = peek(cpu, address & 0xFF00);
                            (hi as u16) << 8 | (lo as u16)
                        } else {
                            peek_u16(cpu, address)
                        };
                        format!("(${:04x}) = {:04x}", address, jmp_addr)
                    } else {
                        format!("${:04x}", address)
                    }
                }
                AddressingMode::Absolute => format!("${:04x} = {:02x}", mem_addr, stored_value),
                AddressingMode::Absolute_X => format!(
                    "${:04x},X @ {:04x} = {:02x}",
                    address, mem_addr, stored_value
                ),
                AddressingMode::Absolute_Y => format!(
                    "${:04x},Y @ {:04x} = {:02x}",
                    address, mem_addr, stored_value
                ),
                _ => format!("${:04x}", address),
            }
        }
    };

    let hex_str = hex_dump
        .iter()
        .map(|z| format!("{:02x}", z))
        .collect::<Vec<String>>()
        .join(" ");
    let asm_str = format!("{:04x}  {:8} {: >4} {}", begin, hex_str, ops.mnemonic, tmp)
        .trim()
        .to_string();

    format!(
        "{:47} A:{:02x} X:{:02x} Y:{:02x} P:{:02x} SP:{:02x}",
        asm_str,
        cpu.register_a,
        cpu.register_x,
        cpu.register_y,
        cpu.status.bits(),
        cpu.stack_pointer,
    )
    .to_ascii_uppercase()
}

// CPU can't reach PPU memory directly. It writes the wanted PPU address to
// $2006 (high byte first) and then reads or writes the data through $2007.

const PPU_ADDR_MASK: u16 = 0x3FFF;

pub struct AddrRegister {
    value: u16,
    // true until the high byte of the next pair has been written
    expect_hi: bool,
}

impl AddrRegister {
    pub fn new() -> Self {
        AddrRegister {
            value: 0,
            expect_hi: true,
        }
    }

    pub fn update(&mut self, data: u8) {
        let [hi, lo] = self.value.to_be_bytes();
        let next = if self.expect_hi {
            u16::from_be_bytes([data, lo])
        } else {
            u16::from_be_bytes([hi, data])
        };
        self.value = next & PPU_ADDR_MASK;
        self.expect_hi = !self.expect_hi;
    }

    pub fn increment(&mut self, inc: u8) {
        self.value = self.value.wrapping_add(inc as u16) & PPU_ADDR_MASK;
    }

    pub fn reset_latch(&mut self) {
        self.expect_hi = true;
    }

    pub fn get(&self) -> u16 {
        self.value
    }
}

impl Default for AddrRegister {
    fn default() -> Self {
        Self::new()
    }
}

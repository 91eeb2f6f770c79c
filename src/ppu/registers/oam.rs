/// Sprite attribute memory plus the $2003 address cursor.
pub struct OamRegisters {
    oam_addr: u8,
    oam_data: [u8; 256],
}

impl OamRegisters {
    pub fn new() -> Self {
        OamRegisters {
            oam_addr: 0,
            oam_data: [0; 256],
        }
    }

    pub fn write_addr(&mut self, data: u8) {
        self.oam_addr = data;
    }

    // Stores at the cursor and moves it on, wrapping inside the 256 bytes.
    fn push(&mut self, data: u8) {
        self.oam_data[self.oam_addr as usize] = data;
        self.oam_addr = self.oam_addr.wrapping_add(1);
    }

    pub fn write_data(&mut self, data: u8) {
        self.push(data);
    }

    /// A full page lands starting at the cursor, which ends where it began.
    pub fn write_dma(&mut self, page: &[u8; 256]) {
        page.iter().for_each(|&byte| self.push(byte));
    }

    pub fn read_data(&self) -> u8 {
        self.oam_data[self.oam_addr as usize]
    }

    pub fn addr(&self) -> u8 {
        self.oam_addr
    }

    pub fn data(&self) -> &[u8; 256] {
        &self.oam_data
    }
}

impl Default for OamRegisters {
    fn default() -> Self {
        Self::new()
    }
}

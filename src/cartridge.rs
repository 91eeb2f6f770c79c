// Cartridge
//
//  ------------
// | NES Header |
//  ------------
// | Trainer    |  (optional, 512 bytes)
//  ------------   BUS   -----
// | PRG ROM    | ----- | CPU |
//  ------------         -----
// | CHR ROM    | ----- | PPU |
//  ------------         -----

// NES Header
//
// NES Signature  PRG ROM size  CHR ROM size   Control Byte1  Control Byte2    PRG RAM size        Reserved
// 4E 45 53 1A /      01      /      01      /      00      /      00      /      00 00      / 00 00 00 00 00 00 /
//
// Control Byte1: 7-4 mapper low nibble, 3 four screen, 2 trainer, 1 battery, 0 mirroring (1: vertical)
// Control Byte2: 7-4 mapper high nibble, 3-2 iNES version (must be 0), 1-0 unused

use crate::error::CartridgeError;

const NES_TAG: [u8; 4] = [0x4E, 0x45, 0x53, 0x1A];
const HEADER_SIZE: usize = 16;
const TRAINER_SIZE: usize = 512;
pub const PRG_ROM_PAGE_SIZE: usize = 16384;
pub const CHR_ROM_PAGE_SIZE: usize = 8192;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
#[allow(non_camel_case_types)]
pub enum Mirroring {
    VERTICAL,
    HORIZONTAL,
    FOUR_SCREEN,
}

#[derive(Debug, Clone)]
pub struct Rom {
    pub prg_rom: Vec<u8>,
    pub chr_rom: Vec<u8>,
    pub mapper: u8,
    pub screen_mirroring: Mirroring, // PPU
}

impl Rom {
    pub fn new(raw: &[u8]) -> Result<Rom, CartridgeError> {
        if raw.len() < NES_TAG.len() || raw[0..4] != NES_TAG {
            return Err(CartridgeError::InvalidFormat);
        }
        if raw.len() < HEADER_SIZE {
            return Err(CartridgeError::Truncated {
                section: "header",
                expected: HEADER_SIZE,
                actual: raw.len(),
            });
        }

        let mapper = (raw[7] & 0b1111_0000) | (raw[6] >> 4);

        let ines_ver = (raw[7] >> 2) & 0b11;
        if ines_ver != 0 {
            return Err(CartridgeError::UnsupportedVersion(ines_ver));
        }

        let four_screen = raw[6] & 0b1000 != 0;
        let vertical_mirroring = raw[6] & 0b1 != 0;
        let screen_mirroring = match (four_screen, vertical_mirroring) {
            (true, _) => Mirroring::FOUR_SCREEN,
            (false, true) => Mirroring::VERTICAL,
            (false, false) => Mirroring::HORIZONTAL,
        };

        let prg_rom_size = raw[4] as usize * PRG_ROM_PAGE_SIZE;
        let chr_rom_size = raw[5] as usize * CHR_ROM_PAGE_SIZE;

        let skip_trainer = raw[6] & 0b100 != 0;

        let prg_rom_start = HEADER_SIZE + if skip_trainer { TRAINER_SIZE } else { 0 };
        let chr_rom_start = prg_rom_start + prg_rom_size;

        let prg_rom = slice_section(raw, "PRG ROM", prg_rom_start, prg_rom_size)?;
        let chr_rom = slice_section(raw, "CHR ROM", chr_rom_start, chr_rom_size)?;

        if mapper != 0 {
            log::warn!("mapper {} is not supported, PRG is mapped as a fixed image", mapper);
        }
        log::info!(
            "cartridge: PRG {} bytes, CHR {} bytes, mapper {}, {:?} mirroring",
            prg_rom.len(),
            chr_rom.len(),
            mapper,
            screen_mirroring
        );

        Ok(Rom {
            prg_rom: prg_rom.to_vec(),
            chr_rom: chr_rom.to_vec(),
            mapper,
            screen_mirroring,
        })
    }

    /// Zeroed 32KB PRG and no CHR, for running bare 6502 programs.
    pub fn blank() -> Rom {
        Rom {
            prg_rom: vec![0; 2 * PRG_ROM_PAGE_SIZE],
            chr_rom: vec![],
            mapper: 0,
            screen_mirroring: Mirroring::HORIZONTAL,
        }
    }
}

fn slice_section<'a>(
    raw: &'a [u8],
    section: &'static str,
    start: usize,
    len: usize,
) -> Result<&'a [u8], CartridgeError> {
    raw.get(start..start + len).ok_or(CartridgeError::Truncated {
        section,
        expected: len,
        actual: raw.len().saturating_sub(start),
    })
}

#[cfg(test)]
pub mod test {
    use super::*;

    pub struct TestRom {
        pub header: Vec<u8>,
        pub trainer: Option<Vec<u8>>,
        pub prg_rom: Vec<u8>,
        pub chr_rom: Vec<u8>,
    }

    pub fn create_rom(rom: TestRom) -> Vec<u8> {
        let mut result = Vec::with_capacity(
            rom.header.len()
                + rom.trainer.as_ref().map_or(0, |t| t.len())
                + rom.prg_rom.len()
                + rom.chr_rom.len(),
        );

        result.extend(&rom.header);
        if let Some(t) = rom.trainer {
            result.extend(t);
        }
        result.extend(&rom.prg_rom);
        result.extend(&rom.chr_rom);

        result
    }

    /// 32KB PRG image holding `program` at $8000 with the reset vector pointing there.
    pub fn test_rom(program: &[u8]) -> Rom {
        let mut prg_rom = vec![0; 2 * PRG_ROM_PAGE_SIZE];
        prg_rom[..program.len()].copy_from_slice(program);
        prg_rom[0x7FFC] = 0x00;
        prg_rom[0x7FFD] = 0x80;

        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x31, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom,
            chr_rom: vec![2; CHR_ROM_PAGE_SIZE],
        });

        Rom::new(&test_rom).unwrap()
    }

    #[test]
    fn test() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x31, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![1; 2 * PRG_ROM_PAGE_SIZE],
            chr_rom: vec![2; CHR_ROM_PAGE_SIZE],
        });

        let rom: Rom = Rom::new(&test_rom).unwrap();

        assert_eq!(rom.chr_rom, vec!(2; CHR_ROM_PAGE_SIZE));
        assert_eq!(rom.prg_rom, vec!(1; 2 * PRG_ROM_PAGE_SIZE));
        assert_eq!(rom.mapper, 3);
        assert_eq!(rom.screen_mirroring, Mirroring::VERTICAL);
    }

    #[test]
    fn test_with_trainer() {
        let test_rom = create_rom(TestRom {
            header: vec![
                0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x31 | 0b100, 00, 00, 00, 00, 00, 00, 00, 00, 00,
            ],
            trainer: Some(vec![0; TRAINER_SIZE]),
            prg_rom: vec![1; 2 * PRG_ROM_PAGE_SIZE],
            chr_rom: vec![2; CHR_ROM_PAGE_SIZE],
        });

        let rom: Rom = Rom::new(&test_rom).unwrap();

        assert_eq!(rom.chr_rom, vec!(2; CHR_ROM_PAGE_SIZE));
        assert_eq!(rom.prg_rom, vec!(1; 2 * PRG_ROM_PAGE_SIZE));
        assert_eq!(rom.mapper, 3);
        assert_eq!(rom.screen_mirroring, Mirroring::VERTICAL);
    }

    #[test]
    fn test_mapper_combines_both_nibbles() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x01, 0x00, 0x40, 0x20, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![0; PRG_ROM_PAGE_SIZE],
            chr_rom: vec![],
        });

        let rom = Rom::new(&test_rom).unwrap();
        assert_eq!(rom.mapper, 0x24);
        assert_eq!(rom.screen_mirroring, Mirroring::HORIZONTAL);
        assert!(rom.chr_rom.is_empty());
    }

    #[test]
    fn test_four_screen_overrides_vertical() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x01, 0x01, 0b1001, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![0; PRG_ROM_PAGE_SIZE],
            chr_rom: vec![0; CHR_ROM_PAGE_SIZE],
        });

        let rom = Rom::new(&test_rom).unwrap();
        assert_eq!(rom.screen_mirroring, Mirroring::FOUR_SCREEN);
    }

    #[test]
    fn test_nes2_is_not_supported() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x01, 0x01, 0x31, 0x8, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![1; PRG_ROM_PAGE_SIZE],
            chr_rom: vec![2; CHR_ROM_PAGE_SIZE],
        });
        let rom = Rom::new(&test_rom);
        match rom {
            Result::Ok(_) => panic!("should not load rom"),
            Result::Err(err) => assert_eq!(err, CartridgeError::UnsupportedVersion(2)),
        }
    }

    #[test]
    fn test_corrupted_tag() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x54, 0x1A, 0x01, 0x01, 0x00, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![1; PRG_ROM_PAGE_SIZE],
            chr_rom: vec![2; CHR_ROM_PAGE_SIZE],
        });
        assert_eq!(Rom::new(&test_rom).unwrap_err(), CartridgeError::InvalidFormat);
        assert_eq!(Rom::new(&[0x4E, 0x45]).unwrap_err(), CartridgeError::InvalidFormat);
    }

    #[test]
    fn test_truncated_prg() {
        let test_rom = create_rom(TestRom {
            header: vec![0x4E, 0x45, 0x53, 0x1A, 0x02, 0x01, 0x00, 00, 00, 00, 00, 00, 00, 00, 00, 00],
            trainer: None,
            prg_rom: vec![1; PRG_ROM_PAGE_SIZE],
            chr_rom: vec![],
        });
        assert_eq!(
            Rom::new(&test_rom).unwrap_err(),
            CartridgeError::Truncated {
                section: "PRG ROM",
                expected: 2 * PRG_ROM_PAGE_SIZE,
                actual: PRG_ROM_PAGE_SIZE,
            }
        );
    }
}

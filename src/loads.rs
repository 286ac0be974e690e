use bitfield::bitfield;

/// Highest load number a boiler can drive.
pub const MAX_LOADS: u8 = 4;

/// The three views packed into the `Servicing` status word, by nibble.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr, strum::EnumIter,
)]
pub enum LoadGroup {
    /// Loads currently being serviced
    Servicing,
    /// Loads currently circulating
    Circulating,
    /// Loads calling for heat that aren't being serviced
    Calling,
}

impl LoadGroup {
    pub fn shift(&self) -> u32 {
        match self {
            LoadGroup::Servicing => 0,
            LoadGroup::Circulating => 4,
            LoadGroup::Calling => 8,
        }
    }
}

bitfield! {
    pub struct ServicingWord(u32);
    impl Debug;
    pub u8, servicing_raw, _ : 3, 0;
    pub u8, circulating_raw, _ : 7, 4;
    pub u8, calling_raw, _ : 11, 8;
}

impl Clone for ServicingWord {
    fn clone(&self) -> Self {
        ServicingWord(self.0)
    }
}

impl Copy for ServicingWord {}

// TODO: Remote (0xFFFF) and Summer Off (0xF000) servicing values are decoded as regular loads
impl ServicingWord {
    pub fn nibble(&self, group: LoadGroup) -> u8 {
        match group {
            LoadGroup::Servicing => self.servicing_raw(),
            LoadGroup::Circulating => self.circulating_raw(),
            LoadGroup::Calling => self.calling_raw(),
        }
    }

    pub fn loads(&self, group: LoadGroup) -> Vec<u8> {
        load_numbers_from_bits(self.nibble(group))
    }
}

/// Returns the load numbers (1-4) of the bits set in the low nibble of `bits`.
pub fn load_numbers_from_bits(bits: u8) -> Vec<u8> {
    (1..=MAX_LOADS)
        .filter(|load| bits & (1 << (load - 1)) != 0)
        .collect()
}

/// Reads the nibble at `shift` in `status` and returns the loads it flags.
pub fn extract_loads(status: u32, shift: u32) -> Vec<u8> {
    let nibble = status.checked_shr(shift).unwrap_or(0) & 0xF;
    load_numbers_from_bits(nibble as u8)
}

/// Formats load numbers the way reports and CSV rows show them, `1,3`.
pub fn join_loads(loads: &[u8]) -> String {
    loads
        .iter()
        .map(|load| load.to_string())
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_extract_loads() {
        assert_eq!(extract_loads(0b10110, 0), vec![2, 3]);
        assert_eq!(extract_loads(0, 0), Vec::<u8>::new());
        assert_eq!(extract_loads(0xF, 0), vec![1, 2, 3, 4]);

        let status = 0x0291;
        assert_eq!(extract_loads(status, 0), vec![1]);
        assert_eq!(extract_loads(status, 4), vec![1, 4]);
        assert_eq!(extract_loads(status, 8), vec![2]);

        // Shifting everything out
        assert_eq!(extract_loads(u32::MAX, 40), Vec::<u8>::new());
    }

    #[test]
    fn test_servicing_word() {
        let word = ServicingWord(0x0291);
        assert_eq!(word.servicing_raw(), 0x1);
        assert_eq!(word.circulating_raw(), 0x9);
        assert_eq!(word.calling_raw(), 0x2);

        for group in LoadGroup::iter() {
            assert_eq!(word.loads(group), extract_loads(word.0, group.shift()));
        }
    }

    #[test]
    fn test_join_loads() {
        assert_eq!(join_loads(&[1, 3]), "1,3");
        assert_eq!(join_loads(&[]), "");
    }
}

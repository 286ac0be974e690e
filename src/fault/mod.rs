//! Decoding of the boiler's minor, major and system error words into the single
//! fault description shown to an operator.

pub mod tables;
pub use tables::*;

/// Returned when no table entry describes the error words.
pub const UNKNOWN: &str = "Unknown";

// Minor error bits that the controller reports as hard errors
pub const MINOR_WATER_HIGH_LIMIT: u32 = 0x10;
pub const MINOR_VENT_HIGH_LIMIT: u32 = 0x20;

// Major error bit that the controller reports as a soft error
pub const MAJOR_TEMP_PROBE: u32 = 0x04;

// Signals carried from the reassignment stage to the label overrides
pub const PROMOTED_VENT_HIGH_LIMIT: u32 = 0x10;
pub const PROMOTED_WATER_HIGH_LIMIT: u32 = 0x20;
pub const DEMOTED_TEMP_PROBE: u32 = 0x04;

// Hard table masks whose labels are replaced after resolution
const HARD_VENT_PRESSURE: u32 = 0x20;
const HARD_TEMP_PROBE: u32 = 0x04;

/// One entry of an error table: any bit of `mask` set in the error word selects `label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitLabel {
    pub mask: u32,
    pub label: &'static str,
}

impl BitLabel {
    pub const fn new(mask: u32, label: &'static str) -> Self {
        Self { mask, label }
    }
}

/// Finds the entry describing `word`. Every matching entry replaces the previous
/// one, so the last match in table order wins.
pub fn resolve(word: u32, table: &[BitLabel]) -> Option<&BitLabel> {
    table.iter().filter(|entry| word & entry.mask != 0).last()
}

/// Same as [`resolve`] but yields the label, or [`UNKNOWN`] when nothing matched.
pub fn resolve_label(word: u32, table: &[BitLabel]) -> &'static str {
    resolve(word, table).map_or(UNKNOWN, |entry| entry.label)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
pub enum Category {
    System,
    Hard,
    Soft,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub category: Category,
    pub label: &'static str,
}

impl Classification {
    pub const NONE: Classification = Classification {
        category: Category::None,
        label: UNKNOWN,
    };

    fn new(category: Category, label: &'static str) -> Self {
        Self { category, label }
    }
}

/// The three raw error words of a single telemetry record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ErrorWords {
    pub minor: u32,
    pub major: u32,
    pub system: u32,
}

/// Error words after the cross-category bits were taken out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Reassigned {
    pub minor: u32,
    pub major: u32,
    /// `PROMOTED_*` bits to report in the hard category
    pub promoted: u32,
    /// `DEMOTED_*` bits to report in the soft category
    pub demoted: u32,
}

impl ErrorWords {
    pub fn new(minor: u32, major: u32, system: u32) -> Self {
        Self {
            minor,
            major,
            system,
        }
    }

    /// Moves the bits the controller reports in another category into explicit signals.
    /// The minor limit bits are swapped on the way: a minor water high limit becomes
    /// the promoted water limit signal (0x20) and vice versa.
    pub fn reassign(self) -> Reassigned {
        let mut promoted = 0;
        if self.minor & MINOR_WATER_HIGH_LIMIT != 0 {
            promoted |= PROMOTED_WATER_HIGH_LIMIT;
        }
        if self.minor & MINOR_VENT_HIGH_LIMIT != 0 {
            promoted |= PROMOTED_VENT_HIGH_LIMIT;
        }

        let demoted = if self.major & MAJOR_TEMP_PROBE != 0 {
            DEMOTED_TEMP_PROBE
        } else {
            0
        };

        Reassigned {
            minor: self.minor & !(MINOR_WATER_HIGH_LIMIT | MINOR_VENT_HIGH_LIMIT),
            major: self.major & !MAJOR_TEMP_PROBE,
            promoted,
            demoted,
        }
    }

    /// System errors preempt hard errors, which preempt soft errors.
    pub fn classify(self) -> Classification {
        if self.system != 0 {
            return Classification::new(
                Category::System,
                resolve_label(self.system, &SYSTEM_ERRORS),
            );
        }

        let words = self.reassign();
        if words.major != 0 || words.promoted != 0 {
            Classification::new(Category::Hard, words.hard_label())
        } else if words.minor != 0 || words.demoted != 0 {
            Classification::new(Category::Soft, words.soft_label())
        } else {
            Classification::NONE
        }
    }
}

impl Reassigned {
    fn hard_label(&self) -> &'static str {
        // Only the last matching entry is checked for an override
        let mut label = match resolve(self.major, &HARD_ERRORS) {
            Some(entry) if entry.mask & HARD_VENT_PRESSURE != 0 => "Vent High Pressure",
            Some(entry) if entry.mask & HARD_TEMP_PROBE != 0 => "Temperature Probe Error",
            Some(entry) => entry.label,
            None => UNKNOWN,
        };

        if self.promoted & PROMOTED_VENT_HIGH_LIMIT != 0 {
            label = "Vent High Limit";
        }
        if self.promoted & PROMOTED_WATER_HIGH_LIMIT != 0 {
            label = "Water High Limit";
        }
        label
    }

    fn soft_label(&self) -> &'static str {
        let mut label = resolve_label(self.minor, &SOFT_ERRORS_1);

        if self.demoted != 0 {
            label = "Temp. Probe Error";
        }

        // The second table has the final say, even over the temperature probe
        // signal. Consumers of the legacy strings rely on this.
        if let Some(entry) = resolve(self.minor, &SOFT_ERRORS_2) {
            label = entry.label;
        }
        label
    }
}

/// Returns a description of the given error words. Assumes a G3 boiler.
pub fn classify(minor: u32, major: u32, system: u32) -> &'static str {
    ErrorWords::new(minor, major, system).classify().label
}

/// Like [`classify`], also reporting which error category produced the label.
pub fn classify_detailed(minor: u32, major: u32, system: u32) -> Classification {
    ErrorWords::new(minor, major, system).classify()
}

//! The three frequency bands and their parameter keys.

use mbcomp_core::GroupId;

/// One of the frequency-disjoint signal paths, ordered by ascending frequency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Band {
    Low,
    Mid,
    High,
}

/// Keys and display names of one band's parameters.
#[derive(Debug, Clone, Copy)]
pub struct BandKeys {
    pub threshold: (&'static str, &'static str),
    pub attack: (&'static str, &'static str),
    pub release: (&'static str, &'static str),
    pub ratio: (&'static str, &'static str),
    pub bypassed: (&'static str, &'static str),
    pub mute: (&'static str, &'static str),
    pub solo: (&'static str, &'static str),
}

macro_rules! band_keys {
    ($band:literal) => {
        BandKeys {
            threshold: (
                concat!("Threshold_", $band, "_Band"),
                concat!("Threshold ", $band, " Band"),
            ),
            attack: (
                concat!("Attack_", $band, "_Band"),
                concat!("Attack ", $band, " Band"),
            ),
            release: (
                concat!("Release_", $band, "_Band"),
                concat!("Release ", $band, " Band"),
            ),
            ratio: (
                concat!("Ratio_", $band, "_Band"),
                concat!("Ratio ", $band, " Band"),
            ),
            bypassed: (
                concat!("Bypassed_", $band, "_Band"),
                concat!("Bypassed ", $band, " Band"),
            ),
            mute: (
                concat!("Mute_", $band, "_Band"),
                concat!("Mute ", $band, " Band"),
            ),
            solo: (
                concat!("Solo_", $band, "_Band"),
                concat!("Solo ", $band, " Band"),
            ),
        }
    };
}

const LOW_KEYS: BandKeys = band_keys!("Low");
const MID_KEYS: BandKeys = band_keys!("Mid");
const HIGH_KEYS: BandKeys = band_keys!("High");

impl Band {
    pub const COUNT: usize = 3;

    /// All bands, low to high.
    pub const ALL: [Band; Band::COUNT] = [Band::Low, Band::Mid, Band::High];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Display name, e.g. "Low Band".
    pub const fn name(self) -> &'static str {
        match self {
            Band::Low => "Low Band",
            Band::Mid => "Mid Band",
            Band::High => "High Band",
        }
    }

    /// Parameter group of this band. Group 0 is the root.
    pub const fn group_id(self) -> GroupId {
        self as GroupId + 1
    }

    pub const fn keys(self) -> &'static BandKeys {
        match self {
            Band::Low => &LOW_KEYS,
            Band::Mid => &MID_KEYS,
            Band::High => &HIGH_KEYS,
        }
    }
}

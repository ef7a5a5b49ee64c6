//! Geopolitical zone lookup.

use std::fmt;

/// One of the six geopolitical zones used as a categorical feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Zone {
    NorthWest,
    NorthEast,
    NorthCentral,
    SouthWest,
    SouthEast,
    SouthSouth,
}

impl Zone {
    /// All zones in one-hot encoding order.
    pub const ALL: [Zone; 6] = [
        Zone::NorthWest,
        Zone::NorthEast,
        Zone::NorthCentral,
        Zone::SouthWest,
        Zone::SouthEast,
        Zone::SouthSouth,
    ];

    /// Zone assigned to regions missing from the lookup table.
    pub const DEFAULT: Zone = Zone::NorthCentral;

    /// Look up the zone of a region (36 states plus FCT).
    ///
    /// Surrounding whitespace is ignored; otherwise the match is exact.
    /// Unknown regions map to [`Zone::DEFAULT`].
    #[must_use]
    pub fn for_region(region: &str) -> Zone {
        match region.trim() {
            "Kano" | "Kaduna" | "Katsina" | "Kebbi" | "Jigawa" | "Sokoto" | "Zamfara" => {
                Zone::NorthWest
            }
            "Borno" | "Yobe" | "Bauchi" | "Gombe" | "Adamawa" | "Taraba" => Zone::NorthEast,
            "Niger" | "Kwara" | "Kogi" | "Benue" | "Plateau" | "Nasarawa" | "FCT" => {
                Zone::NorthCentral
            }
            "Lagos" | "Ogun" | "Oyo" | "Osun" | "Ondo" | "Ekiti" => Zone::SouthWest,
            "Abia" | "Anambra" | "Ebonyi" | "Enugu" | "Imo" => Zone::SouthEast,
            "Akwa Ibom" | "Bayelsa" | "Cross River" | "Delta" | "Edo" | "Rivers" => {
                Zone::SouthSouth
            }
            _ => Zone::DEFAULT,
        }
    }

    /// Position of this zone in [`Zone::ALL`].
    #[must_use]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Two-letter code (`NW`, `NE`, ...).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Zone::NorthWest => "NW",
            Zone::NorthEast => "NE",
            Zone::NorthCentral => "NC",
            Zone::SouthWest => "SW",
            Zone::SouthEast => "SE",
            Zone::SouthSouth => "SS",
        }
    }

    /// One-hot encoding of this zone over [`Zone::ALL`].
    #[must_use]
    pub fn one_hot(self) -> [f64; 6] {
        let mut encoded = [0.0; 6];
        encoded[self.index()] = 1.0;
        encoded
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

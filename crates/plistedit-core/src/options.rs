/// How malformed scalar text and dictionary layout are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Leniency {
    /// Recover with a default and log a warning.
    #[default]
    Lenient,
    /// Fail the decode.
    Strict,
}

/// What happens when a key repeats inside one dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicateKeys {
    /// The later value replaces the earlier one, keeping the earlier position.
    #[default]
    Overwrite,
    /// Fail the decode.
    Reject,
}

/// Decoder configuration.
///
/// The default reproduces the forgiving behavior of common property-list
/// editors: unreadable numbers become 0, unreadable dates become
/// [`PListDate::Invalid`](crate::PListDate::Invalid), a trailing key without a
/// value is dropped and duplicate keys overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DecodeOptions {
    /// Handling of malformed numbers, dates and dictionary layout.
    pub leniency: Leniency,
    /// Handling of repeated dictionary keys.
    pub duplicate_keys: DuplicateKeys,
}

impl DecodeOptions {
    /// Options that reject every irregularity.
    pub fn strict() -> Self {
        Self {
            leniency: Leniency::Strict,
            duplicate_keys: DuplicateKeys::Reject,
        }
    }

    /// True when malformed input must fail the decode.
    pub fn is_strict(&self) -> bool {
        self.leniency == Leniency::Strict
    }
}

use crate::guid::Guid;

const ALARM_REGULAR: &str = "AlarmRegular";
const ALARM_SNOOZE: &str = "AlarmSnooze";
const ALARM_AUTO_SNOOZE: &str = "AlarmAutoSnooze";

/// Well-known alarm occurrence variants of a reminder guid.
///
/// The base guid identifies the reminder; each variant keys one schedulable
/// occurrence of it in the alarm table.
pub trait AlarmGuidExt {
    /// Guid for the regular occurrence.
    fn with_regular(&self) -> Guid;

    /// Whether this guid carries the regular modifier.
    fn is_regular(&self) -> bool;

    /// Guid for the user-snoozed occurrence.
    fn with_snooze(&self) -> Guid;

    /// Whether this guid carries the snooze modifier.
    fn is_snooze(&self) -> bool;

    /// Guid for the auto-snooze fallback occurrence.
    fn with_auto_snooze(&self) -> Guid;

    /// Whether this guid carries the auto-snooze modifier.
    fn is_auto_snooze(&self) -> bool;
}

impl AlarmGuidExt for Guid {
    fn with_regular(&self) -> Guid {
        self.with_modifier(ALARM_REGULAR)
    }

    fn is_regular(&self) -> bool {
        self.is_modifier(ALARM_REGULAR)
    }

    fn with_snooze(&self) -> Guid {
        self.with_modifier(ALARM_SNOOZE)
    }

    fn is_snooze(&self) -> bool {
        self.is_modifier(ALARM_SNOOZE)
    }

    fn with_auto_snooze(&self) -> Guid {
        self.with_modifier(ALARM_AUTO_SNOOZE)
    }

    fn is_auto_snooze(&self) -> bool {
        self.is_modifier(ALARM_AUTO_SNOOZE)
    }
}

/// Which occurrence variant a fired alarm guid addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmKind {
    Regular,
    Snooze,
    AutoSnooze,
}

impl AlarmKind {
    /// Decodes the modifier on a fired guid. `None` for a base guid or an
    /// unrecognized modifier.
    pub fn decode(guid: &Guid) -> Option<Self> {
        if guid.is_regular() {
            Some(Self::Regular)
        } else if guid.is_snooze() {
            Some(Self::Snooze)
        } else if guid.is_auto_snooze() {
            Some(Self::AutoSnooze)
        } else {
            None
        }
    }
}

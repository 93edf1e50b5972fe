/// Single-byte command written to the control pipe.
///
/// Delivery is fire-and-forget: there is no acknowledgment and no response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// `k` - kill the child, keep intending to run it (it is respawned)
    Kill,
    /// `x` - kill the child and exit once it is reaped
    Quit,
    /// `p` or `d` - kill the child and stay idle
    Pause,
    /// `u` - start the child again if paused
    Resume,
}

impl ControlCommand {
    /// Decode a control byte. Unrecognized bytes yield `None`.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            b'k' => Some(Self::Kill),
            b'x' => Some(Self::Quit),
            b'd' | b'p' => Some(Self::Pause),
            b'u' => Some(Self::Resume),
            _ => None,
        }
    }

    pub fn as_byte(self) -> u8 {
        match self {
            Self::Kill => b'k',
            Self::Quit => b'x',
            Self::Pause => b'p',
            Self::Resume => b'u',
        }
    }
}

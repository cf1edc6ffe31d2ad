/// BCM numbers of the header pins the 13.3" HAT is wired to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum KnownPin {
    /// SCLK, only driven directly when bit-banging
    Clock = 11,
    /// MOSI, only driven directly when bit-banging
    Data = 10,
    /// CE0, left half
    ChipSelectMain = 8,
    /// CE1, right half
    ChipSelectPeri = 7,
    Reset = 17,
    /// Low while the controller is busy
    Busy = 24,
    /// Panel supply switch
    Power = 18,
}

impl From<KnownPin> for u8 {
    fn from(known_pin: KnownPin) -> Self {
        known_pin as u8
    }
}

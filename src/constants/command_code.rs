use crate::constants::data::*;

/// Controller opcodes understood by both chips of the 13.3" Spectra panel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum CommandCode {
    /// Panel setting
    Psr = 0x00,
    /// Power setting
    Pwr = 0x01,
    /// Power off
    Pof = 0x02,
    /// Power on, caller must wait for busy afterwards
    Pon = 0x04,
    BtstN = 0x05,
    BtstP = 0x06,
    DeepSleep = 0x07,
    /// Start data transmission, the payload is the frame itself
    Dtm = 0x10,
    /// Display refresh
    Drf = 0x12,
    /// VCOM and data interval
    Cdi = 0x50,
    /// Timing control
    Tcon = 0x60,
    /// Resolution
    Tres = 0x61,
    AnTm = 0x74,
    /// Auto gain id
    Agid = 0x86,
    BuckBoostVddn = 0xB0,
    TftVcomPower = 0xB1,
    EnBuf = 0xB6,
    BoostVddpEn = 0xB7,
    /// Charge control
    Ccset = 0xE0,
    /// Power saving
    Pws = 0xE3,
    Cmd66 = 0xF0,
}

impl CommandCode {
    pub fn cmd(self) -> u8 {
        self as u8
    }

    /// Fixed payload sent right after the opcode, inside the same chip select scope.
    pub fn data(self) -> &'static [u8] {
        match self {
            CommandCode::Psr => PANEL_SETTING,
            CommandCode::Pwr => POWER_SETTING,
            CommandCode::Pof => POWER_OFF,
            CommandCode::Pon => &[],
            CommandCode::BtstN => BOOSTER_NEGATIVE,
            CommandCode::BtstP => BOOSTER_POSITIVE,
            CommandCode::DeepSleep => DEEP_SLEEP_CHECK,
            CommandCode::Dtm => &[],
            CommandCode::Drf => DISPLAY_REFRESH,
            CommandCode::Cdi => VCOM_DATA_INTERVAL,
            CommandCode::Tcon => TIMING_CONTROL,
            CommandCode::Tres => RESOLUTION,
            CommandCode::AnTm => ANALOG_TIMING,
            CommandCode::Agid => AUTO_GAIN_ID,
            CommandCode::BuckBoostVddn => BUCK_BOOST_VDDN,
            CommandCode::TftVcomPower => TFT_VCOM_POWER,
            CommandCode::EnBuf => ENABLE_BUFFER,
            CommandCode::BoostVddpEn => BOOST_VDDP_ENABLE,
            CommandCode::Ccset => CHARGE_CONTROL,
            CommandCode::Pws => POWER_SAVING,
            CommandCode::Cmd66 => CMD66,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_lengths() {
        let expected = [
            (CommandCode::Psr, 2),
            (CommandCode::Pwr, 6),
            (CommandCode::Pof, 1),
            (CommandCode::Pon, 0),
            (CommandCode::BtstN, 2),
            (CommandCode::BtstP, 2),
            (CommandCode::DeepSleep, 1),
            (CommandCode::Dtm, 0),
            (CommandCode::Drf, 1),
            (CommandCode::Cdi, 1),
            (CommandCode::Tcon, 2),
            (CommandCode::Tres, 4),
            (CommandCode::AnTm, 9),
            (CommandCode::Agid, 1),
            (CommandCode::BuckBoostVddn, 1),
            (CommandCode::TftVcomPower, 1),
            (CommandCode::EnBuf, 1),
            (CommandCode::BoostVddpEn, 1),
            (CommandCode::Ccset, 1),
            (CommandCode::Pws, 1),
            (CommandCode::Cmd66, 6),
        ];
        for (code, len) in expected {
            assert_eq!(code.data().len(), len, "{code:?}");
        }
    }

    #[test]
    fn test_opcodes() {
        assert_eq!(CommandCode::Dtm.cmd(), 0x10);
        assert_eq!(CommandCode::Drf.cmd(), 0x12);
        assert_eq!(CommandCode::DeepSleep.cmd(), 0x07);
        assert_eq!(CommandCode::Cmd66.cmd(), 0xF0);
    }

    #[test]
    fn test_deep_sleep_check_code() {
        assert_eq!(CommandCode::DeepSleep.data(), &[0xA5]);
    }

    #[test]
    fn test_resolution_matches_one_chip() {
        // 0x04B0 = 1200, 0x0320 = 800
        let data = CommandCode::Tres.data();
        assert_eq!(u16::from_be_bytes([data[0], data[1]]), 1200);
        assert_eq!(u16::from_be_bytes([data[2], data[3]]), 800);
    }
}

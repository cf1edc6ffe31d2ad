//! Fixed payloads, sent right after their opcode in the same chip select scope.

/// PSR: panel setting
pub(super) const PANEL_SETTING: &[u8] = &[0xDF, 0x69];
/// PWR: VGH/VGL and VDH/VDL levels
pub(super) const POWER_SETTING: &[u8] = &[0x0F, 0x00, 0x28, 0x2C, 0x28, 0x38];
pub(super) const POWER_OFF: &[u8] = &[0x00];
pub(super) const DISPLAY_REFRESH: &[u8] = &[0x00];
/// CDI: border and data interval
pub(super) const VCOM_DATA_INTERVAL: &[u8] = &[0xF7];
pub(super) const TIMING_CONTROL: &[u8] = &[0x03, 0x03];
/// TRES: 1200 source lines x 800 gate lines, per controller chip
pub(super) const RESOLUTION: &[u8] = &[0x04, 0xB0, 0x03, 0x20];
pub(super) const CMD66: &[u8] = &[0x49, 0x55, 0x13, 0x5D, 0x05, 0x10];
pub(super) const ENABLE_BUFFER: &[u8] = &[0x07];
pub(super) const CHARGE_CONTROL: &[u8] = &[0x01];
pub(super) const POWER_SAVING: &[u8] = &[0x22];
pub(super) const ANALOG_TIMING: &[u8] = &[0xC0, 0x1C, 0x1C, 0xCC, 0xCC, 0xCC, 0x15, 0x15, 0x55];
pub(super) const AUTO_GAIN_ID: &[u8] = &[0x10];

// booster and supply rails, main chip only
pub(super) const BOOSTER_POSITIVE: &[u8] = &[0xE8, 0x28];
pub(super) const BOOST_VDDP_ENABLE: &[u8] = &[0x01];
pub(super) const BOOSTER_NEGATIVE: &[u8] = &[0xE8, 0x28];
pub(super) const BUCK_BOOST_VDDN: &[u8] = &[0x01];
pub(super) const TFT_VCOM_POWER: &[u8] = &[0x02];

/// Check code the controller wants before it enters deep sleep
pub(super) const DEEP_SLEEP_CHECK: &[u8] = &[0xA5];

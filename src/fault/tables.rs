// Error tables for G3 boilers. Entry order matters: when several bits are set,
// the last matching entry of a table is the one reported.

use super::BitLabel;

pub static SYSTEM_ERRORS: [BitLabel; 8] = [
    BitLabel::new(0x01, "CANbus"),
    BitLabel::new(0x02, "CGI Task"),
    BitLabel::new(0x04, "I2C Bus 0"),
    BitLabel::new(0x08, "I2C Bus 1"),
    BitLabel::new(0x10, "BACnet Task"),
    BitLabel::new(0x20, "GPIO Expander"),
    BitLabel::new(0x40, "LCD Module/Bus"),
    BitLabel::new(0x80, "FRAM Module"),
];

pub static HARD_ERRORS: [BitLabel; 6] = [
    BitLabel::new(0x01, "Ignition Trials Exceeded"),
    BitLabel::new(0x10, "Roll Out Switch"),
    BitLabel::new(0x20, "Low Water Cutoff"),
    BitLabel::new(0x02, "Module High Current"),
    BitLabel::new(0x04, "Sec/Indoor Sensor"),
    BitLabel::new(0x08, "Low Water Cutoff"),
];

pub static SOFT_ERRORS_1: [BitLabel; 7] = [
    BitLabel::new(0x0001, "Flame Sig/Vent Blocked"),
    BitLabel::new(0x0004, "Low RPM/Air Flow"),
    BitLabel::new(0x0008, "No/Low Water Flow"),
    BitLabel::new(0x0010, "Water High Limit"),
    BitLabel::new(0x0020, "Vent High Limit"),
    BitLabel::new(0x0040, "Interlock 1 Open"),
    BitLabel::new(0x0080, "Interlock 2 Open"),
];

// 0x1000 is listed last on purpose, reversed flow wins over the others
pub static SOFT_ERRORS_2: [BitLabel; 8] = [
    BitLabel::new(0x0100, "Inlet Pressure Sensor"),
    BitLabel::new(0x0200, "Fan Pressure"),
    BitLabel::new(0x0400, "No/Low Water Flow"),
    BitLabel::new(0x0800, "Low Module Current"),
    BitLabel::new(0x2000, "See Error Log/SIM"),
    BitLabel::new(0x4000, "Low Water Pressure"),
    BitLabel::new(0x8000, "Max deltaT Exceeded"),
    BitLabel::new(0x1000, "Reversed Flow"),
];

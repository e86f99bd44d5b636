// Register map for the 4-channel motor driver board
//
// Offsets are fixed by the board's documented I2C interface.

use serde::{Deserialize, Serialize};

/// Default I2C address of the board
pub const DEVICE_ADDR: u8 = 0x26;

pub const REG_MOTOR_TYPE: u8 = 0x01; // write-only
pub const REG_DEADZONE: u8 = 0x02; // write-only
pub const REG_MAGNETIC_LINES: u8 = 0x03; // write-only
pub const REG_REDUCTION_RATIO: u8 = 0x04; // write-only
pub const REG_WHEEL_DIAMETER: u8 = 0x05; // write-only
pub const REG_SPEED_CONTROL: u8 = 0x06; // write-only, 4x i16 BE
pub const REG_PWM_CONTROL: u8 = 0x07; // write-only, 4x i16 BE
pub const REG_BATTERY_VOLTAGE: u8 = 0x08; // read-only, u16 BE
pub const REG_M1_ENCODER: u8 = 0x10; // read-only, i16 BE

/// Device address and register offsets, injected into the driver and bus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegisterMap {
    pub device_address: u8,
    pub motor_type: u8,
    pub deadzone: u8,
    pub magnetic_lines: u8,
    pub reduction_ratio: u8,
    pub wheel_diameter: u8,
    pub speed_control: u8,
    pub pwm_control: u8,
    pub battery_voltage: u8,
    pub m1_encoder: u8,
}

impl Default for RegisterMap {
    fn default() -> Self {
        Self {
            device_address: DEVICE_ADDR,
            motor_type: REG_MOTOR_TYPE,
            deadzone: REG_DEADZONE,
            magnetic_lines: REG_MAGNETIC_LINES,
            reduction_ratio: REG_REDUCTION_RATIO,
            wheel_diameter: REG_WHEEL_DIAMETER,
            speed_control: REG_SPEED_CONTROL,
            pwm_control: REG_PWM_CONTROL,
            battery_voltage: REG_BATTERY_VOLTAGE,
            m1_encoder: REG_M1_ENCODER,
        }
    }
}

/// Write-only configuration registers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigRegister {
    MotorType,
    Deadzone,
    MagneticLines,
    ReductionRatio,
    WheelDiameter,
}

impl RegisterMap {
    /// Offset of a configuration register in this map
    pub fn config_offset(&self, register: ConfigRegister) -> u8 {
        match register {
            ConfigRegister::MotorType => self.motor_type,
            ConfigRegister::Deadzone => self.deadzone,
            ConfigRegister::MagneticLines => self.magnetic_lines,
            ConfigRegister::ReductionRatio => self.reduction_ratio,
            ConfigRegister::WheelDiameter => self.wheel_diameter,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_map_matches_board_docs() {
        let map = RegisterMap::default();
        assert_eq!(map.device_address, 0x26);
        assert_eq!(map.speed_control, 0x06);
        assert_eq!(map.pwm_control, 0x07);
        assert_eq!(map.battery_voltage, 0x08);
        assert_eq!(map.m1_encoder, 0x10);
    }

    #[test]
    fn test_config_offsets() {
        let map = RegisterMap::default();
        assert_eq!(map.config_offset(ConfigRegister::MotorType), 0x01);
        assert_eq!(map.config_offset(ConfigRegister::Deadzone), 0x02);
        assert_eq!(map.config_offset(ConfigRegister::MagneticLines), 0x03);
        assert_eq!(map.config_offset(ConfigRegister::ReductionRatio), 0x04);
        assert_eq!(map.config_offset(ConfigRegister::WheelDiameter), 0x05);
    }

    #[test]
    fn test_partial_json_falls_back_to_defaults() {
        let map: RegisterMap = serde_json::from_str(r#"{"device_address": 39}"#).unwrap();
        assert_eq!(map.device_address, 0x27);
        assert_eq!(map.m1_encoder, REG_M1_ENCODER);
    }
}

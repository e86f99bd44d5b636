// High-level driver for the 4-channel motor board
//
// Combines the register map, codec and a register bus into a simple API
// for commanding the wheels and reading telemetry.

use tracing::{debug, info};

use super::bus::{RegisterBus, TransportError};
use super::codec::{ChassisCodec, DecodeError, PwmCommand, READING_LEN, SpeedCommand};
use super::registers::{ConfigRegister, RegisterMap};

#[derive(Debug, thiserror::Error)]
pub enum ChassisError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),
}

pub type Result<T> = std::result::Result<T, ChassisError>;

/// Motor board driver over a register bus
pub struct ChassisDriver<B> {
    bus: B,
    registers: RegisterMap,
}

impl<B: RegisterBus> ChassisDriver<B> {
    /// Create a driver using the board's documented register map
    pub fn new(bus: B) -> Self {
        Self::with_registers(bus, RegisterMap::default())
    }

    pub fn with_registers(bus: B, registers: RegisterMap) -> Self {
        Self { bus, registers }
    }

    /// Send per-channel target speeds, saturated to +/-1000
    pub fn set_speeds(&mut self, speeds: [i32; 4]) -> Result<SpeedCommand> {
        let cmd = SpeedCommand::new(speeds);
        debug!("Setting speeds: requested={:?}, sent={:?}", speeds, cmd.as_array());
        self.bus.write_register(self.registers.speed_control, &cmd.to_bytes())?;
        Ok(cmd)
    }

    /// Send per-channel PWM duty, saturated to +/-3600
    pub fn set_pwm(&mut self, pwms: [i32; 4]) -> Result<PwmCommand> {
        let cmd = PwmCommand::new(pwms);
        debug!("Setting PWM: requested={:?}, sent={:?}", pwms, cmd.as_array());
        self.bus.write_register(self.registers.pwm_control, &cmd.to_bytes())?;
        Ok(cmd)
    }

    /// Zero PWM, then zero speed
    pub fn stop(&mut self) -> Result<()> {
        info!("Stopping all motors");
        self.set_pwm([0; 4])?;
        self.set_speeds([0; 4])?;
        Ok(())
    }

    /// Battery voltage in volts
    pub fn read_battery(&mut self) -> Result<f32> {
        let buf = self.bus.read_register(self.registers.battery_voltage, READING_LEN)?;
        let volts = ChassisCodec::decode_battery(&buf)?;
        debug!("Battery voltage: {:.2}V", volts);
        Ok(volts)
    }

    /// M1 encoder count in ticks
    pub fn read_m1_encoder(&mut self) -> Result<i16> {
        let buf = self.bus.read_register(self.registers.m1_encoder, READING_LEN)?;
        let ticks = ChassisCodec::decode_encoder(&buf)?;
        debug!("M1 encoder: {}", ticks);
        Ok(ticks)
    }

    /// Raw write to a configuration register; the payload format is board specific
    pub fn write_config(&mut self, register: ConfigRegister, payload: &[u8]) -> Result<()> {
        let offset = self.registers.config_offset(register);
        info!("Writing {:?} (0x{:02X}): {:02X?}", register, offset, payload);
        self.bus.write_register(offset, payload)?;
        Ok(())
    }

    pub fn registers(&self) -> &RegisterMap {
        &self.registers
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
    }

    pub fn into_bus(self) -> B {
        self.bus
    }
}

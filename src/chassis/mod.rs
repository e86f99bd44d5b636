// Chassis control for the 4-channel motor driver board
//
// Provides:
// - Register map of the board's I2C interface
// - Codec between wheel commands/telemetry and register bytes
// - Register bus transports (I2C and simulated)
// - High-level driver API

pub mod bus;
pub mod codec;
mod driver;
pub mod registers;

pub use bus::{I2cRegisterBus, RegisterBus, SimulatedBus, TransportError};
pub use codec::{ChassisCodec, DecodeError, MotorChannel, PwmCommand, SpeedCommand};
pub use driver::{ChassisDriver, ChassisError};
pub use registers::{ConfigRegister, RegisterMap};

// Register bus transports for the motor board
//
// The board speaks SMBus-style block transfers:
//   write: [REG, data...]            (one I2C write)
//   read:  [REG] then read N bytes   (one I2C write_read)

use std::collections::HashMap;

use embedded_hal::i2c::{Error as _, ErrorKind, I2c};
use tracing::debug;

use super::registers::RegisterMap;

/// Error types for bus transactions
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to open I2C bus {path}: {reason}")]
    Open { path: String, reason: String },

    #[error("I2C transaction on register 0x{register:02X} failed: {kind:?}")]
    I2c { register: u8, kind: ErrorKind },

    #[error("Simulated bus fault on register 0x{register:02X}")]
    Injected { register: u8 },
}

pub type Result<T> = std::result::Result<T, TransportError>;

/// A bus that moves opaque bytes to and from numbered registers.
///
/// Every call is one complete transaction; `&mut self` keeps them serialized.
pub trait RegisterBus {
    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<()>;

    fn read_register(&mut self, register: u8, length: usize) -> Result<Vec<u8>>;
}

impl<B: RegisterBus + ?Sized> RegisterBus for Box<B> {
    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<()> {
        (**self).write_register(register, data)
    }

    fn read_register(&mut self, register: u8, length: usize) -> Result<Vec<u8>> {
        (**self).read_register(register, length)
    }
}

/// Register bus over any embedded-hal I2C implementation
pub struct I2cRegisterBus<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C: I2c> I2cRegisterBus<I2C> {
    pub fn new(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Address the board at the map's `device_address`
    pub fn with_map(i2c: I2C, registers: &RegisterMap) -> Self {
        Self::new(i2c, registers.device_address)
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying I2C handle
    pub fn release(self) -> I2C {
        self.i2c
    }
}

#[cfg(target_os = "linux")]
impl I2cRegisterBus<linux_embedded_hal::I2cdev> {
    /// Open a Linux i2c-dev bus, e.g. `/dev/i2c-5`
    pub fn open_linux(path: &str, registers: &RegisterMap) -> Result<Self> {
        let i2c = linux_embedded_hal::I2cdev::new(path).map_err(|e| TransportError::Open {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
        debug!(
            "Opened I2C bus {} for device 0x{:02X}",
            path, registers.device_address
        );
        Ok(Self::with_map(i2c, registers))
    }
}

impl<I2C: I2c> RegisterBus for I2cRegisterBus<I2C> {
    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<()> {
        let mut frame = Vec::with_capacity(data.len() + 1);
        frame.push(register);
        frame.extend_from_slice(data);

        debug!(
            "I2C write to 0x{:02X}: reg=0x{:02X}, data={:02X?}",
            self.address, register, data
        );
        self.i2c
            .write(self.address, &frame)
            .map_err(|e| TransportError::I2c {
                register,
                kind: e.kind(),
            })
    }

    fn read_register(&mut self, register: u8, length: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; length];
        self.i2c
            .write_read(self.address, &[register], &mut buf)
            .map_err(|e| TransportError::I2c {
                register,
                kind: e.kind(),
            })?;

        debug!(
            "I2C read from 0x{:02X}: reg=0x{:02X}, data={:02X?}",
            self.address, register, buf
        );
        Ok(buf)
    }
}

/// In-memory register file standing in for the board
#[derive(Debug, Default)]
pub struct SimulatedBus {
    registers: HashMap<u8, Vec<u8>>,
    writes: Vec<(u8, Vec<u8>)>,
    fail_on: Option<u8>,
}

impl SimulatedBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preset the bytes a register returns on read.
    /// Fewer bytes than requested simulates a short read.
    pub fn set_register(&mut self, register: u8, data: &[u8]) {
        self.registers.insert(register, data.to_vec());
    }

    /// Make the next transaction on `register` fail
    pub fn fail_next_on(&mut self, register: u8) {
        self.fail_on = Some(register);
    }

    /// All writes seen so far, in order
    pub fn writes(&self) -> &[(u8, Vec<u8>)] {
        &self.writes
    }

    /// Last payload written to a register
    pub fn last_write(&self, register: u8) -> Option<&[u8]> {
        self.writes
            .iter()
            .rev()
            .find(|(reg, _)| *reg == register)
            .map(|(_, data)| data.as_slice())
    }

    fn take_fault(&mut self, register: u8) -> Result<()> {
        if self.fail_on == Some(register) {
            self.fail_on = None;
            return Err(TransportError::Injected { register });
        }
        Ok(())
    }
}

impl RegisterBus for SimulatedBus {
    fn write_register(&mut self, register: u8, data: &[u8]) -> Result<()> {
        self.take_fault(register)?;
        debug!("Sim write: reg=0x{:02X}, data={:02X?}", register, data);
        self.writes.push((register, data.to_vec()));
        Ok(())
    }

    fn read_register(&mut self, register: u8, length: usize) -> Result<Vec<u8>> {
        self.take_fault(register)?;
        let data = match self.registers.get(&register) {
            Some(stored) => stored.iter().copied().take(length).collect(),
            None => vec![0u8; length],
        };
        debug!("Sim read: reg=0x{:02X}, data={:02X?}", register, data);
        Ok(data)
    }
}

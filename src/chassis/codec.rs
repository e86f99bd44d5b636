// Codec for the motor board register payloads
//
// Commands: 4 channels, each a big-endian i16, M1..M4 -> 8 bytes.
// Readings: 2-byte big-endian registers (battery = u16 / 10, encoder = i16).

/// Speed command limits (board units)
pub const SPEED_LIMIT: i32 = 1000;

/// PWM duty limits (board units)
pub const PWM_LIMIT: i32 = 3600;

/// Length of a four-channel command payload
pub const COMMAND_LEN: usize = 8;

/// Length of a telemetry register read
pub const READING_LEN: usize = 2;

/// Motor channels, in payload order
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotorChannel {
    M1 = 0,
    M2 = 1,
    M3 = 2,
    M4 = 3,
}

impl MotorChannel {
    pub const ALL: [MotorChannel; 4] = [Self::M1, Self::M2, Self::M3, Self::M4];

    pub fn ordinal(self) -> usize {
        self as usize
    }

    /// Byte offset of this channel inside a command payload
    pub fn offset(self) -> usize {
        self.ordinal() * 2
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Short read: expected {expected} bytes, got {actual}")]
    ShortRead { expected: usize, actual: usize },
}

/// Per-channel target speeds, saturated to +/-SPEED_LIMIT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SpeedCommand([i16; 4]);

impl SpeedCommand {
    pub fn new(speeds: [i32; 4]) -> Self {
        Self(clamp_channels(speeds, SPEED_LIMIT))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: MotorChannel) -> i16 {
        self.0[channel.ordinal()]
    }

    pub fn as_array(&self) -> [i16; 4] {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; COMMAND_LEN] {
        pack_channels(self.0)
    }
}

/// Per-channel PWM duty, saturated to +/-PWM_LIMIT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PwmCommand([i16; 4]);

impl PwmCommand {
    pub fn new(pwms: [i32; 4]) -> Self {
        Self(clamp_channels(pwms, PWM_LIMIT))
    }

    pub fn zero() -> Self {
        Self::default()
    }

    pub fn channel(&self, channel: MotorChannel) -> i16 {
        self.0[channel.ordinal()]
    }

    pub fn as_array(&self) -> [i16; 4] {
        self.0
    }

    pub fn to_bytes(&self) -> [u8; COMMAND_LEN] {
        pack_channels(self.0)
    }
}

/// Stateless transcoder between commands/readings and register bytes
#[derive(Debug, Clone, Copy, Default)]
pub struct ChassisCodec;

impl ChassisCodec {
    /// Encode four channel speeds. Out-of-range values saturate, never fail.
    pub fn encode_speeds(speeds: [i32; 4]) -> [u8; COMMAND_LEN] {
        SpeedCommand::new(speeds).to_bytes()
    }

    /// Encode four channel PWM duties. Out-of-range values saturate, never fail.
    pub fn encode_pwm(pwms: [i32; 4]) -> [u8; COMMAND_LEN] {
        PwmCommand::new(pwms).to_bytes()
    }

    /// Battery voltage in volts. Trailing bytes past the register are ignored.
    pub fn decode_battery(buf: &[u8]) -> Result<f32, DecodeError> {
        let raw = u16::from_be_bytes(first_two(buf)?);
        Ok(raw as f32 / 10.0)
    }

    /// Encoder ticks, two's-complement signed.
    pub fn decode_encoder(buf: &[u8]) -> Result<i16, DecodeError> {
        Ok(i16::from_be_bytes(first_two(buf)?))
    }
}

fn clamp_channels(values: [i32; 4], limit: i32) -> [i16; 4] {
    // limit fits in i16 for both command kinds
    values.map(|v| v.clamp(-limit, limit) as i16)
}

fn pack_channels(values: [i16; 4]) -> [u8; COMMAND_LEN] {
    let mut payload = [0u8; COMMAND_LEN];
    for channel in MotorChannel::ALL {
        let offset = channel.offset();
        payload[offset..offset + 2].copy_from_slice(&values[channel.ordinal()].to_be_bytes());
    }
    payload
}

fn first_two(buf: &[u8]) -> Result<[u8; READING_LEN], DecodeError> {
    match buf {
        [high, low, ..] => Ok([*high, *low]),
        _ => Err(DecodeError::ShortRead {
            expected: READING_LEN,
            actual: buf.len(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn channel_value(payload: &[u8; COMMAND_LEN], channel: MotorChannel) -> i16 {
        let offset = channel.offset();
        i16::from_be_bytes([payload[offset], payload[offset + 1]])
    }

    #[test]
    fn test_channel_offsets() {
        assert_eq!(MotorChannel::M1.offset(), 0);
        assert_eq!(MotorChannel::M2.offset(), 2);
        assert_eq!(MotorChannel::M3.offset(), 4);
        assert_eq!(MotorChannel::M4.offset(), 6);
    }

    #[test]
    fn test_encode_speeds_big_endian() {
        let payload = ChassisCodec::encode_speeds([0, 500, -1, 256]);
        assert_eq!(payload, [0x00, 0x00, 0x01, 0xF4, 0xFF, 0xFF, 0x01, 0x00]);
    }

    #[test]
    fn test_encode_speeds_saturates_at_boundary() {
        let payload = ChassisCodec::encode_speeds([1001, -1001, 1000, -1000]);
        let decoded: Vec<i16> = MotorChannel::ALL
            .iter()
            .map(|&c| channel_value(&payload, c))
            .collect();
        assert_eq!(decoded, vec![1000, -1000, 1000, -1000]);
    }

    #[test]
    fn test_speed_command_channels() {
        let cmd = SpeedCommand::new([-2000, 10, 999, 1000]);
        assert_eq!(cmd.channel(MotorChannel::M1), -1000);
        assert_eq!(cmd.channel(MotorChannel::M2), 10);
        assert_eq!(cmd.channel(MotorChannel::M3), 999);
        assert_eq!(cmd.channel(MotorChannel::M4), 1000);
    }

    #[test]
    fn test_encode_pwm_saturates_independently() {
        let cmd = PwmCommand::new([i32::MAX, 1000, i32::MIN, -3600]);
        assert_eq!(cmd.as_array(), [3600, 1000, -3600, -3600]);
        assert_eq!(cmd.channel(MotorChannel::M2), 1000);
    }

    #[test]
    fn test_zero_commands_are_all_zero_bytes() {
        assert_eq!(SpeedCommand::zero().to_bytes(), [0u8; COMMAND_LEN]);
        assert_eq!(PwmCommand::zero().to_bytes(), [0u8; COMMAND_LEN]);
    }

    #[test]
    fn test_decode_battery() {
        // 0x012C = 300 -> 30.0V
        assert_eq!(ChassisCodec::decode_battery(&[0x01, 0x2C]), Ok(30.0));
        // never reinterpreted as signed
        assert_eq!(ChassisCodec::decode_battery(&[0xFF, 0xFF]), Ok(6553.5));
    }

    #[test]
    fn test_decode_encoder_sign_recovery() {
        assert_eq!(ChassisCodec::decode_encoder(&[0x00, 0x05]), Ok(5));
        assert_eq!(ChassisCodec::decode_encoder(&[0xFF, 0xFB]), Ok(-5));
        assert_eq!(ChassisCodec::decode_encoder(&[0x80, 0x00]), Ok(i16::MIN));
        assert_eq!(ChassisCodec::decode_encoder(&[0x7F, 0xFF]), Ok(i16::MAX));
    }

    #[test]
    fn test_short_reads_are_errors() {
        for buf in [&[][..], &[0x01][..]] {
            assert_eq!(
                ChassisCodec::decode_battery(buf),
                Err(DecodeError::ShortRead {
                    expected: 2,
                    actual: buf.len()
                })
            );
            assert!(matches!(
                ChassisCodec::decode_encoder(buf),
                Err(DecodeError::ShortRead { .. })
            ));
        }
    }

    #[test]
    fn test_trailing_bytes_ignored() {
        assert_eq!(ChassisCodec::decode_battery(&[0x00, 0x7B, 0xAA]), Ok(12.3));
        assert_eq!(ChassisCodec::decode_encoder(&[0xFF, 0xFB, 0x00, 0x01]), Ok(-5));
    }
}

// Output types printed by the CLI (JSON with --json)

use serde::{Deserialize, Serialize};

/// Telemetry snapshot; a field is None when it was not read
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Telemetry {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub battery_volts: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub m1_encoder: Option<i16>,
}

/// Command actually sent to the board, after saturation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SentCommand {
    Speed { channels: [i16; 4] },
    Pwm { channels: [i16; 4] },
    Stop,
}

/// Outcome of the board self-test
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelfTestReport {
    pub battery_volts: Option<f32>,
    pub encoder_before: Option<i16>,
    pub encoder_after: Option<i16>,
    pub steps_completed: usize,
    pub interrupted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_telemetry_skips_unread_fields() {
        let t = Telemetry {
            battery_volts: Some(12.5),
            m1_encoder: None,
        };
        assert_eq!(serde_json::to_string(&t).unwrap(), r#"{"battery_volts":12.5}"#);
    }

    #[test]
    fn test_sent_command_is_tagged() {
        let cmd = SentCommand::Pwm {
            channels: [0, -1000, 0, -1000],
        };
        assert_eq!(
            serde_json::to_string(&cmd).unwrap(),
            r#"{"mode":"pwm","channels":[0,-1000,0,-1000]}"#
        );
        assert_eq!(serde_json::to_string(&SentCommand::Stop).unwrap(), r#"{"mode":"stop"}"#);
    }
}

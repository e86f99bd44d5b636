use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::LevelFilter;

use chassis_driver::chassis::{ChassisDriver, RegisterBus, SimulatedBus, TransportError};
use chassis_driver::config::DriverConfig;
use chassis_driver::messages::{SentCommand, Telemetry};
use chassis_driver::self_test::{self, SelfTestPlan};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser, Debug)]
#[command(name = "chassis-driver", version, about = "4-channel motor board driver over I2C")]
struct Cli {
    /// JSON config file (flags below override it)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// I2C bus device, e.g. /dev/i2c-5
    #[arg(long, global = true)]
    bus: Option<String>,

    /// Board I2C address, decimal or 0x-prefixed hex
    #[arg(long, global = true, value_parser = parse_address)]
    address: Option<u8>,

    /// Use an in-memory bus instead of hardware
    #[arg(long, global = true)]
    simulate: bool,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read the battery voltage
    Battery,
    /// Read the M1 encoder count
    Encoder,
    /// Set per-channel target speed (-1000..=1000)
    #[command(allow_negative_numbers = true)]
    Speed { m1: i32, m2: i32, m3: i32, m4: i32 },
    /// Set per-channel PWM duty (-3600..=3600)
    #[command(allow_negative_numbers = true)]
    Pwm { m1: i32, m2: i32, m3: i32, m4: i32 },
    /// Zero PWM and speed on all channels
    Stop,
    /// Run the bring-up test sequence (wheels off the ground!)
    SelfTest {
        #[arg(long, default_value_t = 2000)]
        hold_ms: u64,
        #[arg(long, default_value_t = 1000)]
        settle_ms: u64,
    },
}

fn parse_address(s: &str) -> Result<u8, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid I2C address {:?}: {}", s, e))
}

#[tokio::main]
async fn main() {
    // Setup logging (set RUST_LOG=debug to see bus traffic)
    let spec = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&spec))
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli, &mut std::io::stdout()).await {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Filter from a RUST_LOG-style spec, info when the spec sets no level
fn log_filter(spec: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(spec)
}

async fn run(cli: Cli, out: &mut impl Write) -> Result<(), BoxError> {
    let mut config = match &cli.config {
        Some(path) => DriverConfig::load(path)?,
        None => DriverConfig::default(),
    };
    if let Some(bus) = cli.bus {
        config.bus_path = bus;
    }
    if let Some(address) = cli.address {
        config.registers.device_address = address;
    }
    config.simulate |= cli.simulate;

    let bus = open_bus(&config)?;
    let mut driver = ChassisDriver::with_registers(bus, config.registers);

    match cli.command {
        Command::Battery => {
            let volts = driver.read_battery()?;
            let telemetry = Telemetry {
                battery_volts: Some(volts),
                ..Default::default()
            };
            print_telemetry(out, &telemetry, cli.json)?;
        }
        Command::Encoder => {
            let ticks = driver.read_m1_encoder()?;
            let telemetry = Telemetry {
                m1_encoder: Some(ticks),
                ..Default::default()
            };
            print_telemetry(out, &telemetry, cli.json)?;
        }
        Command::Speed { m1, m2, m3, m4 } => {
            let cmd = driver.set_speeds([m1, m2, m3, m4])?;
            let sent = SentCommand::Speed {
                channels: cmd.as_array(),
            };
            print_sent(out, sent, cli.json)?;
        }
        Command::Pwm { m1, m2, m3, m4 } => {
            let cmd = driver.set_pwm([m1, m2, m3, m4])?;
            let sent = SentCommand::Pwm {
                channels: cmd.as_array(),
            };
            print_sent(out, sent, cli.json)?;
        }
        Command::Stop => {
            driver.stop()?;
            print_sent(out, SentCommand::Stop, cli.json)?;
        }
        Command::SelfTest { hold_ms, settle_ms } => {
            let plan = SelfTestPlan {
                hold: Duration::from_millis(hold_ms),
                settle: Duration::from_millis(settle_ms),
            };
            let report = self_test::run(&mut driver, plan).await?;
            if cli.json {
                writeln!(out, "{}", serde_json::to_string(&report)?)?;
            } else {
                writeln!(out, "{:#?}", report)?;
            }
        }
    }
    Ok(())
}

fn open_bus(config: &DriverConfig) -> Result<Box<dyn RegisterBus>, TransportError> {
    if config.simulate {
        info!("Using simulated bus");
        let mut sim = SimulatedBus::new();
        // 12.0V so dry runs read a plausible battery
        sim.set_register(config.registers.battery_voltage, &120u16.to_be_bytes());
        return Ok(Box::new(sim));
    }
    open_hardware_bus(config)
}

#[cfg(target_os = "linux")]
fn open_hardware_bus(config: &DriverConfig) -> Result<Box<dyn RegisterBus>, TransportError> {
    use chassis_driver::chassis::I2cRegisterBus;

    info!(
        "Opening I2C bus {} (device 0x{:02X})",
        config.bus_path, config.registers.device_address
    );
    let bus = I2cRegisterBus::open_linux(&config.bus_path, &config.registers)?;
    Ok(Box::new(bus))
}

#[cfg(not(target_os = "linux"))]
fn open_hardware_bus(config: &DriverConfig) -> Result<Box<dyn RegisterBus>, TransportError> {
    Err(TransportError::Open {
        path: config.bus_path.clone(),
        reason: "i2c-dev is only available on Linux, use --simulate".to_string(),
    })
}

fn print_telemetry(
    out: &mut impl Write,
    telemetry: &Telemetry,
    json: bool,
) -> Result<(), BoxError> {
    if json {
        writeln!(out, "{}", serde_json::to_string(telemetry)?)?;
        return Ok(());
    }
    if let Some(volts) = telemetry.battery_volts {
        writeln!(out, "Battery voltage: {:.2}V", volts)?;
    }
    if let Some(ticks) = telemetry.m1_encoder {
        writeln!(out, "M1 encoder: {}", ticks)?;
    }
    Ok(())
}

fn print_sent(out: &mut impl Write, cmd: SentCommand, json: bool) -> Result<(), BoxError> {
    if json {
        writeln!(out, "{}", serde_json::to_string(&cmd)?)?;
        return Ok(());
    }
    match cmd {
        SentCommand::Speed {
            channels: [m1, m2, m3, m4],
        } => writeln!(out, "Speed set: M1={}, M2={}, M3={}, M4={}", m1, m2, m3, m4)?,
        SentCommand::Pwm {
            channels: [m1, m2, m3, m4],
        } => writeln!(out, "PWM set: M1={}, M2={}, M3={}, M4={}", m1, m2, m3, m4)?,
        SentCommand::Stop => writeln!(out, "All motors stopped")?,
    }
    Ok(())
}

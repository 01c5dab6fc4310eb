use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use antchannel::{
    defines, event_channels,
    message::MessageId,
    sink::{FileSink, LogSink, Tee},
    unbounded, Ant, Channel, ChannelConfig, ChannelEventDispatcher, ChannelType, Context,
    DeviceEventDispatcher, Dispatchers, Request, RunState, Transport, UsbTransport,
};
use clap::{Parser, ValueEnum};
use crossbeam_channel::Sender;
use log::{error, info};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Role {
    Master,
    Slave,
}

#[derive(Parser, Debug)]
#[command(name = "antchannel")]
#[command(author, version, about = "Receive ANT+ heart rate broadcasts", long_about = None)]
struct Cli {
    /// Open the channel as a transmitting master or a receiving slave
    #[arg(long, value_enum, default_value_t = Role::Slave)]
    channel_type: Role,

    /// ANT channel to use
    #[arg(long, default_value_t = 0)]
    channel: u8,

    /// Network number the network key is assigned to
    #[arg(long, default_value_t = 0)]
    network: u8,

    /// Device number, 0 pairs with any device
    #[arg(long, default_value_t = 0)]
    device_number: u16,

    #[arg(long, default_value_t = defines::HRM_DEVICE_TYPE)]
    device_type: u8,

    #[arg(long, default_value_t = 0)]
    transmission_type: u8,

    /// RF frequency offset from 2400 MHz
    #[arg(long, default_value_t = defines::HRM_RF_FREQUENCY)]
    frequency: u8,

    /// Channel period in 1/32768 s ticks
    #[arg(long, default_value_t = defines::HRM_CHANNEL_PERIOD)]
    period: u16,

    /// Do not ask the radio for extended messages
    #[arg(long)]
    no_extended: bool,

    /// File the latest heart rate is written to
    #[arg(long, default_value = "heart_rate.txt")]
    output: PathBuf,
}

impl Cli {
    fn config(&self) -> ChannelConfig {
        let channel_type = match self.channel_type {
            Role::Master => ChannelType::MasterTransmit,
            Role::Slave => ChannelType::SlaveReceive,
        };
        ChannelConfig::new()
            .channel_number(self.channel)
            .network(self.network, defines::ANT_PLUS_NETWORK_KEY)
            .channel_type(channel_type)
            .device_number(self.device_number)
            .device_type(self.device_type)
            .transmission_type(self.transmission_type)
            .rf_frequency_offset(self.frequency)
            .channel_period_ticks(self.period)
            .extended_messages(!self.no_extended)
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();
    if let Err(e) = run(&cli) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> antchannel::Result<()> {
    let config = cli.config();

    info!("Attempting to connect to an ANT USB device...");
    let mut ctx = Context::new()?;
    let (sinks, streams) = event_channels(defines::EVENT_QUEUE_CAPACITY);
    let transport: Arc<dyn Transport> =
        Arc::new(UsbTransport::init(&mut ctx, config.channel_number, sinks)?);
    info!("Initialization was successful!");

    let state = Arc::new(RunState::new());
    let display = LogSink::new();
    let dispatchers = Dispatchers::spawn(
        streams,
        DeviceEventDispatcher::new(transport.clone()),
        ChannelEventDispatcher::new(),
        state.clone(),
        Box::new(Tee::new(FileSink::new(&cli.output), display.clone())),
    )?;

    let (tx, rx) = unbounded();
    console(tx, display)?;

    let mut ant = Ant::new(transport, Channel::new(config), state, rx);
    let result = ant.start().and_then(|_| {
        print_menu();
        ant.run()
    });
    // The transport is shut down by now, which closes both event queues.
    dispatchers.join();
    result
}

fn print_menu() {
    info!("M - Print this menu");
    info!("C - Request capabilities");
    info!("V - Request version");
    info!("I - Request channel ID");
    info!("S - Request channel status");
    info!("D - Toggle heart rate display");
    info!("Q - Close the channel and quit");
    info!("X - Quit without waiting for the channel to close");
}

// Operator commands come in on stdin, one per line.
fn console(requests: Sender<Request>, display: LogSink) -> antchannel::Result<()> {
    thread::Builder::new()
        .name("console".into())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let cmd = match line {
                    Ok(line) => line.trim().to_ascii_lowercase(),
                    Err(_) => break,
                };
                let request = match cmd.as_str() {
                    "q" => Request::Stop,
                    "x" => Request::Abort,
                    "c" => Request::Query(MessageId::Capabilities),
                    "v" => Request::Query(MessageId::Version),
                    "i" => Request::Query(MessageId::ChannelId),
                    "s" => Request::Query(MessageId::ChannelStatus),
                    "d" => {
                        let on = display.toggle_display();
                        info!("Heart rate display {}", if on { "on" } else { "off" });
                        continue;
                    }
                    "m" => {
                        print_menu();
                        continue;
                    }
                    _ => continue,
                };
                if requests.send(request).is_err() {
                    break;
                }
            }
        })?;
    Ok(())
}

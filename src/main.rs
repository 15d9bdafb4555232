//! Console remote for Behringer X AIR mixers, speaking OSC over UDP:
//! query device info, move channel faders, and watch live channel meters.

use std::error::Error;
use std::io::{stdin, stdout, Write};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;
use std::time::Duration;

mod config;
mod display;
mod meter;
mod osc;
mod remote;

use config::Config;
use remote::session::MixerSession;
use remote::transport::UdpTransport;

/// Toggled from the console with `debug on` / `debug off`.
pub static DEBUG_ENABLED: AtomicBool = AtomicBool::new(false);

static CONFIG: OnceLock<Config> = OnceLock::new();

pub fn is_debug_enabled() -> bool {
    DEBUG_ENABLED.load(Ordering::SeqCst)
}

/// Process-wide configuration, loaded once from config.json.
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(|| Config::load(Path::new("config.json")))
}

fn main() {
    match run() {
        Ok(_) => (),
        Err(err) => println!("Error: {}", err),
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = get_config();

    let transport = match UdpTransport::connect(&config.mixer.address) {
        Ok(transport) => transport,
        Err(err) => {
            display::print_connection_failed(&config.mixer.address, &err);
            return Err(err.into());
        }
    };
    display::print_connected(&config.mixer.address);

    let session = MixerSession::new(transport, config.meters.feed.clone());

    let stdin = stdin();
    let mut line = String::new();
    loop {
        print!("> ");
        stdout().flush()?;

        line.clear();
        if stdin.read_line(&mut line)? == 0 {
            break; // EOF
        }
        let cmd = line.trim();
        if cmd.is_empty()
            || cmd.eq_ignore_ascii_case("exit")
            || cmd.eq_ignore_ascii_case("quit")
            || cmd.eq_ignore_ascii_case("q")
        {
            break;
        }
        dispatch(&session, config, cmd);
    }

    println!("Closing connection and exiting...");
    Ok(())
}

fn dispatch(session: &MixerSession<UdpTransport>, config: &Config, cmd: &str) {
    if cmd.eq_ignore_ascii_case("help") {
        display::print_quick_help();
        return;
    }
    if cmd.eq_ignore_ascii_case("debug on") {
        DEBUG_ENABLED.store(true, Ordering::SeqCst);
        println!("Debug enabled");
        return;
    }
    if cmd.eq_ignore_ascii_case("debug off") {
        DEBUG_ENABLED.store(false, Ordering::SeqCst);
        println!("Debug disabled");
        return;
    }

    if cmd.eq_ignore_ascii_case("info") {
        match session.query_info() {
            Ok(reply) => println!("response: {:?}", reply),
            Err(err) => eprintln!("[osc] info failed: {}", err),
        }
        return;
    }

    if let Some(rest) = strip_command(cmd, "fader") {
        run_fader(session, config, rest);
        return;
    }

    if let Some(rest) = strip_command(cmd, "meters") {
        run_meters(session, config, rest);
        return;
    }

    println!(
        "Unrecognized command: '{}'. Type 'help' for commands, 'exit' to quit.",
        cmd
    );
}

/// Splits "fader 1 0.5" into the part after the command word, if the
/// command word matches.
fn strip_command<'a>(cmd: &'a str, word: &str) -> Option<&'a str> {
    if cmd.eq_ignore_ascii_case(word) {
        return Some("");
    }
    cmd.split_once(char::is_whitespace)
        .filter(|(first, _)| first.eq_ignore_ascii_case(word))
        .map(|(_, rest)| rest.trim())
}

fn run_fader(session: &MixerSession<UdpTransport>, config: &Config, args: &str) {
    let mut parts = args.split_whitespace();
    let channel = parts.next().and_then(|p| p.parse::<u8>().ok());
    let level = parts.next().and_then(|p| p.parse::<f32>().ok());

    let (channel, level) = match (channel, level) {
        (Some(channel), Some(level)) => (channel, level),
        _ => {
            println!("Usage: fader <channel> <level 0.0-1.0>");
            return;
        }
    };
    if channel < 1 || channel > config.mixer.channel_count {
        println!(
            "Channel must be 1..={} on this console",
            config.mixer.channel_count
        );
        return;
    }

    match session.set_channel_fader(channel, level) {
        Ok(()) => println!("Channel {} fader -> {}", channel, level),
        Err(err) => eprintln!("[osc] fader failed: {}", err),
    }
}

fn run_meters(session: &MixerSession<UdpTransport>, config: &Config, args: &str) {
    let secs = if args.is_empty() {
        config.meters.duration_secs
    } else {
        match args.parse::<u64>() {
            Ok(secs) => secs,
            Err(_) => {
                println!("Usage: meters [seconds]");
                return;
            }
        }
    };

    println!(
        "Watching {} for {}s (channel 1)...",
        config.meters.feed, secs
    );
    let stream = match session.subscribe_meters(Duration::from_secs(secs)) {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("[meters] subscribe failed: {}", err);
            return;
        }
    };

    for sample in stream {
        match sample {
            Ok(sample) => display::print_meter_bar(sample, config.meters.bar_width),
            Err(err) => eprintln!("[meters] {}", err),
        }
    }
}

//! Console output helpers. termcolor so the colors also work on Windows
//! CMD.

use std::io::Write;

use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use crate::meter::loudness_to_bar;

/// Print the quick help line in blue.
pub fn print_quick_help() {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Blue)).set_intense(true));
    let _ = writeln!(
        &mut stdout,
        "Commands: info | fader <ch> <level> | meters [secs] | debug on/off | help | exit"
    );
    let _ = stdout.reset();
}

pub fn print_connected(target: &str) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_intense(true));
    let _ = writeln!(&mut stdout, "Socket ready | mixer at {}", target);
    let _ = stdout.reset();
    print_quick_help();
}

pub fn print_connection_failed(target: &str, err: &std::io::Error) {
    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_intense(true));
    let _ = writeln!(&mut stdout, "No socket to mixer at {}: {}", target, err);
    let _ = stdout.reset();
}

/// Renders one meter update as a bar: full width at clipping, red when hot.
pub fn print_meter_bar(sample: i16, max_width: usize) {
    let width = loudness_to_bar(sample, max_width);
    let color = if sample > -2048 { Color::Red } else { Color::Green };

    let mut stdout = StandardStream::stdout(ColorChoice::Always);
    let _ = stdout.set_color(ColorSpec::new().set_fg(Some(color)));
    let _ = writeln!(&mut stdout, "{:>6} {}", sample, "*".repeat(width));
    let _ = stdout.reset();
}

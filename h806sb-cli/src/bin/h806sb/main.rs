use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

mod logging;
mod options;

use h806sb::{CommandError, CommandSession, DiscoveryClient, DiscoveryOutcome};
use options::Options;

fn main() {
	if let Err(()) = do_main(clap::Parser::parse()) {
		std::process::exit(1);
	}
}

#[derive(Debug, Eq, PartialEq)]
enum ShellCommand {
	Discover,
	SetBrightness(u8),
	SetSpeed(u8),
	SetSingleFile(u8),
	Help,
	Exit,
}

fn do_main(options: Options) -> Result<(), ()> {
	logging::init(module_path!(), options.verbose as i8);

	let mut discovery = DiscoveryClient::open().map_err(|e| log::error!("Failed to bind discovery port: {}", e))?;
	let mut session = CommandSession::open().map_err(|e| log::error!("Failed to open command socket: {}", e))?;

	let running = Arc::new(AtomicBool::new(true));
	{
		let running = running.clone();
		ctrlc::set_handler(move || {
			running.store(false, Ordering::Relaxed);
			println!();
		})
		.map_err(|e| log::error!("Failed to install Ctrl+C handler: {}", e))?;
	}

	let timeout = Duration::from_secs(options.timeout);
	println!("H806SB LED controller shell. Type \"help\" for the command list.");

	let stdin = std::io::stdin();
	while running.load(Ordering::Relaxed) {
		print!("> ");
		let _ = std::io::stdout().flush();

		let mut line = String::new();
		match stdin.read_line(&mut line) {
			Ok(0) => break,
			Ok(_) => (),
			Err(e) => {
				log::error!("Failed to read input: {}", e);
				return Err(());
			},
		}
		let line = line.trim();
		if line.is_empty() {
			continue;
		}

		match parse_command(line) {
			Ok(ShellCommand::Exit) => break,
			Ok(ShellCommand::Help) => print_help(),
			Ok(ShellCommand::Discover) => run_discover(&mut discovery, &mut session, timeout),
			Ok(ShellCommand::SetBrightness(value)) => report_set(session.set_brightness(value), "Brightness", 31),
			Ok(ShellCommand::SetSpeed(value)) => report_set(session.set_speed(value), "Speed", 100),
			Ok(ShellCommand::SetSingleFile(value)) => report_set(session.set_single_file(value), "Single file playback", 1),
			Err(message) => println!("{}", message),
		}
	}

	Ok(())
}

fn parse_command(line: &str) -> Result<ShellCommand, String> {
	let mut words = line.split_whitespace();
	match words.next() {
		Some("discover") => Ok(ShellCommand::Discover),
		Some("help") => Ok(ShellCommand::Help),
		Some("exit") | Some("quit") => Ok(ShellCommand::Exit),
		Some("set") => {
			let field = words.next();
			let value = words.next();
			let (field, value) = match (field, value) {
				(Some(field), Some(value)) => (field, value),
				_ => return Err("usage: set br|sp|sf <value>".into()),
			};
			let value: u8 = value
				.parse()
				.map_err(|_| format!("invalid value: {:?}, expected a number in the range 0-255", value))?;
			match field {
				"br" => Ok(ShellCommand::SetBrightness(value)),
				"sp" => Ok(ShellCommand::SetSpeed(value)),
				"sf" => Ok(ShellCommand::SetSingleFile(value)),
				other => Err(format!("unknown setting: {:?}, expected br, sp or sf", other)),
			}
		},
		Some(other) => Err(format!("unknown command: {:?}, type \"help\" for the command list", other)),
		None => Err("empty command".into()),
	}
}

fn print_help() {
	println!("Commands:");
	println!("  discover      find the controller and adopt its serial number");
	println!("  set br <0-31>   set brightness");
	println!("  set sp <1-100>  set playback speed");
	println!("  set sf <0-1>    set single-file playback");
	println!("  help          show this list");
	println!("  exit          leave the shell");
}

fn run_discover(discovery: &mut DiscoveryClient, session: &mut CommandSession, timeout: Duration) {
	println!("Searching for the controller...");
	match discovery.discover(timeout) {
		Ok(DiscoveryOutcome::Identified(identity)) => {
			println!(
				"Found {} at {} (serial {:02X?})",
				identity.name, identity.address, identity.serial
			);
			session.adopt_identity(&identity);
		},
		Ok(DiscoveryOutcome::Matched(address)) => {
			println!("A device at {} acknowledged the handshake but did not identify itself.", address);
			println!("Commands stay disabled until a reply with a serial number arrives.");
		},
		Ok(DiscoveryOutcome::NoMatch) => println!("No device found."),
		Err(e) => log::error!("Discovery failed: {}", e),
	}
}

fn report_set(result: Result<u8, CommandError>, what: &str, max: u8) {
	match result {
		Ok(value) => println!("{} set to {}/{}", what, value, max),
		Err(e) => log::error!("Command failed: {}", e),
	}
}

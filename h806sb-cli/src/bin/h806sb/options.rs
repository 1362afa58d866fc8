use clap::Parser;

/// Interactive shell for H806SB LED strip controllers.
///
/// Discovers the controller on the local network over UDP broadcast, then
/// adjusts brightness, playback speed and single-file playback.
#[derive(Parser)]
pub struct Options {
	/// Print more log messages. Can be repeated.
	#[arg(long, short, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// Discovery timeout in seconds.
	#[arg(long, short, default_value = "3", value_name = "SECONDS")]
	pub timeout: u64,
}

pub fn init(root_module: &str, verbosity: i8) {
	use std::io::Write;

	let log_level = match verbosity {
		0 => log::LevelFilter::Info,
		1 => log::LevelFilter::Debug,
		_ => log::LevelFilter::Trace,
	};

	env_logger::Builder::new()
		.format(|buffer, record: &log::Record| {
			use env_logger::fmt::Color;

			let (prefix, color) = match record.level() {
				log::Level::Trace => ("Trace: ", None),
				log::Level::Debug | log::Level::Info => ("", None),
				log::Level::Warn => ("Warning: ", Some(Color::Yellow)),
				log::Level::Error => ("Error: ", Some(Color::Red)),
			};

			let mut prefix_style = buffer.style();
			if let Some(color) = color {
				prefix_style.set_color(color).set_bold(true);
			}
			writeln!(buffer, "{}{}", prefix_style.value(prefix), record.args())
		})
		.filter_level(log::LevelFilter::Warn)
		.filter_module(root_module, log_level)
		.filter_module("h806sb", log_level)
		.init();
}

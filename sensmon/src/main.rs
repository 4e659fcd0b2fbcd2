use clap::{Arg, ArgAction, ArgMatches, Command};
use log::info;
use sensmon_core::{CliConfig, Config, MetricsCollector, MonitorSnapshot, TemperatureUnit, Theme};
use std::fmt::Write as _;
use std::fs::File;
use std::{io::stdout, path::PathBuf, process};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

fn cli() -> Command {
    Command::new("sensmon")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Hardware sensor monitor - hwmon and NVIDIA GPU readings with min/max tracking")
        .arg(
            Arg::new("refresh")
                .long("refresh")
                .value_name("MS")
                .help("Sampling interval in milliseconds (100-10000)")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("theme")
                .long("theme")
                .value_name("THEME")
                .help("UI theme")
                .value_parser(["dark", "light"]),
        )
        .arg(
            Arg::new("no-color")
                .long("no-color")
                .help("Disable colors")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("fahrenheit")
                .long("fahrenheit")
                .help("Show temperatures in °F")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("no-gpu")
                .long("no-gpu")
                .help("Skip the nvidia-smi probe and GPU readings")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("hwmon-root")
                .long("hwmon-root")
                .value_name("PATH")
                .help("Directory holding the hwmonN device containers")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("json-config")
                .long("json-config")
                .value_name("PATH")
                .help("Path to JSON configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("list")
                .long("list")
                .help("Sample once and print every sensor, then exit")
                .action(ArgAction::SetTrue)
                .conflicts_with("json"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Sample once and print the snapshot as JSON, then exit")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Increase log verbosity (-v info, -vv debug, -vvv trace)")
                .action(ArgAction::Count),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .value_name("PATH")
                .help("Write log output to a file instead of stderr")
                .value_parser(clap::value_parser!(PathBuf)),
        )
}

fn cli_config(matches: &ArgMatches) -> CliConfig {
    CliConfig {
        refresh_ms: matches.get_one::<u64>("refresh").copied(),
        theme: matches.get_one::<String>("theme").map(|t| match t.as_str() {
            "light" => Theme::Light,
            _ => Theme::Dark,
        }),
        no_color: matches.get_flag("no-color"),
        temperature_unit: matches
            .get_flag("fahrenheit")
            .then_some(TemperatureUnit::Fahrenheit),
        no_gpu: matches.get_flag("no-gpu"),
        hwmon_root: matches.get_one::<PathBuf>("hwmon-root").cloned(),
    }
}

fn run() -> anyhow::Result<()> {
    let matches = cli().get_matches();

    let one_shot = matches.get_flag("list") || matches.get_flag("json");
    init_logging(
        matches.get_count("verbose"),
        matches.get_one::<PathBuf>("log-file"),
        one_shot,
    )?;

    let json_config_path = matches.get_one::<PathBuf>("json-config");
    let config = Config::load(Some(&cli_config(&matches)), json_config_path)?;

    let mut collector = MetricsCollector::new(&config)?;
    info!("Platform: {}", collector.platform_name());
    collector.init();

    if matches.get_flag("list") {
        print!("{}", format_listing(&collector.snapshot()));
        return Ok(());
    }
    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&collector.snapshot())?);
        return Ok(());
    }

    run_tui(&config, collector)
}

/// Logs go to stderr for one-shot modes; the TUI stays silent unless asked,
/// since stderr shares the screen
fn init_logging(verbose: u8, log_file: Option<&PathBuf>, one_shot: bool) -> anyhow::Result<()> {
    let level = match verbose {
        0 if one_shot || log_file.is_some() => "warn",
        0 => "off",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level));
    if let Some(path) = log_file {
        let file = File::create(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

/// Plain sensor dump: `-{device id} ({display name})` then `label=raw` pairs
fn format_listing(snapshot: &MonitorSnapshot) -> String {
    let mut out = String::new();

    for device in &snapshot.devices {
        let _ = writeln!(out, "-{} ({})", device.id, device.display_name);
        let values: Vec<String> = device
            .sensors
            .iter()
            .map(|sensor| match sensor.metric {
                Some(metric) => format!("{}={}", sensor.label, metric.current()),
                None => format!("{}=--", sensor.label),
            })
            .collect();
        let _ = writeln!(out, "{}", values.join(" "));
    }

    for gpu in &snapshot.gpus {
        let _ = writeln!(out, "-gpu{} ({})", gpu.index, gpu.model);
        let _ = writeln!(
            out,
            "temperature={} power={} graphics_clock={} memory_clock={}",
            gpu.temperature.current(),
            gpu.power.current(),
            gpu.graphics_clock.current(),
            gpu.memory_clock.current()
        );
    }

    let _ = writeln!(out, "{}", snapshot.gpu_status);
    out
}

fn run_tui(config: &Config, collector: MetricsCollector) -> anyhow::Result<()> {
    let mut app = sensmon_tui::App::new(config, collector)?;
    let mut stdout = stdout();
    app.run(&mut stdout)?;
    Ok(())
}

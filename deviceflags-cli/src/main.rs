mod config;

use std::process;

use clap::{Parser, Subcommand};
use deviceflags_lib::{parse_flags, AdbTransport, DeviceFlags, FlagKey, ParsedFlagRecord};
use log::debug;
use regex::Regex;

use config::{DevflagsConfig, ResolvedDevice};

#[derive(Parser, Debug)]
#[command(name = "devflags")]
#[command(version)]
#[command(about = "Read aconfig and device_config flag values from an Android device", long_about = None)]
struct Args {
    /// Device serial (falls back to ANDROID_SERIAL, then devflags.toml)
    #[arg(short = 's', long = "serial", global = true)]
    serial: Option<String>,

    /// Path to the adb binary
    #[arg(long = "adb", global = true)]
    adb: Option<String>,

    /// Path to config file
    #[arg(short = 'c', long = "config", default_value = "devflags.toml", global = true)]
    config: String,

    /// Log device commands to stderr
    #[arg(short = 'v', long = "verbose", global = true)]
    verbose: bool,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve the effective value of a flag
    Get {
        /// Flag namespace (e.g. core_experiments)
        namespace: String,

        /// Flag name: `{package}.{name}` for aconfig flags, the key for device_config flags
        name: String,

        /// Fail unless the value is true or false
        #[arg(short = 'b', long = "bool")]
        as_bool: bool,
    },
    /// List aconfig flags defined on the device
    List {
        /// Only show flags whose `namespace/package.name` matches this regex
        #[arg(short = 'f', long = "filter")]
        filter: Option<String>,

        /// Print JSON instead of one line per flag
        #[arg(long = "json")]
        json: bool,
    },
    /// Parse local aconfig_flags.textproto files
    Validate {
        #[arg(required = true)]
        files: Vec<String>,
    },
}

fn connect(device: &ResolvedDevice) -> DeviceFlags<AdbTransport> {
    let mut builder = deviceflags_lib::init().adb(&device.adb);
    if let Some(serial) = &device.serial {
        builder = builder.serial(serial);
    }
    if let Some(dir) = &device.scratch_dir {
        builder = builder.scratch_dir(dir);
    }
    builder.build()
}

fn run_get(device: &ResolvedDevice, namespace: &str, name: &str, as_bool: bool) {
    let flags = connect(device);
    if as_bool {
        match flags.get_bool(namespace, name) {
            Ok(value) => println!("{}", value),
            Err(e) => {
                eprintln!("{}", e);
                process::exit(1);
            }
        }
        return;
    }
    match flags.get_value(namespace, name) {
        Ok(Some(value)) => println!("{}", value),
        Ok(None) => {
            eprintln!("{}/{} is not set", namespace, name);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    }
}

fn filter_records<'a>(
    records: Vec<(&'a FlagKey, &'a ParsedFlagRecord)>,
    filter: Option<&Regex>,
) -> Vec<(&'a FlagKey, &'a ParsedFlagRecord)> {
    match filter {
        Some(re) => records
            .into_iter()
            .filter(|(key, _)| re.is_match(&key.to_string()))
            .collect(),
        None => records,
    }
}

fn record_line(key: &FlagKey, record: &ParsedFlagRecord) -> String {
    format!("{} {} {}", key, record.state, record.permission)
}

fn record_json(record: &ParsedFlagRecord) -> serde_json::Value {
    serde_json::json!({
        "namespace": record.namespace,
        "package": record.package,
        "name": record.name,
        "state": record.state.to_string(),
        "permission": record.permission.to_string(),
    })
}

fn run_list(device: &ResolvedDevice, filter: Option<&str>, json: bool) {
    let filter = match filter.map(Regex::new).transpose() {
        Ok(re) => re,
        Err(e) => {
            eprintln!("Invalid filter: {}", e);
            process::exit(1);
        }
    };

    let flags = connect(device);
    let snapshot = match flags.snapshot() {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };
    let records = filter_records(snapshot.records(), filter.as_ref());

    if json {
        let values: Vec<serde_json::Value> =
            records.iter().map(|(_, record)| record_json(record)).collect();
        match serde_json::to_string_pretty(&values) {
            Ok(out) => println!("{}", out),
            Err(e) => {
                eprintln!("Failed to serialize flags: {}", e);
                process::exit(1);
            }
        }
    } else {
        for (key, record) in records {
            println!("{}", record_line(key, record));
        }
    }
}

fn run_validate(files: &[String]) {
    for file in files {
        let content = match std::fs::read_to_string(file) {
            Ok(content) => content,
            Err(_) => {
                eprintln!("{} does not exist", file);
                process::exit(1);
            }
        };
        match parse_flags(&content) {
            Ok(records) => println!("✓ {}: {} flags", file, records.len()),
            Err(e) => {
                eprintln!("✗ {}: {}", file, e);
                process::exit(1);
            }
        }
    }
}

fn main() {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let mut config = DevflagsConfig::load(&args.config);
    config.apply_env_overrides();
    let device = config.resolve(args.serial.as_deref(), args.adb.as_deref());
    debug!("device settings: {:?}", device);

    match &args.cmd {
        Command::Get {
            namespace,
            name,
            as_bool,
        } => run_get(&device, namespace, name, *as_bool),
        Command::List { filter, json } => run_list(&device, filter.as_deref(), *json),
        Command::Validate { files } => run_validate(files),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deviceflags_lib::{FlagPermission, FlagState, SnapshotIndex};

    fn index() -> SnapshotIndex {
        let record = |namespace: &str, name: &str, state, permission| ParsedFlagRecord {
            namespace: namespace.into(),
            package: "com.android.foo".into(),
            name: name.into(),
            state,
            permission,
        };
        vec![
            record("core", "alpha", FlagState::Enabled, FlagPermission::ReadOnly),
            record("core", "beta", FlagState::Disabled, FlagPermission::ReadWrite),
            record("ui", "alpha", FlagState::Enabled, FlagPermission::ReadWrite),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_args_parse() {
        let args = Args::parse_from(["devflags", "-s", "DEV1", "get", "core", "com.android.foo.alpha", "--bool"]);
        assert_eq!(args.serial.as_deref(), Some("DEV1"));
        assert!(matches!(
            args.cmd,
            Command::Get { ref namespace, as_bool: true, .. } if namespace == "core"
        ));
    }

    #[test]
    fn test_filter_records() {
        let index = index();
        let re = Regex::new("^core/.*alpha$").unwrap();
        let matched = filter_records(index.records(), Some(&re));
        assert_eq!(matched.len(), 1);
        assert_eq!(matched[0].0.to_string(), "core/com.android.foo.alpha");

        assert_eq!(filter_records(index.records(), None).len(), 3);
    }

    #[test]
    fn test_record_output() {
        let index = index();
        let records = index.records();
        let (key, record) = records[1];
        assert_eq!(
            record_line(key, record),
            "core/com.android.foo.beta DISABLED READ_WRITE"
        );
        assert_eq!(record_json(record)["state"], "DISABLED");
        assert_eq!(record_json(record)["package"], "com.android.foo");
    }
}

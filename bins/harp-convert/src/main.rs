use clap::Parser;
use harp_common::{ConvertConfig, Culture, TargetType, Value};

#[derive(Parser)]
#[command(name = "harp-convert", about = "Convert text values to a target type")]
struct Cli {
    /// Target type: a scalar (`int32`, `float64`, `bool`, ...), `datetime`,
    /// or `enum:<Name>` for an enum declared in the config. A trailing `?`
    /// makes it optional.
    #[arg(long)]
    to: String,

    /// Culture for date patterns (overrides the config file).
    #[arg(long)]
    culture: Option<String>,

    /// Use the locale from LC_ALL / LC_TIME / LANG.
    #[arg(long, conflicts_with = "culture")]
    env_locale: bool,

    /// Path to TOML configuration file.
    #[arg(long, env = "HARP_CONFIG")]
    config: Option<String>,

    /// Fail on the first value that does not convert.
    #[arg(long)]
    strict: bool,

    /// Values to convert.
    #[arg(required = true)]
    values: Vec<String>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match ConvertConfig::load(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "failed to load config");
                std::process::exit(1);
            }
        },
        None => ConvertConfig::default(),
    };
    if cli.culture.is_some() {
        config.culture = cli.culture.clone();
    }

    let converter = if cli.env_locale {
        let culture = Culture::from_env();
        tracing::info!(culture = culture.name(), "using culture from environment");
        harp_common::Converter::new(culture)
    } else {
        match config.converter() {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "invalid culture configuration");
                std::process::exit(1);
            }
        }
    };

    let target = match parse_target(&cli.to, &config) {
        Ok(t) => t,
        Err(e) => {
            tracing::error!(to = %cli.to, error = %e, "invalid target type");
            std::process::exit(2);
        }
    };

    for input in &cli.values {
        let value = Value::from(input.as_str());
        let outcome = if cli.strict {
            match converter.convert(&value, &target) {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::error!(input = %input, target = %target, error = %e, "conversion failed");
                    std::process::exit(1);
                }
            }
        } else {
            converter.try_convert(&value, &target)
        };

        let line = serde_json::json!({
            "input": input,
            "success": outcome.is_some(),
            "value": outcome.unwrap_or(Value::Null),
        });
        println!("{line}");
    }
}

/// `enum:<Name>[?]` resolves against the config, everything else parses directly.
fn parse_target(arg: &str, config: &ConvertConfig) -> Result<TargetType, String> {
    let (base, optional) = match arg.trim().strip_suffix('?') {
        Some(base) => (base, true),
        None => (arg.trim(), false),
    };

    let target = match base.strip_prefix("enum:") {
        Some(name) => config
            .enum_type(name)
            .map(TargetType::Enum)
            .ok_or_else(|| format!("enum {name:?} is not declared in the config"))?,
        None => base.parse::<TargetType>().map_err(|e| e.to_string())?,
    };

    Ok(if optional { TargetType::optional(target) } else { target })
}

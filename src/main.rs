use anyhow::Context;
use clap::Parser;
use http::{HeaderMap, Method};
use rest_autoconfig::{
    HttpMessageConverters, Payload, PayloadKind, RestClientProperties, TransportPreference,
    WebClientAutoConfiguration, logging,
};

#[derive(Parser, Debug)]
#[command(name = "rest-autoconfig")]
#[command(about = "Send one request through an autoconfigured rest client")]
struct CliArgs {
    /// Target URL
    url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    method: String,

    /// Request body; sent as JSON when it parses as JSON, as text otherwise
    #[arg(short, long)]
    data: Option<String>,

    /// Transport to use
    #[arg(long, value_enum, default_value_t = TransportPreference::Auto)]
    transport: TransportPreference,

    /// Connect timeout in seconds
    #[arg(long)]
    connect_timeout: Option<u64>,

    /// Overall request timeout in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: log::LevelFilter,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    logging::init_logging(args.log_level);

    let properties = RestClientProperties {
        transport: args.transport,
        connect_timeout_secs: args.connect_timeout,
        read_timeout_secs: Some(args.timeout),
    };
    let autoconfig = WebClientAutoConfiguration::new(properties);
    let builder = autoconfig
        .rest_client_builder(None, Some(&HttpMessageConverters::default()))
        .context("Failed to assemble rest client")?;
    let client = builder.build();

    let method: Method = args
        .method
        .to_uppercase()
        .parse()
        .with_context(|| format!("Invalid method {}", args.method))?;
    let body = args.data.map(|data| match serde_json::from_str(&data) {
        Ok(value) => Payload::Json(value),
        Err(_) => Payload::Text(data),
    });

    let response = client
        .exchange(method, &args.url, body, HeaderMap::new(), PayloadKind::Text)
        .await
        .with_context(|| format!("Request to {} failed", args.url))?;

    println!("{}", response.status);
    if let Some(Payload::Text(text)) = response.body {
        println!("{}", text);
    }
    Ok(())
}

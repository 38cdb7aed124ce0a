use clap::{Args, Parser, Subcommand, ValueEnum};
use env_api::prelude::*;
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser)]
#[command(name = "envctl")]
#[command(about = "Manage deployment environments over the REST API")]
struct Cli {
    /// Base URL of the deployment service
    #[arg(long, env = "ENVCTL_BASE_URL", default_value = "http://127.0.0.1:9099")]
    base_url: String,
    /// Bearer token sent with every request
    #[arg(long, env = "ENVCTL_TOKEN")]
    token: Option<String>,
    /// Request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout_secs: u64,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List environments
    List(FilterArgs),
    /// Show one environment
    Get { env_id: String },
    /// Create an environment
    Add(PayloadArgs),
    /// Update an environment (the payload must contain envId)
    Update(PayloadArgs),
    /// Delete one or more environments
    Delete {
        #[arg(required = true)]
        env_ids: Vec<String>,
    },
    /// Export environments to a spreadsheet
    Export {
        #[arg(short, long)]
        output: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    #[arg(long)]
    env_code: Option<String>,
    #[arg(long)]
    env_name: Option<String>,
    #[arg(long, value_enum)]
    status: Option<StatusArg>,
    /// Lower bound of the creation time window
    #[arg(long, requires = "end_time")]
    begin_time: Option<String>,
    /// Upper bound of the creation time window
    #[arg(long, requires = "begin_time")]
    end_time: Option<String>,
    #[arg(long, default_value = "1")]
    page_num: u32,
    #[arg(long, default_value = "10")]
    page_size: u32,
}

impl From<FilterArgs> for EnvironmentQuery {
    fn from(filter: FilterArgs) -> Self {
        EnvironmentQuery {
            env_code: filter.env_code,
            env_name: filter.env_name,
            status: filter.status.map(EnvStatus::from),
            begin_time: filter.begin_time,
            end_time: filter.end_time,
            page_num: filter.page_num,
            page_size: filter.page_size,
        }
    }
}

#[derive(Args)]
struct PayloadArgs {
    /// Inline JSON record
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    data: Option<String>,
    /// Path to a JSON record
    #[arg(long)]
    file: Option<PathBuf>,
    /// Send the record without client-side field checks
    #[arg(long)]
    skip_validation: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum StatusArg {
    #[value(name = "0")]
    Normal,
    #[value(name = "1")]
    Disabled,
}

impl From<StatusArg> for EnvStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Normal => EnvStatus::Normal,
            StatusArg::Disabled => EnvStatus::Disabled,
        }
    }
}

impl Cli {
    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new()
            .with_base_url(self.base_url.clone())
            .with_timeout(Duration::from_secs(self.timeout_secs));
        if let Some(token) = &self.token {
            config = config.with_token(token.clone());
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let executor = HttpExecutor::new(cli.client_config())?;
    let api = EnvironmentApi::new(executor);

    run(&api, cli.command).await
}

async fn run<E: RequestExecutor>(
    api: &EnvironmentApi<E>,
    command: Commands,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::List(filter) => {
            let query = EnvironmentQuery::from(filter);
            print_json(&api.list_env(&query).await?)?;
        }
        Commands::Get { env_id } => {
            print_json(&api.get_env(env_id).await?)?;
        }
        Commands::Add(args) => {
            let record = load_payload(&args)?;
            print_json(&api.add_env(&record).await?)?;
        }
        Commands::Update(args) => {
            let record = load_payload(&args)?;
            print_json(&api.update_env(&record).await?)?;
        }
        Commands::Delete { env_ids } => {
            print_json(&api.del_envs(env_ids.as_slice()).await?)?;
        }
        Commands::Export { output, filter } => {
            let query = EnvironmentQuery::from(filter);
            let bytes = api.export_env(&query).await?;
            std::fs::write(&output, &bytes)?;
            info!("Wrote {} bytes to {}", bytes.len(), output.display());
        }
    }

    Ok(())
}

fn load_payload(args: &PayloadArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let raw = match (&args.data, &args.file) {
        (Some(data), _) => data.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)?,
        (None, None) => return Err("either --data or --file is required".into()),
    };

    let record: Value = serde_json::from_str(&raw)?;
    if !args.skip_validation {
        let env: Environment = serde_json::from_value(record.clone())?;
        env.validate()?;
    }

    Ok(record)
}

fn print_json(value: &Value) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use clap::CommandFactory;
    use std::io::Write;
    use std::sync::Mutex;

    /// Records descriptors without touching the network.
    #[derive(Default)]
    struct Recorder {
        requests: Mutex<Vec<RequestDescriptor>>,
    }

    #[async_trait]
    impl RequestExecutor for Recorder {
        async fn execute(&self, request: RequestDescriptor) -> ApiResult<Value> {
            self.requests.lock().unwrap().push(request);
            Ok(serde_json::json!({ "code": 200 }))
        }

        async fn download(&self, request: RequestDescriptor) -> ApiResult<Vec<u8>> {
            self.requests.lock().unwrap().push(request);
            Ok(vec![1, 2, 3])
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_list_with_filters() {
        let cli = Cli::try_parse_from([
            "envctl",
            "--base-url",
            "http://deploy.local",
            "list",
            "--env-code",
            "prod",
            "--status",
            "1",
            "--page-size",
            "50",
        ])
        .unwrap();

        assert_eq!(cli.base_url, "http://deploy.local");
        match cli.command {
            Commands::List(filter) => {
                let query = EnvironmentQuery::from(filter);
                assert_eq!(query.env_code.as_deref(), Some("prod"));
                assert_eq!(query.status, Some(EnvStatus::Disabled));
                assert_eq!(query.page_num, 1);
                assert_eq!(query.page_size, 50);
            }
            _ => panic!("expected list command"),
        }
    }

    #[test]
    fn test_payload_requires_data_or_file() {
        assert!(Cli::try_parse_from(["envctl", "add"]).is_err());
        assert!(
            Cli::try_parse_from(["envctl", "add", "--data", "{}", "--file", "x.json"]).is_err()
        );
        assert!(Cli::try_parse_from(["envctl", "delete"]).is_err());
    }

    #[test]
    fn test_client_config_from_flags() {
        let cli = Cli::try_parse_from([
            "envctl",
            "--token",
            "t0k",
            "--timeout-secs",
            "3",
            "get",
            "1",
        ])
        .unwrap();

        let config = cli.client_config();
        assert_eq!(config.token.as_deref(), Some("t0k"));
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_payload_validates_unless_skipped() {
        let args = PayloadArgs {
            data: Some(r#"{"envCode":"","envName":"QA","envSort":1}"#.to_string()),
            file: None,
            skip_validation: false,
        };
        assert!(load_payload(&args).is_err());

        let args = PayloadArgs {
            skip_validation: true,
            ..args
        };
        let record = load_payload(&args).unwrap();
        assert_eq!(record["envName"], "QA");
    }

    #[test]
    fn test_load_payload_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"envId":5,"envCode":"qa","envName":"QA","envSort":2}}"#).unwrap();

        let args = PayloadArgs {
            data: None,
            file: Some(file.path().to_path_buf()),
            skip_validation: false,
        };
        let record = load_payload(&args).unwrap();
        assert_eq!(record["envId"], 5);
    }

    #[tokio::test]
    async fn test_run_delete_joins_ids() {
        let api = EnvironmentApi::new(Recorder::default());
        let command = Commands::Delete {
            env_ids: vec!["3".to_string(), "4".to_string()],
        };

        run(&api, command).await.unwrap();

        let requests = api.executor().requests.lock().unwrap().clone();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, Method::Delete);
        assert_eq!(requests[0].url, "/deployment/environment/3%2C4");
    }

    #[tokio::test]
    async fn test_run_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("environments.xlsx");
        let output_arg = output.to_str().unwrap();
        let cli = Cli::try_parse_from([
            "envctl",
            "export",
            "--output",
            output_arg,
            "--env-code",
            "prod",
            "--status",
            "0",
            "--begin-time",
            "2024-01-01",
            "--end-time",
            "2024-06-30",
        ])
        .unwrap();
        let api = EnvironmentApi::new(Recorder::default());

        run(&api, cli.command).await.unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), vec![1, 2, 3]);
        let requests = api.executor().requests.lock().unwrap().clone();
        assert_eq!(requests[0].url, "/deployment/environment/export");
        assert_eq!(
            requests[0].data,
            Some(Body::Form(serde_json::json!({
                "envCode": "prod",
                "status": "0",
                "beginTime": "2024-01-01",
                "endTime": "2024-06-30",
                "pageNum": 1,
                "pageSize": 10,
            })))
        );
    }

    #[test]
    fn test_time_window_needs_both_bounds() {
        assert!(
            Cli::try_parse_from(["envctl", "list", "--begin-time", "2024-01-01"]).is_err()
        );
    }
}

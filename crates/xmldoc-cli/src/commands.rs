use std::io::Write;
use std::path::Path;

use anyhow::Context;
use colored::Colorize;
use xmldoc_server::{ServerConfig, XmlDocServer};
use xmldoc_service::XmlStorage;
use xmldoc_types::DocumentMetadata;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref(), cli.root)?;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Init => cmd_init(&config),
        Command::Add(args) => cmd_add(&config, args),
        Command::Get(args) => cmd_get(&config, args),
        Command::List(args) => cmd_list(&config, args),
    }
}

/// Configuration file values, then command-line overrides.
fn load_config(
    path: Option<&Path>,
    root: Option<std::path::PathBuf>,
) -> anyhow::Result<ServerConfig> {
    let mut config = match path {
        Some(path) => ServerConfig::from_toml_file(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(root) = root {
        config.storage.location = root;
    }
    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn open_storage(config: &ServerConfig) -> anyhow::Result<XmlStorage> {
    config.open_storage().with_context(|| {
        format!(
            "opening storage at {}",
            config.storage.location.display()
        )
    })
}

fn cmd_serve(mut config: ServerConfig, args: ServeArgs) -> anyhow::Result<()> {
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    println!(
        "xmldoc server on {} (root: {})",
        config.bind_addr.to_string().bold(),
        config.storage.location.display()
    );
    let server = XmlDocServer::new(config).context("starting server")?;
    let runtime = tokio::runtime::Runtime::new().context("creating async runtime")?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_init(config: &ServerConfig) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    println!(
        "{} Initialized storage in {}",
        "✓".green().bold(),
        storage.root().display().to_string().bold()
    );
    Ok(())
}

fn cmd_add(config: &ServerConfig, args: AddArgs) -> anyhow::Result<()> {
    let content = std::fs::read(&args.file)
        .with_context(|| format!("reading {}", args.file.display()))?;
    let name = match args.name {
        Some(name) => name,
        None => args
            .file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .with_context(|| format!("{} has no file name", args.file.display()))?,
    };

    let storage = open_storage(config)?;
    match storage.store(&content, &name, &args.note) {
        Ok(record) => {
            println!("{} Stored {}", "✓".green().bold(), record.filename.yellow());
            println!("  Id: {}", record.id.to_string().cyan());
            println!("  Size: {} bytes", record.size);
            println!("  Note: {}", record.note);
            Ok(())
        }
        Err(err) => {
            if let Some(rejection) = err.rejection() {
                eprintln!("{} {} ({})", "✗".red().bold(), rejection, rejection.kind());
            }
            Err(err).with_context(|| format!("storing {name}"))
        }
    }
}

fn cmd_get(config: &ServerConfig, args: GetArgs) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let resource = storage
        .load(&args.name)
        .with_context(|| format!("loading {}", args.name))?;
    let bytes = resource
        .read_bytes()
        .with_context(|| format!("reading {}", resource.path().display()))?;

    match args.output {
        Some(out) => {
            std::fs::write(&out, &bytes)
                .with_context(|| format!("writing {}", out.display()))?;
            eprintln!(
                "{} Wrote {} ({} bytes) to {}",
                "✓".green().bold(),
                resource.filename().yellow(),
                bytes.len(),
                out.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&bytes).context("writing to stdout")?;
            stdout.flush()?;
        }
    }
    Ok(())
}

fn cmd_list(config: &ServerConfig, args: ListArgs) -> anyhow::Result<()> {
    let storage = open_storage(config)?;
    let records = storage.list_files().context("listing documents")?;
    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
        OutputFormat::Text => print_records(&records),
    }
    Ok(())
}

fn print_records(records: &[DocumentMetadata]) {
    if records.is_empty() {
        println!("No documents stored.");
        return;
    }
    for record in records {
        println!(
            "{:>4}  {}  {}  {}",
            record.id.to_string().yellow(),
            record.filename.bold(),
            format!("{} bytes", record.size).dimmed(),
            record.note
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn root_flag_overrides_config_file() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("xmldoc.toml");
        std::fs::write(&file, "[storage]\nlocation = \"from-file\"\n").unwrap();

        let config = load_config(Some(&file), None).unwrap();
        assert_eq!(config.storage.location, PathBuf::from("from-file"));

        let config = load_config(Some(&file), Some(PathBuf::from("from-flag"))).unwrap();
        assert_eq!(config.storage.location, PathBuf::from("from-flag"));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        assert!(load_config(Some(&dir.path().join("absent.toml")), None).is_err());
    }
}

//! # bindfig demo application
//!
//! A sample CLI tool binding [`DemoConfig`](config::DemoConfig) from every
//! layer. It exists to manually verify bindfig's behavior.
//!
//! ## Running
//!
//! ```sh
//! cargo run --example bindfig_demo -- --server.root=/srv
//! cargo run --example bindfig_demo -- --help
//! ```
//!
//! ## Features demonstrated
//!
//! | Feature               | How to exercise it                                                        |
//! |-----------------------|---------------------------------------------------------------------------|
//! | Annotation defaults   | `cargo run --example bindfig_demo -- --server.root=/srv`                  |
//! | Required entry        | `cargo run --example bindfig_demo` (fails: `server.root` is missing)      |
//! | Config file (cwd)     | Create `bindfig-demo.toml` in cwd with `[server]` / `root = "/srv"`       |
//! | Explicit config file  | `--config-file=./other.toml` or `BINDFIG_DEMO_CONFIG_FILE=./other.toml`   |
//! | Env var               | `BINDFIG_DEMO_SERVER_PORT=9999 cargo run --example bindfig_demo -- ...`   |
//! | Bare bool flag        | `... -- --server.root=/srv --verbose`                                     |
//! | Comma list            | `... -- --server.root=/srv --levels=debug,info`                           |
//! | List of structures    | `... -- --server.root=/srv --secrets="[{'name':'db','key':'k1'}]"`        |
//! | Help from annotations | `cargo run --example bindfig_demo -- --help`                              |

mod config;

use bindfig::{BindError, Binder, Provider, SearchPath};

use config::DemoConfig;

fn builder() -> bindfig::BinderBuilder<DemoConfig> {
    Binder::builder::<DemoConfig>()
        .app_name("bindfig-demo")
        .search_paths(vec![SearchPath::Platform, SearchPath::Cwd])
        .args(std::env::args_os().skip(1))
}

fn run() -> Result<(), BindError> {
    let cfg = builder().load()?;

    println!("Hello, {}!", cfg.name);
    println!(
        "Serving {} on {}:{} (timeout {:?})",
        cfg.server.root.display(),
        cfg.server.host,
        cfg.server.port,
        cfg.timeout
    );
    println!("Levels: {}", cfg.levels.join(", "));
    for secret in &cfg.secrets {
        println!("Secret {} -> {}", secret.name, secret.key);
    }

    if cfg.verbose {
        let (entries, provider) = builder().provider()?;
        for entry in &entries {
            let value = provider
                .get(&entry.name)
                .map(|v| v.to_string())
                .unwrap_or_else(|| "<unset>".into());
            let source = provider
                .source(&entry.name)
                .map(|s| format!("{s:?}"))
                .unwrap_or_default();
            println!("  {:<14} = {value:<24} {source}", entry.name);
        }
    }
    Ok(())
}

fn main() {
    if let Err(err) = run() {
        if let BindError::Cli(clap_err) = err {
            clap_err.exit();
        }
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

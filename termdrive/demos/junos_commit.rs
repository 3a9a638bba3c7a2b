//! JUNOS commit walkthrough
//!
//! Connects to a JUNOS device, validates the candidate with `commit check`,
//! then optionally commits a host-name change with automatic rollback.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example junos_commit -- --host 192.168.1.1 --user admin --password secret
//! ```
//!
//! Apply a change (rolled back after 5 minutes unless confirmed):
//! ```bash
//! cargo run --example junos_commit -- --host router1 --user admin --key ~/.ssh/id_rsa --hostname edge-1
//! ```

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use termdrive::{CommitOptions, SessionBuilder};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    println!("Connecting to {}:{}...", args.host, args.port);

    let mut builder = SessionBuilder::new(&args.host)
        .port(args.port)
        .username(&args.user)
        .platform("juniper_junos")
        .delay_factor(args.delay_factor)
        .timeout(Duration::from_secs(args.timeout));

    if let Some(password) = &args.password {
        builder = builder.password(password);
    } else if let Some(key_path) = &args.key {
        builder = builder.private_key(key_path);
    } else {
        eprintln!("Error: Must provide either --password or --key");
        std::process::exit(1);
    }

    let mut session = builder.connect().await?;
    println!("Primed, base prompt: {}\n", session.base_prompt());

    let response = session.send_command("show system uptime", None).await?;
    println!("{}\n", response);

    let check = session.commit(CommitOptions::new().check()).await?;
    println!("commit check:\n{}\n", check);

    if let Some(hostname) = &args.hostname {
        session
            .send_command(&format!("set system host-name {}", hostname), None)
            .await?;

        let options = CommitOptions::new()
            .confirmed(Some(5))
            .with_comment("termdrive demo")
            .and_quit();
        match session.commit(options).await {
            Ok(result) => println!("Committed, confirm within 5 minutes:\n{}", result),
            Err(e) => {
                eprintln!("Commit failed: {}", e);
                if let Some(output) = e.output() {
                    eprintln!("{}", output);
                }
            }
        }
    }

    session.close().await?;
    println!("Done!");
    Ok(())
}

/// Simple argument parser
struct Args {
    host: String,
    port: u16,
    user: String,
    password: Option<String>,
    key: Option<PathBuf>,
    timeout: u64,
    delay_factor: f64,
    hostname: Option<String>,
}

impl Args {
    fn parse() -> Self {
        let mut parsed = Self {
            host: "localhost".to_string(),
            port: 22,
            user: env::var("USER").unwrap_or_else(|_| "admin".to_string()),
            password: None,
            key: None,
            timeout: 30,
            delay_factor: 1.0,
            hostname: None,
        };

        let mut args = env::args().skip(1);
        while let Some(flag) = args.next() {
            let mut value = || args.next().unwrap_or_default();
            match flag.as_str() {
                "--host" | "-h" => parsed.host = value(),
                "--port" | "-p" => parsed.port = value().parse().unwrap_or(22),
                "--user" | "-u" => parsed.user = value(),
                "--password" | "-P" => parsed.password = Some(value()),
                "--key" | "-k" => parsed.key = Some(PathBuf::from(value())),
                "--timeout" | "-t" => parsed.timeout = value().parse().unwrap_or(30),
                "--delay-factor" | "-d" => parsed.delay_factor = value().parse().unwrap_or(1.0),
                "--hostname" => parsed.hostname = Some(value()),
                "--help" => {
                    println!(
                        "USAGE: cargo run --example junos_commit -- --host <HOST> --user <USER> \
                         (--password <PASS> | --key <PATH>) [--hostname <NAME>] \
                         [--timeout <SECS>] [--delay-factor <F>]"
                    );
                    std::process::exit(0);
                }
                _ => {}
            }
        }

        parsed
    }
}

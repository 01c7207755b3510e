//! Terminal front-end: fetch trends, pick one, print the generated text.
//!
//! Usage: trendcast-cli [--mode <id>] [--pick <rank>] [--api-key <key>]
//!
//! Without `--pick` the list is printed and a rank is read from stdin.

use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Context, Result};
use trendcast::generate::mode::Mode;
use trendcast::{AppConfig, Generator, TrendService};

#[derive(Debug, Default)]
struct Args {
    mode: Mode,
    pick: Option<u32>,
    api_key: Option<String>,
}

fn parse_args(mut it: impl Iterator<Item = String>) -> Result<Args> {
    let mut args = Args::default();
    while let Some(flag) = it.next() {
        let mut value = || it.next().ok_or_else(|| anyhow!("{flag} needs a value"));
        match flag.as_str() {
            "--mode" => {
                let v = value()?;
                args.mode = Mode::parse(&v).ok_or_else(|| anyhow!("unknown mode {v:?}"))?;
            }
            "--pick" => args.pick = Some(value()?.parse().context("--pick expects a rank")?),
            "--api-key" => args.api_key = Some(value()?),
            other => bail!("unknown argument {other:?}"),
        }
    }
    Ok(args)
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();
    trendcast::init_tracing();

    let args = parse_args(std::env::args().skip(1))?;
    let cfg = AppConfig::load_default()?;
    let trends = TrendService::from_config(&cfg.trends)?;
    let generator = Generator::from_config(&cfg.generator, None)?;

    let listing = trends.listing(false).await;
    if listing.items.is_empty() {
        println!("{}", listing.notice.as_deref().unwrap_or(trendcast::trends::NO_TRENDS_NOTICE));
        return Ok(());
    }
    for it in &listing.items {
        match &it.metric {
            Some(m) => println!("{:>2}. {} ({m})", it.rank, it.title),
            None => println!("{:>2}. {}", it.rank, it.title),
        }
    }

    let rank = match args.pick {
        Some(r) => r,
        None => {
            print!("rank> ");
            io::stdout().flush()?;
            let mut line = String::new();
            io::stdin().lock().read_line(&mut line)?;
            line.trim().parse().context("expected a rank number")?
        }
    };
    let item = trends
        .cached_item(rank)
        .ok_or_else(|| anyhow!("no trend with rank {rank}"))?;

    println!(
        "\n「{}」 / {} ({})\n",
        item.title,
        args.mode.label(),
        generator.provider_name()
    );
    let out = generator
        .generate_with_key(&item.title, args.mode, args.api_key.as_deref())
        .await;
    println!("{out}");
    Ok(())
}

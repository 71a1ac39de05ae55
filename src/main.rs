use rt2_tokenizer::api_server::start_server;
use rt2_tokenizer::codec::workspace::MotionKind;
use rt2_tokenizer::codec::{breakdown, decode, encode, ContinuousAction, TOKEN_COUNT};
use rt2_tokenizer::core::state::{Rt2Config, RT2_DIR};
use rt2_tokenizer::io::console::{format_breakdown, format_tokens, Console, ConsoleEvent};
use rt2_tokenizer::planner::{plan_pick, plan_place};
use rt2_tokenizer::store::ExampleStore;

use anyhow::{anyhow, bail, Context, Result};
use colored::*;
use std::env;
use std::fs;
use std::path::Path;

const USAGE: &str = "\
rt2tok - 8D robot action tokenizer

USAGE:
    rt2tok init
    rt2tok encode <terminate> <x> <y> <z> <rx> <ry> <rz> <gripper>
    rt2tok decode <t0> <t1> <t2> <t3> <t4> <t5> <t6> <t7>
    rt2tok table  <terminate> <x> <y> <z> <rx> <ry> <rz> <gripper>
    rt2tok plan   pick|place <x> <y> <z> [--final]
    rt2tok workspace pick|place <x> <y> <z> [yaw_rad]
    rt2tok history [limit]
    rt2tok serve [--port N]";

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        Console::emit(ConsoleEvent::Error(format!("{:#}", e)));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    dotenvy::from_filename(".env").ok();
    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        println!("{}", USAGE);
        return Ok(());
    };
    let rest = &args[1..];

    match command.as_str() {
        "init" => init_workspace(),
        "encode" => cmd_encode(rest),
        "decode" => cmd_decode(rest),
        "table" => cmd_table(rest),
        "plan" => cmd_plan(rest),
        "workspace" => cmd_workspace(rest),
        "history" => cmd_history(rest).await,
        "serve" => cmd_serve(rest).await,
        "help" | "--help" | "-h" => {
            println!("{}", USAGE);
            Ok(())
        }
        other => bail!("Unknown command '{}'\n\n{}", other, USAGE),
    }
}

fn parse_floats(args: &[String]) -> Result<Vec<f64>> {
    args.iter()
        .map(|a| {
            a.parse::<f64>()
                .with_context(|| format!("'{}' is not a number", a))
        })
        .collect()
}

fn parse_action(args: &[String]) -> Result<ContinuousAction> {
    let values = parse_floats(args)?;
    let values: [f64; TOKEN_COUNT] = values.try_into().map_err(|v: Vec<f64>| {
        anyhow!("expected {} values, got {}", TOKEN_COUNT, v.len())
    })?;
    Ok(ContinuousAction::from_array(values))
}

fn parse_motion(arg: Option<&String>) -> Result<MotionKind> {
    match arg.map(|s| s.as_str()) {
        Some("pick") => Ok(MotionKind::Pick),
        Some("place") => Ok(MotionKind::Place),
        Some(other) => bail!("Unknown motion '{}', expected pick or place", other),
        None => bail!("Missing motion, expected pick or place"),
    }
}

fn parse_position(args: &[String]) -> Result<[f64; 3]> {
    let values = parse_floats(args)?;
    values
        .try_into()
        .map_err(|v: Vec<f64>| anyhow!("expected x y z, got {} values", v.len()))
}

fn cmd_encode(args: &[String]) -> Result<()> {
    let action = parse_action(args)?;
    let encoded = encode(&action)?;
    println!("{} {}", "🎮 Action:".cyan(), action);
    println!("{} {}", "📝 Tokens:".green(), format_tokens(&encoded.tokens));
    println!("{}", serde_json::to_string(&encoded)?);
    Ok(())
}

fn cmd_decode(args: &[String]) -> Result<()> {
    let tokens = args
        .iter()
        .map(|a| {
            a.parse::<i64>()
                .with_context(|| format!("'{}' is not an integer", a))
        })
        .collect::<Result<Vec<i64>>>()?;
    let decoded = decode(&tokens)?;
    println!("{} {}", "🎮 Action:".cyan(), decoded.action);
    println!("{}", serde_json::to_string(&decoded)?);
    Ok(())
}

fn cmd_table(args: &[String]) -> Result<()> {
    let action = parse_action(args)?;
    let rows = breakdown(&action)?;
    print!("{}", format_breakdown(&rows));
    Ok(())
}

fn cmd_plan(args: &[String]) -> Result<()> {
    let kind = parse_motion(args.first())?;
    let is_final = args.iter().any(|a| a == "--final");
    let coords: Vec<String> = args[1..]
        .iter()
        .filter(|a| *a != "--final")
        .cloned()
        .collect();
    let pos = parse_position(&coords)?;

    let steps = match kind {
        MotionKind::Pick => plan_pick(pos, is_final),
        MotionKind::Place => plan_place(pos, is_final),
    };
    println!("{} {}", "🎮 8D ACTION VECTORS".cyan().bold(), kind.label());
    for (i, step) in steps.iter().enumerate() {
        let encoded = encode(step)?;
        println!("   Step {}: {}  {}", i + 1, step, format_tokens(&encoded.tokens));
        if step.terminate != 0.0 {
            println!("   {}", "--- Stream Terminated ---".yellow());
        }
    }
    Ok(())
}

fn cmd_workspace(args: &[String]) -> Result<()> {
    let kind = parse_motion(args.first())?;
    let values = parse_floats(&args[1..])?;
    let (pos, yaw) = match values.as_slice() {
        [x, y, z] => ([*x, *y, *z], 0.0),
        [x, y, z, yaw] => ([*x, *y, *z], *yaw),
        _ => bail!("expected x y z [yaw], got {} values", values.len()),
    };
    let config = Rt2Config::load(&Rt2Config::config_path())?;
    let tokens = config.workspace_tokenizer()?.action_to_tokens(kind, pos, yaw)?;
    println!("{} {}", "📝 ACTION TOKENS:".green(), tokens.join(" "));
    Ok(())
}

async fn cmd_history(args: &[String]) -> Result<()> {
    let limit = match args.first() {
        Some(n) => n.parse().with_context(|| format!("'{}' is not a count", n))?,
        None => 20,
    };
    let config = Rt2Config::load(&Rt2Config::config_path())?;
    let store = config.open_store().await?;
    let entries = store.list(limit).await?;
    if entries.is_empty() {
        println!("{} No tokenized examples recorded.", "📭".yellow());
        return Ok(());
    }
    for entry in entries {
        println!(
            "{} {} {}  {}",
            entry.example.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.id.to_string().dimmed(),
            format_tokens(&entry.example.tokens),
            entry.example.action
        );
    }
    Ok(())
}

async fn cmd_serve(args: &[String]) -> Result<()> {
    let mut config = Rt2Config::load(&Rt2Config::config_path())?;
    if let Some(pos) = args.iter().position(|a| a == "--port") {
        let port = args
            .get(pos + 1)
            .ok_or_else(|| anyhow!("--port needs a value"))?;
        config.port = port
            .parse()
            .with_context(|| format!("'{}' is not a port", port))?;
    }
    start_server(config).await
}

fn init_workspace() -> Result<()> {
    let dir = Path::new(RT2_DIR);
    let config_path = Rt2Config::config_path();
    if config_path.exists() {
        println!("{}", "✅ rt2tok is already initialised here.".green());
        return Ok(());
    }
    fs::create_dir_all(dir)?;
    let toml = toml::to_string_pretty(&Rt2Config::default())?;
    fs::write(&config_path, toml)?;

    let gitignore_path = Path::new(".gitignore");
    let mut gitignore = if gitignore_path.exists() {
        fs::read_to_string(gitignore_path)?
    } else {
        String::new()
    };
    if !gitignore.contains(RT2_DIR) {
        gitignore.push_str(&format!("\n# rt2tok data\n{}/\n", RT2_DIR));
        fs::write(gitignore_path, gitignore)?;
    }
    println!(
        "{} {}",
        "🧬 Wrote".green().bold(),
        config_path.display()
    );
    Ok(())
}

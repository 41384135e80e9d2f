use std::collections::HashMap;

use anyhow::{anyhow, Context};
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

/// Demonstration expressions, run when no expression is given.
const DEMO: &[(&str, &[(&str, f64)])] = &[
    ("4 ^ 2 ^ -1", &[]),
    ("2 + 3 * x", &[("x", 25.0)]),
    ("x ^ y", &[("x", 2.0), ("y", 3.0)]),
];

#[derive(Parser)]
#[command(version, about = "Compile and evaluate an arithmetic expression")]
struct Cli {
    /// expression, e.g. "2 + 3 * x"
    expression: Option<String>,

    /// variable binding; in positional mode the order declares the parameters
    #[arg(short, long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, f64)>,

    /// resolve variables by name at call time
    #[arg(long)]
    named: bool,

    /// print the compiled bytecode
    #[arg(long)]
    dump: bool,
}

fn parse_var(s: &str) -> Result<(String, f64), String> {
    let (name, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got `{s}`"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for `{name}`: {e}"))?;
    Ok((name.trim().to_owned(), value))
}

fn evaluate(
    text: &str,
    vars: &[(String, f64)],
    named: bool,
    dump: bool,
) -> anyhow::Result<f64> {
    if named {
        let f = xpress::compile_named(text).with_context(|| format!("compiling `{text}`"))?;
        if dump {
            eprint!("{f}");
        }
        let map: HashMap<&str, f64> = vars.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        f.call(&map).with_context(|| format!("evaluating `{text}`"))
    } else {
        let f = xpress::Function::compile(text, vars.iter().map(|(k, _)| k.as_str()))
            .with_context(|| format!("compiling `{text}`"))?;
        if dump {
            eprint!("{f}");
        }
        let args: Vec<f64> = vars.iter().map(|(_, v)| *v).collect();
        f.call(&args).with_context(|| format!("evaluating `{text}`"))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG controls the level, warn by default
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("warn"))
        .map_err(|e| anyhow!("invalid log filter: {e}"))?;
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    match cli.expression {
        Some(text) => println!("{}", evaluate(&text, &cli.vars, cli.named, cli.dump)?),
        None => {
            for (text, vars) in DEMO {
                let vars: Vec<(String, f64)> =
                    vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                println!("{text} = {}", evaluate(text, &vars, cli.named, cli.dump)?);
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_binding() {
        assert_eq!(parse_var("x=25"), Ok(("x".to_string(), 25.0)));
        assert_eq!(parse_var(" y = -1.5 "), Ok(("y".to_string(), -1.5)));
        assert!(parse_var("x").is_err());
        assert!(parse_var("x=abc").is_err());
    }

    #[test]
    fn demo_set() {
        let results: Vec<f64> = DEMO
            .iter()
            .map(|(text, vars)| {
                let vars: Vec<(String, f64)> =
                    vars.iter().map(|(k, v)| (k.to_string(), *v)).collect();
                evaluate(text, &vars, false, false).unwrap()
            })
            .collect();
        assert_eq!(results, vec![2.0, 77.0, 8.0]);
    }

    #[test]
    fn named_mode_reports_missing_variable() {
        let err = evaluate("x + y", &[("x".to_string(), 1.0)], true, false).unwrap_err();
        assert_eq!(
            err.downcast_ref::<xpress::Error>(),
            Some(&xpress::Error::UnknownVariable("y".into()))
        );
    }

    #[test]
    fn cli_parses() {
        let cli = Cli::try_parse_from(["xpress", "x * 2", "-v", "x=3", "--named"]).unwrap();
        assert_eq!(cli.expression.as_deref(), Some("x * 2"));
        assert_eq!(cli.vars, vec![("x".to_string(), 3.0)]);
        assert!(cli.named);
        assert!(!cli.dump);
    }
}

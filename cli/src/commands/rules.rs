//! # KRODE Rules Command
//!
//! File: cli/src/commands/rules.rs
//!
//! `krode rules` loads the active rule table (built-in, configured, or
//! `--rules FILE`), which validates it, and prints the rules in evaluation
//! order. Use it to check a custom rule file before deploying it.
//!
use crate::common::ui;
use crate::core::config;
use crate::core::error::Result;
use crate::core::rules::RuleTable;
use clap::Parser;
use std::path::PathBuf;

/// # Rules Command Arguments (`RulesArgs`)
#[derive(Parser, Debug)]
pub struct RulesArgs {
    /// Rule file to validate and print instead of the configured or built-in table.
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Also print each rule's reply template.
    #[arg(long)]
    pub templates: bool,

    /// With --templates, print the template markup unchanged.
    #[arg(long, requires = "templates")]
    pub raw: bool,
}

pub async fn handle_rules(args: RulesArgs) -> Result<()> {
    let cfg = config::load_config()?;
    let table = cfg.rule_table(args.rules.as_deref())?;
    print!("{}", describe_table(&table, args.templates, args.raw));
    Ok(())
}

/// Renders the table as numbered lines, one per rule, in evaluation order.
fn describe_table(table: &RuleTable, templates: bool, raw: bool) -> String {
    let mut out = String::new();
    for (i, rule) in table.rules().enumerate() {
        let terms = if rule.terms().is_empty() {
            "(always matches)".to_string()
        } else {
            rule.terms().join(", ")
        };
        out.push_str(&format!("{}. {}: {}\n", i + 1, rule.category(), terms));
        if templates {
            for line in ui::format_reply(rule.template(), raw).lines() {
                out.push_str(&format!("     {}\n", line));
            }
        }
    }
    out
}

//! # KRODE Reply Rules
//!
//! File: cli/src/core/rules.rs
//!
//! ## Overview
//!
//! This module defines the rule table the responder evaluates. A rule ties a
//! reply `Category` to a set of lowercase match terms and a fixed rich-text
//! template. Rules are evaluated in order and the first match wins; the
//! fallback rule has no terms and always closes the table.
//!
//! ## Architecture
//!
//! - `Category`: the reply categories (product, maintenance, location, pricing, fallback)
//! - `ReplyRule`: one `(category, terms, template)` triple
//! - `RuleTable`: the ordered, immutable table; the fallback is held apart from
//!   the keyword rules so the "fallback last" invariant holds by construction
//! - `RuleTable::builtin()`: the table shipped with the website widget, built once
//! - `RuleTable::load()` / `RuleTable::from_toml_str()`: custom tables from TOML,
//!   validated before use
//!
//! ## Rule file format
//!
//! ```toml
//! [[rules]]
//! category = "product"
//! terms = ["porta", "puerta"]
//! template = "Oferim una àmplia gamma de productes..."
//!
//! [[rules]]
//! category = "fallback"
//! template = "Gràcies pel teu missatge!"
//! ```
//!
use crate::core::error::{KrodeError, Result, RuleTableError};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::LazyLock;
use tracing::{debug, info};

/// Reply category a rule belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Product inquiry (doors, product range).
    Product,
    /// Maintenance and repair services.
    Maintenance,
    /// Address, location and opening hours.
    Location,
    /// Pricing and quote requests.
    Pricing,
    /// Default reply when nothing else matches.
    Fallback,
}

impl Category {
    /// Returns the lowercase label used in rule files and API responses.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Product => "product",
            Category::Maintenance => "maintenance",
            Category::Location => "location",
            Category::Pricing => "pricing",
            Category::Fallback => "fallback",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A single reply rule: when any of `terms` occurs in the lowercased input,
/// the reply is `template`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyRule {
    category: Category,
    terms: Vec<String>,
    template: String,
}

impl ReplyRule {
    /// Creates a rule. Terms are trimmed, lowercased and de-duplicated;
    /// blank terms are dropped.
    pub fn new<I, S>(category: Category, terms: I, template: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut seen = HashSet::new();
        let terms = terms
            .into_iter()
            .map(|t| t.as_ref().trim().to_lowercase())
            .filter(|t| !t.is_empty())
            .filter(|t| seen.insert(t.clone()))
            .collect();

        Self {
            category,
            terms,
            template: template.into(),
        }
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Substring containment against an already lowercased input.
    /// A rule without terms matches everything.
    fn matches(&self, normalized: &str) -> bool {
        self.terms.is_empty() || self.terms.iter().any(|t| normalized.contains(t.as_str()))
    }
}

/// Ordered, immutable rule table. Keyword rules are evaluated first to last,
/// then the fallback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleTable {
    rules: Vec<ReplyRule>,
    fallback: ReplyRule,
}

/// Raw `[[rules]]` entry from a TOML rule file.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RuleEntry {
    category: Category,
    #[serde(default)]
    terms: Vec<String>,
    template: String,
}

/// Top-level layout of a TOML rule file.
#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
struct RuleFile {
    #[serde(default)]
    rules: Vec<RuleEntry>,
}

static BUILTIN: LazyLock<RuleTable> = LazyLock::new(|| RuleTable {
    rules: vec![
        ReplyRule::new(
            Category::Product,
            ["producte", "producto", "porta", "puerta"],
            PRODUCT_TEMPLATE,
        ),
        ReplyRule::new(
            Category::Maintenance,
            ["manteniment", "mantenimiento", "reparaci"],
            MAINTENANCE_TEMPLATE,
        ),
        ReplyRule::new(
            Category::Location,
            ["ubica", "adreça", "direccion", "on esteu", "horari"],
            LOCATION_TEMPLATE,
        ),
        ReplyRule::new(
            Category::Pricing,
            ["pressupost", "presupuesto", "preu", "precio"],
            PRICING_TEMPLATE,
        ),
    ],
    fallback: ReplyRule::new(Category::Fallback, Vec::<String>::new(), FALLBACK_TEMPLATE),
});

impl RuleTable {
    /// Builds a table from rules in evaluation order, checking the table
    /// invariants. The fallback rule must be present exactly once and last.
    pub fn new(rules: Vec<ReplyRule>) -> std::result::Result<Self, RuleTableError> {
        validate(&rules)?;

        let mut rules = rules;
        // validate() guarantees a trailing fallback.
        let fallback = rules.pop().ok_or(RuleTableError::Empty)?;
        Ok(Self { rules, fallback })
    }

    /// The table shipped with the KRODE website chat widget.
    pub fn builtin() -> &'static RuleTable {
        &BUILTIN
    }

    /// Parses and validates a rule table from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: RuleFile = toml::from_str(content).context("Failed to parse rule file")?;
        let rules = file
            .rules
            .into_iter()
            .map(|e| ReplyRule::new(e.category, e.terms, e.template))
            .collect();
        Ok(Self::new(rules).map_err(KrodeError::from)?)
    }

    /// Reads, parses and validates a rule file.
    pub fn load(path: &Path) -> Result<Self> {
        info!("Loading rule table from {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rule file: {}", path.display()))?;
        let table = Self::from_toml_str(&content)
            .with_context(|| format!("Invalid rule file: {}", path.display()))?;
        debug!("Loaded {} rules from {}", table.len(), path.display());
        Ok(table)
    }

    /// Returns the first rule matching `input`, or the fallback.
    pub fn classify(&self, input: &str) -> &ReplyRule {
        let normalized = input.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.matches(&normalized))
            .unwrap_or(&self.fallback)
    }

    /// Returns the reply template for `input`.
    pub fn respond(&self, input: &str) -> &str {
        self.classify(input).template()
    }

    /// All rules in evaluation order, fallback last.
    pub fn rules(&self) -> impl Iterator<Item = &ReplyRule> {
        self.rules.iter().chain(std::iter::once(self.fallback()))
    }

    pub fn fallback(&self) -> &ReplyRule {
        &self.fallback
    }

    /// Number of rules, fallback included.
    pub fn len(&self) -> usize {
        self.rules.len() + 1
    }
}

fn validate(rules: &[ReplyRule]) -> std::result::Result<(), RuleTableError> {
    if rules.is_empty() {
        return Err(RuleTableError::Empty);
    }

    let fallback_positions: Vec<usize> = rules
        .iter()
        .enumerate()
        .filter(|(_, r)| r.category == Category::Fallback)
        .map(|(i, _)| i)
        .collect();
    match fallback_positions.as_slice() {
        [] => return Err(RuleTableError::MissingFallback),
        [pos] if *pos != rules.len() - 1 => {
            return Err(RuleTableError::FallbackNotLast { position: pos + 1 })
        }
        [_] => {}
        _ => return Err(RuleTableError::DuplicateFallback),
    }

    let mut seen = HashSet::new();
    for rule in rules {
        if rule.category == Category::Fallback {
            if !rule.terms.is_empty() {
                return Err(RuleTableError::FallbackHasTerms);
            }
        } else if rule.terms.is_empty() {
            return Err(RuleTableError::NoTerms {
                category: rule.category,
            });
        }
        if !seen.insert(rule.category) {
            return Err(RuleTableError::DuplicateCategory {
                category: rule.category,
            });
        }
        if rule.template.trim().is_empty() {
            return Err(RuleTableError::BlankTemplate {
                category: rule.category,
            });
        }
    }
    Ok(())
}

// --- Built-in templates (Catalan, the site's primary language) ---

const PRODUCT_TEMPLATE: &str = "Oferim una àmplia gamma de productes:<br><br>\n\
    🚪 <strong>Portes Seccionals</strong> - Aïllament tèrmic i acústic<br>\n\
    ⚡ <strong>Portes Ràpides</strong> - Alta velocitat per a zones de trànsit<br>\n\
    🔥 <strong>Portes Tallafocs</strong> - Certificades segons normativa europea<br>\n\
    📦 <strong>Molls de Càrrega</strong> - Sistemes de càrrega i descàrrega<br>\n\
    🔄 <strong>Portes Enrotllables</strong> - Estalvi d'espai<br>\n\
    ⚙️ <strong>Motorització</strong> - Automatització intel·ligent<br><br>\n\
    Vols més informació sobre algun producte en concret?";

const MAINTENANCE_TEMPLATE: &str = "Oferim serveis de manteniment complets:<br><br>\n\
    🔧 <strong>Manteniment Preventiu</strong> - Revisions periòdiques<br>\n\
    🚨 <strong>Urgències 24h</strong> - Servei disponible tots els dies<br>\n\
    ✅ <strong>Recanvis Originals</strong> - Garantia del fabricant<br>\n\
    📋 <strong>Contractes de Manteniment</strong> - Preus preferents<br><br>\n\
    Truca'ns al <strong>972 27 17 13</strong> per contractar!";

const LOCATION_TEMPLATE: &str = "📍 <strong>Adreça:</strong><br>\n\
    Carrer Compositor Pep Ventura, 58<br>\n\
    17800 Olot, Girona<br><br>\n\
    🕐 <strong>Horari:</strong><br>\n\
    Dilluns - Divendres: 7:45 - 17:00<br>\n\
    Dissabte - Diumenge: Tancat<br><br>\n\
    📞 Telèfon: <strong>972 27 17 13</strong><br>\n\
    ✉️ Email: <strong>info@krode.com</strong>";

const PRICING_TEMPLATE: &str = "Per sol·licitar un pressupost personalitzat, pots:<br><br>\n\
    📝 Omplir el <a href=\"#contact\" style=\"color: #EB5A28\">formulari de contacte</a><br>\n\
    📞 Trucar-nos al <strong>972 27 17 13</strong><br>\n\
    ✉️ Enviar un email a <strong>info@krode.com</strong><br><br>\n\
    Et respondrem el més aviat possible amb una proposta adaptada a les teves necessitats!";

const FALLBACK_TEMPLATE: &str = "Gràcies pel teu missatge! Per a consultes específiques, et recomano:<br><br>\n\
    📞 Trucar al <strong>972 27 17 13</strong><br>\n\
    ✉️ Escriure a <strong>info@krode.com</strong><br><br>\n\
    O utilitza els botons ràpids per explorar els nostres serveis!";

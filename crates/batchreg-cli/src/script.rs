//! Operation scripts: a TOML list of registry calls replayed in order.
//!
//! ```toml
//! admin = "admin"
//!
//! [[step]]
//! action = "mint"
//! caller = "farm"
//! origin = "Farm A"
//! ingredients = "Wheat, Sugar"
//! manufacturing_date = 1627849200
//! batch_size = 100
//!
//! [[step]]
//! action = "flag_for_recall"
//! caller = "admin"
//! id = 1
//! reason = "Contamination"
//! ```
//!
//! Callers and other accounts are labels; each label maps to
//! `AccountId::derive(label)`.

use std::path::Path;

use anyhow::Context;
use batchreg_engine::{
    AuditReport, BatchQuery, ManualOrdering, OrderingSource, RecordingSink, Registry,
    RegistryEvent, TracingSink,
};
use batchreg_gate::GateConfig;
use batchreg_types::{AccountId, BatchId, BatchMetadata, BatchRecord, RegistryError};
use serde::{Deserialize, Serialize};

fn default_admin() -> String {
    "admin".into()
}

#[derive(Clone, Debug, Deserialize)]
pub struct Script {
    /// Label of the initial admin when no gate config file is given.
    #[serde(default = "default_admin")]
    pub admin: String,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

impl Script {
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        toml::from_str(text).context("invalid script")
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read script {}", path.display()))?;
        Self::from_toml_str(&text)
    }

    /// Gate configuration used when no config file is supplied.
    pub fn default_config(&self) -> GateConfig {
        GateConfig::new(AccountId::derive(&self.admin))
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Mint {
        caller: String,
        #[serde(flatten)]
        metadata: BatchMetadata,
    },
    BatchMint {
        caller: String,
        entries: Vec<BatchMetadata>,
    },
    Transfer {
        caller: String,
        id: u64,
        /// Defaults to the caller.
        #[serde(default)]
        sender: Option<String>,
        recipient: String,
    },
    Burn {
        caller: String,
        id: u64,
    },
    FlagForRecall {
        caller: String,
        id: u64,
        reason: String,
    },
    Unflag {
        caller: String,
        id: u64,
    },
    TransferAdmin {
        caller: String,
        new_admin: String,
    },
    SetPaused {
        caller: String,
        value: bool,
    },
    SetMintEnabled {
        caller: String,
        value: bool,
    },
    /// Move the host ordering counter forward.
    Advance {
        to: u64,
    },
    /// Print one record.
    Show {
        id: u64,
    },
}

impl Step {
    pub fn action(&self) -> &'static str {
        match self {
            Self::Mint { .. } => "mint",
            Self::BatchMint { .. } => "batch_mint",
            Self::Transfer { .. } => "transfer",
            Self::Burn { .. } => "burn",
            Self::FlagForRecall { .. } => "flag_for_recall",
            Self::Unflag { .. } => "unflag",
            Self::TransferAdmin { .. } => "transfer_admin",
            Self::SetPaused { .. } => "set_paused",
            Self::SetMintEnabled { .. } => "set_mint_enabled",
            Self::Advance { .. } => "advance",
            Self::Show { .. } => "show",
        }
    }

    pub fn caller(&self) -> Option<&str> {
        match self {
            Self::Mint { caller, .. }
            | Self::BatchMint { caller, .. }
            | Self::Transfer { caller, .. }
            | Self::Burn { caller, .. }
            | Self::FlagForRecall { caller, .. }
            | Self::Unflag { caller, .. }
            | Self::TransferAdmin { caller, .. }
            | Self::SetPaused { caller, .. }
            | Self::SetMintEnabled { caller, .. } => Some(caller.as_str()),
            Self::Advance { .. } | Self::Show { .. } => None,
        }
    }
}

/// Result of one script step.
#[derive(Clone, Debug, Serialize)]
pub struct StepOutcome {
    pub step: usize,
    pub action: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RegistryError>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<BatchRecord>,
    pub events: Vec<RegistryEvent>,
}

impl StepOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// Registry state after the last step.
#[derive(Clone, Debug, Serialize)]
pub struct Summary {
    pub admin: AccountId,
    pub paused: bool,
    pub mint_enabled: bool,
    pub last_id: BatchId,
    pub batch_count: usize,
    pub flagged: Vec<BatchId>,
    pub audit_clean: bool,
    pub violations: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    pub outcomes: Vec<StepOutcome>,
    pub summary: Summary,
}

impl RunReport {
    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.is_ok()).count()
    }
}

/// Replay `script` against a fresh registry built from `config`.
pub fn run(script: &Script, config: GateConfig) -> RunReport {
    let ordering = ManualOrdering::new(0);
    let sink = RecordingSink::new();
    let mut registry = Registry::new(config).with_ordering(ordering.clone());
    registry.add_sink(sink.clone());
    registry.add_sink(TracingSink);

    let mut outcomes = Vec::with_capacity(script.steps.len());
    for (index, step) in script.steps.iter().enumerate() {
        let mut record = None;
        let result = apply(&mut registry, &ordering, step, &mut record);
        let (value, error) = match result {
            Ok(value) => (value, None),
            Err(e) => (None, Some(e)),
        };
        outcomes.push(StepOutcome {
            step: index + 1,
            action: step.action(),
            caller: step.caller().map(str::to_string),
            value,
            error,
            code: error.map(RegistryError::code),
            record,
            events: sink.drain(),
        });
    }

    RunReport {
        outcomes,
        summary: summarize(&registry, registry.audit()),
    }
}

fn account(label: &str) -> AccountId {
    AccountId::derive(label)
}

fn apply(
    registry: &mut Registry,
    ordering: &ManualOrdering,
    step: &Step,
    record: &mut Option<BatchRecord>,
) -> Result<Option<String>, RegistryError> {
    match step {
        Step::Mint { caller, metadata } => {
            let id = registry.mint(&account(caller), metadata.clone())?;
            Ok(Some(id.to_string()))
        }
        Step::BatchMint { caller, entries } => {
            let count = registry.batch_mint(&account(caller), entries)?;
            Ok(Some(format!("{count} minted, last id {}", registry.last_id())))
        }
        Step::Transfer {
            caller,
            id,
            sender,
            recipient,
        } => {
            let sender = sender.as_deref().unwrap_or(caller);
            registry.transfer(
                &account(caller),
                BatchId::new(*id),
                &account(sender),
                &account(recipient),
            )?;
            Ok(None)
        }
        Step::Burn { caller, id } => {
            registry.burn(&account(caller), BatchId::new(*id))?;
            Ok(None)
        }
        Step::FlagForRecall { caller, id, reason } => {
            registry.flag_for_recall(&account(caller), BatchId::new(*id), reason.clone())?;
            Ok(None)
        }
        Step::Unflag { caller, id } => {
            registry.unflag(&account(caller), BatchId::new(*id))?;
            Ok(None)
        }
        Step::TransferAdmin { caller, new_admin } => {
            registry.transfer_admin(&account(caller), account(new_admin))?;
            Ok(Some(account(new_admin).to_string()))
        }
        Step::SetPaused { caller, value } => {
            let value = registry.set_paused(&account(caller), *value)?;
            Ok(Some(value.to_string()))
        }
        Step::SetMintEnabled { caller, value } => {
            let value = registry.set_mint_enabled(&account(caller), *value)?;
            Ok(Some(value.to_string()))
        }
        Step::Advance { to } => {
            ordering.set(*to);
            Ok(Some(ordering.current().to_string()))
        }
        Step::Show { id } => {
            *record = registry.record(BatchId::new(*id));
            Ok(record.is_none().then(|| "absent".to_string()))
        }
    }
}

fn summarize(registry: &Registry, audit: AuditReport) -> Summary {
    Summary {
        admin: registry.admin(),
        paused: registry.is_paused(),
        mint_enabled: registry.is_mint_enabled(),
        last_id: registry.last_id(),
        batch_count: registry.batch_count(),
        flagged: registry.flagged_batches(),
        audit_clean: audit.is_clean(),
        violations: audit
            .violations
            .into_iter()
            .map(|v| format!("{}: {}", v.id, v.description))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const RECALL: &str = r#"
[[step]]
action = "mint"
caller = "farm"
origin = "Farm A"
ingredients = "Wheat, Sugar"
manufacturing_date = 1627849200
batch_size = 100

[[step]]
action = "advance"
to = 500

[[step]]
action = "flag_for_recall"
caller = "admin"
id = 1
reason = "Contamination"

[[step]]
action = "transfer"
caller = "farm"
id = 1
recipient = "shop"

[[step]]
action = "unflag"
caller = "admin"
id = 1

[[step]]
action = "show"
id = 1
"#;

    fn run_text(text: &str) -> RunReport {
        let script = Script::from_toml_str(text).unwrap();
        let config = script.default_config();
        run(&script, config)
    }

    #[test]
    fn parses_every_step_kind() {
        let script = Script::from_toml_str(RECALL).unwrap();
        assert_eq!(script.admin, "admin");
        let actions: Vec<&str> = script.steps.iter().map(Step::action).collect();
        assert_eq!(
            actions,
            vec!["mint", "advance", "flag_for_recall", "transfer", "unflag", "show"]
        );
        assert_eq!(script.steps[0].caller(), Some("farm"));
        assert_eq!(script.steps[1].caller(), None);
    }

    #[test]
    fn recall_script_outcomes() {
        let report = run_text(RECALL);
        let outcomes = &report.outcomes;

        assert_eq!(outcomes[0].value.as_deref(), Some("#1"));
        assert_eq!(outcomes[0].events.len(), 1);
        assert!(outcomes[2].is_ok());
        assert_eq!(outcomes[3].error, Some(RegistryError::TransferFrozen));
        assert_eq!(outcomes[3].code, Some(109));
        assert!(outcomes[3].events.is_empty());

        let record = outcomes[5].record.as_ref().unwrap();
        assert!(!record.frozen);
        assert!(record.flag.reason.is_empty());
        assert_eq!(record.owner, AccountId::derive("farm"));

        assert_eq!(report.failures(), 1);
        assert_eq!(report.summary.last_id, BatchId::new(1));
        assert!(report.summary.flagged.is_empty());
        assert!(report.summary.audit_clean);
    }

    #[test]
    fn flag_time_comes_from_advance_step() {
        let report = run_text(
            r#"
[[step]]
action = "mint"
caller = "farm"
origin = "Farm A"
ingredients = "Oats"
manufacturing_date = 1
batch_size = 1

[[step]]
action = "advance"
to = 77

[[step]]
action = "flag_for_recall"
caller = "admin"
id = 1
reason = "mold"

[[step]]
action = "show"
id = 1
"#,
        );
        let record = report.outcomes[3].record.as_ref().unwrap();
        assert_eq!(record.flag.flag_time, 77);
        assert_eq!(report.summary.flagged, vec![BatchId::new(1)]);
    }

    #[test]
    fn batch_mint_step_rolls_back_on_bad_entry() {
        let report = run_text(
            r#"
[[step]]
action = "batch_mint"
caller = "farm"
entries = [
  { origin = "A", ingredients = "Rye", manufacturing_date = 10, batch_size = 5 },
  { origin = "", ingredients = "Rye", manufacturing_date = 10, batch_size = 5 },
]
"#,
        );
        assert_eq!(
            report.outcomes[0].error,
            Some(RegistryError::InvalidMetadata)
        );
        assert_eq!(report.summary.batch_count, 0);
        assert_eq!(report.summary.last_id, BatchId::GENESIS);
    }

    #[test]
    fn mint_step_reads_flattened_metadata() {
        let script = Script::from_toml_str(
            r#"
[[step]]
action = "mint"
caller = "farm"
origin = "Farm B"
ingredients = "Barley"
manufacturing_date = 1627849200
expiration_date = 1659385200
batch_size = 25
"#,
        )
        .unwrap();
        match &script.steps[0] {
            Step::Mint { caller, metadata } => {
                assert_eq!(caller, "farm");
                assert_eq!(
                    metadata,
                    &BatchMetadata::new("Farm B", "Barley", 1_627_849_200, 25)
                        .with_expiration(1_659_385_200)
                );
            }
            other => panic!("unexpected step {other:?}"),
        }
    }

    #[test]
    fn show_absent_batch() {
        let report = run_text("[[step]]\naction = \"show\"\nid = 4\n");
        assert_eq!(report.outcomes[0].value.as_deref(), Some("absent"));
        assert!(report.outcomes[0].record.is_none());
    }

    #[test]
    fn custom_admin_label() {
        let report = run_text(
            "admin = \"ops\"\n[[step]]\naction = \"set_paused\"\ncaller = \"ops\"\nvalue = true\n",
        );
        assert!(report.outcomes[0].is_ok());
        assert!(report.summary.paused);
        assert_eq!(report.summary.admin, AccountId::derive("ops"));
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = Script::from_toml_str("[[step]]\naction = \"teleport\"\n").unwrap_err();
        assert!(format!("{err:#}").contains("invalid script"));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(RECALL.as_bytes()).unwrap();
        let script = Script::load(file.path()).unwrap();
        assert_eq!(script.steps.len(), 6);
    }

    #[test]
    fn outcome_json_shape() {
        let report = run_text(RECALL);
        let json = serde_json::to_value(&report.outcomes[3]).unwrap();
        assert_eq!(json["error"], "TransferFrozen");
        assert_eq!(json["code"], 109);
        assert!(json.get("value").is_none());
    }

    #[test]
    fn demo_script_runs_with_demo_config() {
        let script =
            Script::from_toml_str(include_str!("../../../demos/recall.toml")).unwrap();
        let config = GateConfig::from_toml_str(include_str!("../../../demos/gate.toml")).unwrap();
        assert_eq!(config.max_batch, 500);

        let report = run(&script, config);
        assert_eq!(report.failures(), 1);
        assert_eq!(
            report.outcomes[4].error,
            Some(RegistryError::TransferFrozen)
        );
        let last = report.outcomes.last().unwrap().record.as_ref().unwrap();
        assert_eq!(last.owner, AccountId::derive("shop"));
        assert_eq!(report.summary.last_id, BatchId::new(3));
        assert_eq!(report.summary.batch_count, 2);
        assert!(report.summary.audit_clean);
    }
}

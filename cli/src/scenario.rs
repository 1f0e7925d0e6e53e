//! Scenario replay against an in-memory ledger.
//!
//! A scenario is a TOML file with an optional `start_time` and a list of
//! `[[steps]]`. Each step names the entity it creates, and later steps refer
//! to entities by those names. The genesis universe is always bound as
//! `"genesis"`.
//!
//! ```toml
//! start_time = 1509000000
//!
//! [[steps]]
//! op = "create_market"
//! name = "election"
//!
//! [[steps]]
//! op = "fork"
//! caller = { market = "election" }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result, anyhow, bail};
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

use arbor_core::{ErrorKind, Ledger, LedgerError, Universe, UniverseSnapshot};
use arbor_types::{
    Caller, DisputeBondTokenRef, MarketRef, PayoutDistributionHash, Timestamp, UniverseConfig,
    UniverseRef,
};

pub const GENESIS: &str = "genesis";

fn genesis() -> String {
    GENESIS.to_owned()
}

// ── Scenario file ────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Scenario {
    pub start_time: Option<u64>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("invalid scenario")
    }
}

/// An atto-denominated amount. Accepts a TOML integer or a decimal string,
/// since TOML integers stop at `i64::MAX`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Amount(pub u128);

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(u64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(value) => Ok(Self(u128::from(value))),
            Repr::Text(text) => text.trim().parse().map(Self).map_err(de::Error::custom),
        }
    }
}

/// The role a step claims, by entity name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallerSpec {
    #[default]
    External,
    Market(String),
    DisputeBond(String),
    /// The reputation token of the named universe.
    ReputationToken(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Increment,
    Decrement,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    CreateMarket {
        name: String,
        #[serde(default = "genesis")]
        universe: String,
        /// Defaults to the current scenario time.
        end_time: Option<u64>,
    },
    CreateDisputeBondToken { name: String, market: String },
    Fork {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
    },
    CreateChildUniverse {
        name: String,
        #[serde(default = "genesis")]
        universe: String,
        payout: Option<Vec<Amount>>,
        #[serde(default)]
        invalid: bool,
        label: Option<String>,
    },
    IncreaseRepForExtraBonds {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
        amount: Amount,
    },
    DecreaseRepForExtraBonds {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
        amount: Amount,
    },
    IncreaseExtraDisputeBond {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
        amount: Amount,
    },
    DecreaseExtraDisputeBond {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
        amount: Amount,
    },
    AdjustOpenInterest {
        #[serde(default = "genesis")]
        universe: String,
        #[serde(default)]
        caller: CallerSpec,
        direction: Direction,
        amount: Amount,
    },
    AdvanceTime { secs: u64 },
}

impl Step {
    #[must_use]
    pub const fn op(&self) -> &'static str {
        match self {
            Self::CreateMarket { .. } => "create_market",
            Self::CreateDisputeBondToken { .. } => "create_dispute_bond_token",
            Self::Fork { .. } => "fork",
            Self::CreateChildUniverse { .. } => "create_child_universe",
            Self::IncreaseRepForExtraBonds { .. } => "increase_rep_for_extra_bonds",
            Self::DecreaseRepForExtraBonds { .. } => "decrease_rep_for_extra_bonds",
            Self::IncreaseExtraDisputeBond { .. } => "increase_extra_dispute_bond",
            Self::DecreaseExtraDisputeBond { .. } => "decrease_extra_dispute_bond",
            Self::AdjustOpenInterest { .. } => "adjust_open_interest",
            Self::AdvanceTime { .. } => "advance_time",
        }
    }
}

// ── Report ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Ok { detail: String },
    Rejected { kind: ErrorKind, message: String },
}

impl Outcome {
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepReport {
    pub index: usize,
    pub op: &'static str,
    pub time: Timestamp,
    #[serde(flatten)]
    pub outcome: Outcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Bindings {
    pub universes: BTreeMap<String, UniverseRef>,
    pub markets: BTreeMap<String, MarketRef>,
    pub dispute_bond_tokens: BTreeMap<String, DisputeBondTokenRef>,
}

impl Bindings {
    fn universe(&self, name: &str) -> Result<UniverseRef> {
        self.universes
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("no universe named {name:?}"))
    }

    fn market(&self, name: &str) -> Result<MarketRef> {
        self.markets
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("no market named {name:?}"))
    }

    fn dispute_bond_token(&self, name: &str) -> Result<DisputeBondTokenRef> {
        self.dispute_bond_tokens
            .get(name)
            .copied()
            .ok_or_else(|| anyhow!("no dispute bond token named {name:?}"))
    }

    fn bind<T>(map: &mut BTreeMap<String, T>, name: &str, value: T) -> Result<()> {
        if map.contains_key(name) {
            bail!("name {name:?} is already bound");
        }
        map.insert(name.to_owned(), value);
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub config: UniverseConfig,
    pub start_time: Timestamp,
    pub end_time: Timestamp,
    pub steps: Vec<StepReport>,
    pub bindings: Bindings,
    pub universes: Vec<UniverseSnapshot>,
}

impl Report {
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| step.outcome.is_rejected())
            .count()
    }
}

// ── Runner ───────────────────────────────────────────────────

pub struct Runner {
    ledger: Ledger,
    now: Timestamp,
    start_time: Timestamp,
    bindings: Bindings,
    steps: Vec<StepReport>,
    strict: bool,
}

impl fmt::Debug for Runner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runner")
            .field("now", &self.now)
            .field("steps", &self.steps.len())
            .field("strict", &self.strict)
            .finish_non_exhaustive()
    }
}

impl Runner {
    /// A ledger with one genesis universe, bound as [`GENESIS`].
    pub fn new(config: UniverseConfig, now: Timestamp, strict: bool) -> Result<Self> {
        let mut ledger = Ledger::new(config);
        let genesis = ledger
            .create_genesis_universe()
            .context("failed to create the genesis universe")?;
        let mut bindings = Bindings::default();
        bindings.universes.insert(GENESIS.to_owned(), genesis);
        Ok(Self {
            ledger,
            now,
            start_time: now,
            bindings,
            steps: Vec::new(),
            strict,
        })
    }

    pub fn run(mut self, scenario: &Scenario) -> Result<Report> {
        for step in &scenario.steps {
            self.apply(step)?;
        }
        Ok(self.finish())
    }

    /// Apply one step. Ledger rejections are recorded; naming mistakes in the
    /// scenario itself abort the run.
    pub fn apply(&mut self, step: &Step) -> Result<()> {
        let index = self.steps.len();
        let outcome = match self.execute(step)? {
            Ok(detail) => Outcome::Ok { detail },
            Err(err) => Outcome::Rejected {
                kind: err.kind(),
                message: err.to_string(),
            },
        };
        tracing::info!(index, op = step.op(), ?outcome, "Step applied");
        if self.strict
            && let Outcome::Rejected { message, .. } = &outcome
        {
            bail!("step {index} ({}) was rejected: {message}", step.op());
        }
        self.steps.push(StepReport {
            index,
            op: step.op(),
            time: self.now,
            outcome,
        });
        Ok(())
    }

    #[must_use]
    pub fn finish(self) -> Report {
        Report {
            config: *self.ledger.config(),
            start_time: self.start_time,
            end_time: self.now,
            universes: self.ledger.snapshots(),
            steps: self.steps,
            bindings: self.bindings,
        }
    }

    fn caller(&self, spec: &CallerSpec) -> Result<Caller> {
        Ok(match spec {
            CallerSpec::External => Caller::External,
            CallerSpec::Market(name) => Caller::Market(self.bindings.market(name)?),
            CallerSpec::DisputeBond(name) => {
                Caller::DisputeBondToken(self.bindings.dispute_bond_token(name)?)
            }
            CallerSpec::ReputationToken(name) => {
                let universe = self.bindings.universe(name)?;
                let token = self
                    .ledger
                    .universe(universe)
                    .and_then(Universe::reputation_token)
                    .ok_or_else(|| anyhow!("universe {name:?} has no reputation token"))?;
                Caller::ReputationToken(token)
            }
        })
    }

    /// Outer `Result` is a scenario error, inner one a ledger rejection.
    fn execute(&mut self, step: &Step) -> Result<Result<String, LedgerError>> {
        Ok(match step {
            Step::CreateMarket {
                name,
                universe,
                end_time,
            } => {
                let universe = self.bindings.universe(universe)?;
                let end_time = end_time.map_or(self.now, Timestamp::from_secs);
                match self.ledger.create_market(universe, end_time) {
                    Ok(market) => {
                        Bindings::bind(&mut self.bindings.markets, name, market)?;
                        Ok(market.to_string())
                    }
                    Err(err) => Err(err),
                }
            }
            Step::CreateDisputeBondToken { name, market } => {
                let market = self.bindings.market(market)?;
                match self.ledger.create_dispute_bond_token(market) {
                    Ok(token) => {
                        Bindings::bind(&mut self.bindings.dispute_bond_tokens, name, token)?;
                        Ok(token.to_string())
                    }
                    Err(err) => Err(err),
                }
            }
            Step::Fork { universe, caller } => {
                let universe = self.bindings.universe(universe)?;
                let caller = self.caller(caller)?;
                self.ledger
                    .fork(universe, caller, self.now)
                    .map(|end| format!("fork ends at {end}"))
            }
            Step::CreateChildUniverse {
                name,
                universe,
                payout,
                invalid,
                label,
            } => {
                let universe = self.bindings.universe(universe)?;
                let hash = payout_hash(payout.as_deref(), *invalid, label.as_deref())?;
                match self.ledger.get_or_create_child_universe(universe, hash) {
                    Ok(child) => {
                        Bindings::bind(&mut self.bindings.universes, name, child)?;
                        Ok(child.to_string())
                    }
                    Err(err) => Err(err),
                }
            }
            Step::IncreaseRepForExtraBonds {
                universe,
                caller,
                amount,
            } => {
                let (universe, caller) = self.target(universe, caller)?;
                self.ledger
                    .increase_rep_available_for_extra_bond_payouts(universe, caller, amount.0)
                    .map(balance)
            }
            Step::DecreaseRepForExtraBonds {
                universe,
                caller,
                amount,
            } => {
                let (universe, caller) = self.target(universe, caller)?;
                self.ledger
                    .decrease_rep_available_for_extra_bond_payouts(universe, caller, amount.0)
                    .map(balance)
            }
            Step::IncreaseExtraDisputeBond {
                universe,
                caller,
                amount,
            } => {
                let (universe, caller) = self.target(universe, caller)?;
                self.ledger
                    .increase_extra_dispute_bond_remaining_to_be_paid_out(
                        universe,
                        caller,
                        amount.0,
                    )
                    .map(balance)
            }
            Step::DecreaseExtraDisputeBond {
                universe,
                caller,
                amount,
            } => {
                let (universe, caller) = self.target(universe, caller)?;
                self.ledger
                    .decrease_extra_dispute_bond_remaining_to_be_paid_out(
                        universe,
                        caller,
                        amount.0,
                    )
                    .map(balance)
            }
            Step::AdjustOpenInterest {
                universe,
                caller,
                direction,
                amount,
            } => {
                let (universe, caller) = self.target(universe, caller)?;
                let ledger = &mut self.ledger;
                let adjusted = match direction {
                    Direction::Increment => {
                        ledger.increment_open_interest(universe, caller, amount.0)
                    }
                    Direction::Decrement => {
                        ledger.decrement_open_interest(universe, caller, amount.0)
                    }
                };
                adjusted.map(balance)
            }
            Step::AdvanceTime { secs } => {
                self.now = self
                    .now
                    .checked_add(*secs)
                    .ok_or_else(|| anyhow!("advancing time by {secs}s overflows"))?;
                Ok(format!("now {}", self.now))
            }
        })
    }

    fn target(&self, universe: &str, caller: &CallerSpec) -> Result<(UniverseRef, Caller)> {
        Ok((self.bindings.universe(universe)?, self.caller(caller)?))
    }
}

fn balance(value: u128) -> String {
    format!("balance {value}")
}

fn payout_hash(
    payout: Option<&[Amount]>,
    invalid: bool,
    label: Option<&str>,
) -> Result<PayoutDistributionHash> {
    match (payout, label) {
        (Some(numerators), None) => {
            let numerators: Vec<u128> = numerators.iter().map(|amount| amount.0).collect();
            Ok(PayoutDistributionHash::derive(&numerators, invalid))
        }
        (None, Some(label)) => {
            PayoutDistributionHash::from_label(label).context("invalid payout label")
        }
        (Some(_), Some(_)) => bail!("give either `payout` or `label`, not both"),
        (None, None) => bail!("create_child_universe needs `payout` or `label`"),
    }
}

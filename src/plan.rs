//! YAML run plans
//!
//! A run plan is an ordered list of steps over rows whose volumes are already
//! computed. Executing a plan sequences every step into one worklist and then
//! allocates the worktable for it.
//!
//! ```yaml
//! name: PCR setup
//! steps:
//!   - comment: Mastermix
//!   - distribute:
//!       source: { labware: Mastermix, type: "25ml_1 waste" }
//!       tip_reuse: 2
//!       multi_dispense: 6
//!       targets:
//!         - { labware: PCR, type: "96 Well Skirted PCR", position: A1, volume: 13.1 }
//!   - transfer:
//!       rows:
//!         - source: { labware: Samples, type: "96 Well Skirted PCR", position: 1 }
//!           dest: { labware: PCR, type: "96 Well Skirted PCR", position: A1 }
//!           volume: 2
//!   - break
//! ```

use crate::catalog::LabwareCatalog;
use crate::error::{Error, Result};
use crate::gwl::{Command, RunLog, RunSequencer, DEFAULT_LIQUID_CLASS, DEFAULT_MULTI_LIQUID_CLASS};
use crate::planner::{
    reorder_by_labware, Addressed, BatchPlanner, DispenseTarget, DistributionOptions, MultiDispenseOptions,
    TipReuseOptions, TransferRow, Well,
};
use crate::tips::TipSelector;
use crate::wells::well_to_position;
use crate::worktable::{LabwareInventory, WorktableAllocator};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, info};

fn default_true() -> bool {
    true
}

fn default_one() -> usize {
    1
}

fn default_multi_disp() -> u32 {
    5
}

fn default_position() -> PositionRef {
    PositionRef::Number(1)
}

/// A position given either as a number or as a well id (`A1`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionRef {
    Number(u32),
    Well(String),
}

impl PositionRef {
    /// Position on a container of `labware_type`
    pub fn resolve(&self, catalog: &LabwareCatalog, labware_type: &str) -> Result<u32> {
        match self {
            PositionRef::Number(n) => Ok(*n),
            PositionRef::Well(id) => match id.trim().parse::<u32>() {
                Ok(n) => Ok(n),
                Err(_) => well_to_position(id, catalog.wells_of(labware_type)?),
            },
        }
    }
}

/// A container position referenced from a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanWell {
    pub labware: String,
    #[serde(rename = "type")]
    pub labware_type: String,
    #[serde(default = "default_position")]
    pub position: PositionRef,
}

impl PlanWell {
    fn resolve(&self, catalog: &LabwareCatalog) -> Result<Well> {
        Ok(Well::new(
            &self.labware,
            &self.labware_type,
            self.position.resolve(catalog, &self.labware_type)?,
        ))
    }
}

/// A destination with its volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTarget {
    pub labware: String,
    #[serde(rename = "type")]
    pub labware_type: String,
    pub position: PositionRef,
    pub volume: f64,
}

impl PlanTarget {
    fn resolve(&self, catalog: &LabwareCatalog) -> Result<DispenseTarget> {
        let position = self.position.resolve(catalog, &self.labware_type)?;
        Ok(DispenseTarget::new(
            Well::new(&self.labware, &self.labware_type, position),
            self.volume,
        ))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanTransferRow {
    pub source: PlanWell,
    pub dest: PlanWell,
    pub volume: f64,
}

/// Aspirate/dispense pairs with tip reuse
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferStep {
    #[serde(default)]
    pub liquid_class: Option<String>,
    #[serde(default = "default_one")]
    pub tip_reuse: usize,
    #[serde(default = "default_true")]
    pub skip_zero: bool,
    #[serde(default)]
    pub reorder_384: bool,
    pub rows: Vec<PlanTransferRow>,
}

/// Source of a reagent distribution; vessels are labelled `{label}[NNN]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanSource {
    #[serde(alias = "label")]
    pub labware: String,
    #[serde(rename = "type")]
    pub labware_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributeStep {
    pub source: PlanSource,
    #[serde(default)]
    pub liquid_class: Option<String>,
    #[serde(default = "default_tip_reuse")]
    pub tip_reuse: u32,
    #[serde(default = "default_multi_disp")]
    pub multi_dispense: u32,
    #[serde(default)]
    pub reorder_384: bool,
    pub targets: Vec<PlanTarget>,
}

fn default_tip_reuse() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiDispenseStep {
    pub source: PlanWell,
    #[serde(default)]
    pub liquid_class: Option<String>,
    #[serde(default = "default_n_multi_disp")]
    pub n_multi_disp: usize,
    #[serde(default)]
    pub reorder_384: bool,
    pub targets: Vec<PlanTarget>,
}

fn default_n_multi_disp() -> usize {
    4
}

/// One step of a run plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlanStep {
    /// `break`, `flush` or `waste`
    Simple(String),
    Comment { comment: String },
    Transfer { transfer: TransferStep },
    Distribute { distribute: DistributeStep },
    MultiDispense { multi_dispense: MultiDispenseStep },
}

impl PlanStep {
    fn kind(&self) -> &str {
        match self {
            PlanStep::Simple(s) => s,
            PlanStep::Comment { .. } => "comment",
            PlanStep::Transfer { .. } => "transfer",
            PlanStep::Distribute { .. } => "distribute",
            PlanStep::MultiDispense { .. } => "multi_dispense",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunPlan {
    #[serde(default)]
    pub name: Option<String>,
    /// Overrides the configured default liquid class
    #[serde(default)]
    pub default_liquid_class: Option<String>,
    pub steps: Vec<PlanStep>,
}

impl RunPlan {
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        debug!("Loading run plan from {}", path.display());
        Self::from_yaml_str(&content)
    }
}

/// Worklist and labware inventory of one executed plan
#[derive(Debug, Clone)]
pub struct PlanOutput {
    pub worklist: RunLog,
    pub inventory: LabwareInventory,
}

/// Executes run plans against a catalog
pub struct PlanExecutor<'a> {
    catalog: &'a LabwareCatalog,
    tips: TipSelector<'a>,
    default_liquid_class: String,
    strict_liquid_class: bool,
}

impl<'a> PlanExecutor<'a> {
    pub fn new(catalog: &'a LabwareCatalog) -> Self {
        Self {
            catalog,
            tips: TipSelector::new(catalog),
            default_liquid_class: DEFAULT_LIQUID_CLASS.to_string(),
            strict_liquid_class: false,
        }
    }

    #[must_use]
    pub fn with_tip_selector(mut self, tips: TipSelector<'a>) -> Self {
        self.tips = tips;
        self
    }

    #[must_use]
    pub fn with_default_liquid_class(mut self, liquid_class: impl Into<String>) -> Self {
        self.default_liquid_class = liquid_class.into();
        self
    }

    #[must_use]
    pub fn strict_liquid_class(mut self, strict: bool) -> Self {
        self.strict_liquid_class = strict;
        self
    }

    /// Run every step in order; the first failing step aborts the run
    pub fn execute(&self, plan: &RunPlan) -> Result<PlanOutput> {
        let default_liquid_class = plan
            .default_liquid_class
            .as_deref()
            .unwrap_or(&self.default_liquid_class);
        info!(
            "Executing run plan \"{}\" ({} steps)",
            plan.name.as_deref().unwrap_or("unnamed"),
            plan.steps.len()
        );

        let mut sequencer = RunSequencer::with_tip_selector(self.catalog, self.tips.clone())
            .strict_liquid_class(self.strict_liquid_class);
        let mut planner = BatchPlanner::new(&mut sequencer, default_liquid_class);
        for (i, step) in plan.steps.iter().enumerate() {
            debug!("Step {}: {}", i + 1, step.kind());
            self.execute_step(&mut planner, step, default_liquid_class)?;
        }

        let worklist = sequencer.finish();
        let inventory = WorktableAllocator::new(self.catalog).allocate(worklist.commands())?;
        Ok(PlanOutput {
            worklist,
            inventory,
        })
    }

    fn execute_step(
        &self,
        planner: &mut BatchPlanner<'_, 'a>,
        step: &PlanStep,
        default_liquid_class: &str,
    ) -> Result<()> {
        match step {
            PlanStep::Simple(name) => {
                let command = match name.trim().to_ascii_lowercase().as_str() {
                    "break" => Command::Break,
                    "flush" => Command::Flush,
                    "waste" => Command::Waste,
                    other => {
                        return Err(Error::Validation(format!("Unknown run plan step \"{other}\"")))
                    }
                };
                planner.push(command)
            }
            PlanStep::Comment { comment } => planner.push(Command::comment(comment.as_str())),
            PlanStep::Transfer { transfer } => {
                let rows = transfer
                    .rows
                    .iter()
                    .map(|row| {
                        Ok(TransferRow::new(
                            row.source.resolve(self.catalog)?,
                            row.dest.resolve(self.catalog)?,
                            row.volume,
                        ))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let rows = self.maybe_reorder(rows, transfer.reorder_384)?;
                let mut options = TipReuseOptions::new(transfer.tip_reuse)
                    .with_liquid_class(transfer.liquid_class.as_deref().unwrap_or(default_liquid_class));
                options.skip_zero = transfer.skip_zero;
                planner.tip_reuse(&rows, &options).map(|_| ())
            }
            PlanStep::Distribute { distribute } => {
                let targets = self.resolve_targets(&distribute.targets, distribute.reorder_384)?;
                let mut options = DistributionOptions::new(
                    &distribute.source.labware,
                    &distribute.source.labware_type,
                );
                options.liquid_class = distribute
                    .liquid_class
                    .clone()
                    .unwrap_or_else(|| DEFAULT_MULTI_LIQUID_CLASS.to_string());
                options.n_tip_reuse = distribute.tip_reuse;
                options.n_multi_disp = distribute.multi_dispense;
                planner.distribute(&targets, &options).map(|_| ())
            }
            PlanStep::MultiDispense { multi_dispense } => {
                let source = multi_dispense.source.resolve(self.catalog)?;
                let targets =
                    self.resolve_targets(&multi_dispense.targets, multi_dispense.reorder_384)?;
                let mut options = MultiDispenseOptions::new(multi_dispense.n_multi_disp);
                if let Some(lc) = &multi_dispense.liquid_class {
                    options.liquid_class = lc.clone();
                }
                planner
                    .multi_dispense(&source, &targets, &options)
                    .map(|_| ())
            }
        }
    }

    fn resolve_targets(&self, targets: &[PlanTarget], reorder_384: bool) -> Result<Vec<DispenseTarget>> {
        let targets = targets
            .iter()
            .map(|t| t.resolve(self.catalog))
            .collect::<Result<Vec<_>>>()?;
        self.maybe_reorder(targets, reorder_384)
    }

    fn maybe_reorder<T: Addressed>(&self, rows: Vec<T>, reorder_384: bool) -> Result<Vec<T>> {
        if reorder_384 {
            reorder_by_labware(self.catalog, rows)
        } else {
            Ok(rows)
        }
    }
}

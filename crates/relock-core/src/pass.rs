//! The two-phase refactor pass.
//!
//! Phase one plans every module: scan, classify, and collect the lock
//! requirements of all modules into one [`LockTable`]. A module whose plan
//! fails contributes nothing. Phase two renders each module once, combining
//! the lock fields it owns with its own site rewrites, and writes every
//! changed module exactly once.

use std::collections::BTreeMap;
use std::fs;

use relock_config::{Config, GuardedBlockPolicy};
use relock_syntax::{SyntaxError, TextEdit, apply_edits};
use tracing::{debug, error, info, warn};

use crate::error::RefactorError;
use crate::module::SourceModule;
use crate::report::{ModuleOutcome, ModuleStatus, PassReport};
use crate::resolver::{LockTable, lock_edits};
use crate::rewrite::{rewrite_block, rewrite_method};
use crate::scanner::{CriticalSection, MethodRef, SectionKind, SkippedSection, scan};
use crate::scenario::{Classification, Resolution, TypeIndex, classify};

const PASS_TARGET: &str = "relock_core::pass";

/// A critical section together with its resolved lock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    /// The construct being rewritten.
    pub section: CriticalSection,
    /// Lock it is rewritten onto.
    pub resolution: Resolution,
}

/// Phase-one result for one module.
#[derive(Debug, Default)]
pub struct ModulePlan {
    /// Sites to rewrite. Empty when planning failed.
    pub sites: Vec<Site>,
    /// Constructs left untouched.
    pub skipped: Vec<SkippedSection>,
    /// Why planning failed, if it did.
    pub failure: Option<RefactorError>,
}

/// Phase-one result for the whole module set.
#[derive(Debug, Default)]
pub struct Plan {
    /// One entry per module, in module order.
    pub modules: Vec<ModulePlan>,
    /// Lock fields required across all successfully planned modules.
    pub locks: LockTable,
}

/// Phase-two result for one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedModule {
    /// Outcome before writing.
    pub outcome: ModuleOutcome,
    /// New source text, when the module changed.
    pub output: Option<String>,
}

/// Rewrites `synchronized` constructs across a set of modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefactorPass {
    policy: GuardedBlockPolicy,
    dry_run: bool,
}

impl RefactorPass {
    /// Creates a pass that writes its results and handles guarded blocks per
    /// `policy`.
    #[must_use]
    pub const fn new(policy: GuardedBlockPolicy) -> Self {
        Self {
            policy,
            dry_run: false,
        }
    }

    /// Creates a pass from loaded configuration.
    #[must_use]
    pub const fn from_config(config: &Config) -> Self {
        Self::new(config.guarded_block()).with_dry_run(config.dry_run())
    }

    /// Sets whether results are only reported, not written.
    #[must_use]
    pub const fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Guarded-block policy in use.
    #[must_use]
    pub const fn policy(&self) -> GuardedBlockPolicy {
        self.policy
    }

    /// Plans, renders, and writes every module.
    ///
    /// Write failures are logged and recorded in the report; the remaining
    /// modules are still processed.
    #[must_use]
    pub fn run(&self, modules: &[SourceModule]) -> PassReport {
        let plan = self.plan(modules);
        let rendered = self.render(modules, &plan);

        let mut report = PassReport {
            outcomes: Vec::with_capacity(rendered.len()),
            dry_run: self.dry_run,
        };
        for RenderedModule {
            mut outcome,
            output,
        } in rendered
        {
            if let Some(output) = output {
                if !self.dry_run {
                    write_module(&mut outcome, &output);
                }
            }
            report.outcomes.push(outcome);
        }

        info!(
            target: PASS_TARGET,
            event = "pass_complete",
            rewritten = report.rewritten(),
            unchanged = report.unchanged(),
            failed = report.failed(),
            sections = report.sections_rewritten(),
            skipped = report.sections_skipped(),
            locks_created = report.locks_created(),
            locks_promoted = report.locks_promoted(),
            dry_run = self.dry_run,
            "refactor pass complete"
        );
        report
    }

    /// Phase one: classifies every critical section and merges the lock
    /// requirements of all modules.
    #[must_use]
    pub fn plan(&self, modules: &[SourceModule]) -> Plan {
        let index = TypeIndex::new(modules);
        let mut plan = Plan::default();

        for (position, module) in modules.iter().enumerate() {
            let module_plan = match plan_module(&index, position, module) {
                Ok(module_plan) => {
                    for site in &module_plan.sites {
                        plan.locks.require(site.resolution.requirement.clone());
                    }
                    module_plan
                }
                Err(failure) => {
                    error!(
                        target: PASS_TARGET,
                        event = "plan_failed",
                        file = %module.path().display(),
                        error = %failure,
                        "module left untouched"
                    );
                    ModulePlan {
                        failure: Some(failure),
                        ..ModulePlan::default()
                    }
                }
            };
            plan.modules.push(module_plan);
        }

        plan
    }

    /// Phase two: renders the new source of every module.
    #[must_use]
    pub fn render(&self, modules: &[SourceModule], plan: &Plan) -> Vec<RenderedModule> {
        let empty = ModulePlan::default();
        modules
            .iter()
            .enumerate()
            .map(|(position, module)| {
                let module_plan = plan.modules.get(position).unwrap_or(&empty);
                self.render_module(position, module, module_plan, &plan.locks)
            })
            .collect()
    }

    fn render_module(
        &self,
        position: usize,
        module: &SourceModule,
        plan: &ModulePlan,
        locks: &LockTable,
    ) -> RenderedModule {
        let mut outcome = ModuleOutcome::new(module.path().to_path_buf(), ModuleStatus::Unchanged);
        outcome.sections_skipped = plan.skipped.len();

        let owned = lock_edits(position, module.outline(), locks);
        outcome.locks_created = owned.created.len();
        outcome.locks_promoted = owned.promoted.len();
        let mut edits = owned.edits;

        if let Some(failure) = &plan.failure {
            outcome.status = ModuleStatus::Failed(failure.to_string());
        } else {
            match self.site_edits(module, &plan.sites) {
                Ok(site_edits) => {
                    outcome.sections_rewritten = plan.sites.len();
                    edits.extend(site_edits);
                }
                Err(failure) => {
                    error!(
                        target: PASS_TARGET,
                        event = "render_failed",
                        file = %module.path().display(),
                        error = %failure,
                        "critical sections left untouched"
                    );
                    outcome.status = ModuleStatus::Failed(failure.to_string());
                }
            }
        }

        if edits.is_empty() {
            return RenderedModule {
                outcome,
                output: None,
            };
        }

        match apply_edits(module.source(), &edits) {
            Ok(output) => {
                if outcome.status == ModuleStatus::Unchanged {
                    outcome.status = ModuleStatus::Rewritten;
                }
                RenderedModule {
                    outcome,
                    output: Some(output),
                }
            }
            Err(failure) => {
                let failure = RefactorError::from(failure);
                error!(
                    target: PASS_TARGET,
                    event = "render_failed",
                    file = %module.path().display(),
                    error = %failure,
                    "module left untouched"
                );
                outcome.status = ModuleStatus::Failed(failure.to_string());
                outcome.sections_rewritten = 0;
                outcome.locks_created = 0;
                outcome.locks_promoted = 0;
                RenderedModule {
                    outcome,
                    output: None,
                }
            }
        }
    }

    /// Builds the rewrite edits of one module's sites, folding block
    /// rewrites into the body of an enclosing synchronized method.
    fn site_edits(
        &self,
        module: &SourceModule,
        sites: &[Site],
    ) -> Result<Vec<TextEdit>, RefactorError> {
        let source = module.source();
        let outline = module.outline();
        let mut by_method: BTreeMap<MethodRef, Vec<&Site>> = BTreeMap::new();
        for site in sites {
            by_method.entry(site.section.method).or_default().push(site);
        }

        let mut edits = Vec::new();
        for (at, method_sites) in by_method {
            let method = outline
                .types
                .get(at.type_index)
                .and_then(|ty| ty.methods.get(at.method_index))
                .ok_or_else(|| {
                    SyntaxError::internal_error(format!(
                        "no method at {}:{}",
                        at.type_index, at.method_index
                    ))
                })?;

            let mut block_edits = Vec::new();
            let mut method_lock = None;
            for site in method_sites {
                debug!(
                    target: PASS_TARGET,
                    event = "rewrite",
                    file = %module.path().display(),
                    method = %method.name,
                    scenario = ?site.resolution.scenario,
                    lock = %site.resolution.reference,
                    "rewriting critical section"
                );
                match &site.section.kind {
                    SectionKind::Method { .. } => method_lock = Some(&site.resolution.reference),
                    SectionKind::Block { block_index, .. } => {
                        let block = method.guarded_blocks.get(*block_index).ok_or_else(|| {
                            SyntaxError::internal_error(format!(
                                "no guarded block {block_index} in `{}`",
                                method.name
                            ))
                        })?;
                        block_edits.push(rewrite_block(
                            source,
                            block,
                            &site.resolution.reference,
                            self.policy,
                        )?);
                    }
                }
            }

            match method_lock {
                Some(lock) => edits.extend(rewrite_method(source, method, lock, &block_edits)?),
                None => edits.extend(block_edits),
            }
        }

        Ok(edits)
    }
}

impl Default for RefactorPass {
    fn default() -> Self {
        Self::new(GuardedBlockPolicy::default())
    }
}

fn plan_module(
    index: &TypeIndex,
    position: usize,
    module: &SourceModule,
) -> Result<ModulePlan, RefactorError> {
    let outline = module.outline();
    let scanned = scan(outline);
    let mut plan = ModulePlan {
        skipped: scanned.skipped,
        ..ModulePlan::default()
    };

    for section in scanned.sections {
        match classify(index, position, outline, &section)? {
            Classification::Resolved(resolution) => plan.sites.push(Site {
                section,
                resolution,
            }),
            Classification::Skipped(reason) => plan.skipped.push(SkippedSection {
                method: section.method,
                reason,
            }),
        }
    }

    for skipped in &plan.skipped {
        let method = outline
            .types
            .get(skipped.method.type_index)
            .and_then(|ty| ty.methods.get(skipped.method.method_index))
            .map_or("", |method| method.name.as_str());
        warn!(
            target: PASS_TARGET,
            event = "section_skipped",
            file = %module.path().display(),
            method,
            reason = %skipped.reason,
            "critical section left untouched"
        );
    }

    Ok(plan)
}

fn write_module(outcome: &mut ModuleOutcome, output: &str) {
    if let Err(source) = fs::write(&outcome.path, output) {
        let failure = RefactorError::Write {
            path: outcome.path.clone(),
            source,
        };
        warn!(
            target: PASS_TARGET,
            event = "write_failed",
            error = %failure,
            "continuing with remaining modules"
        );
        outcome.status = ModuleStatus::WriteFailed(failure.to_string());
    }
}

use crate::driver::{Driver, RunStatus};
use crate::extract;
use crate::flags;
use crate::groups::TestGroup;
use crate::report;
use crate::types::{CampaignSummary, GroupVerdict};
use anyhow::{Context, Result};
use std::path::Path;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct CampaignOptions {
    pub target: String,
    pub timeout: Duration,
    /// Suppress the per-group and per-suite rendering; counters still
    /// accumulate.
    pub silent: bool,
}

/// Runs every group in declaration order, strictly serialized. A group's
/// failure only ends that group; an unpatchable configuration ends the
/// whole campaign via `Err`.
pub fn run_campaign<D: Driver>(
    driver: &D,
    groups: &[TestGroup],
    config_path: &Path,
    output_path: &Path,
    opts: &CampaignOptions,
) -> Result<CampaignSummary> {
    let mut summary = CampaignSummary::default();
    for group in groups {
        if !opts.silent {
            report::print_group_banner(group, &opts.target);
        }
        summary.total += 1;
        let verdict = run_group(driver, group, config_path, output_path, opts)?;
        if verdict.passed() {
            info!("group '{}' passed", group.name);
            summary.success += 1;
        } else {
            info!("group '{}' failed: {verdict:?}", group.name);
            summary.error += 1;
        }
    }
    Ok(summary)
}

// One Patching -> Building -> Running -> Extracting -> Validating cycle.
// Every phase failure except patching is local to the group.
fn run_group<D: Driver>(
    driver: &D,
    group: &TestGroup,
    config_path: &Path,
    output_path: &Path,
    opts: &CampaignOptions,
) -> Result<GroupVerdict> {
    flags::patch(config_path, &group.name, &group.flags)
        .with_context(|| format!("cannot patch test flags for group '{}'", group.name))?;

    if let Err(e) = driver.clean() {
        error!("group '{}': clean failed: {e:#}", group.name);
        return Ok(GroupVerdict::BuildFailed);
    }
    if let Err(e) = driver.build(&opts.target, true) {
        error!("group '{}': build failed: {e:#}", group.name);
        return Ok(GroupVerdict::BuildFailed);
    }

    match driver.run_under_emulator(&opts.target, output_path, opts.timeout) {
        Ok(RunStatus::Completed { success: true }) => {}
        Ok(RunStatus::Completed { success: false }) => {
            error!("group '{}': emulator run failed", group.name);
            return Ok(GroupVerdict::RunFailed);
        }
        // The target may have printed its report before wedging; still try
        // to extract from the partial output.
        Ok(RunStatus::TimedOut) => {
            warn!(
                "group '{}': run timed out, extracting from partial output",
                group.name
            );
        }
        Err(e) => {
            error!("group '{}': emulator run failed: {e:#}", group.name);
            return Ok(GroupVerdict::RunFailed);
        }
    }

    let suite = match extract::extract(output_path) {
        Ok(Some(suite)) => suite,
        Ok(None) => {
            error!("group '{}': no test report in the run output", group.name);
            return Ok(GroupVerdict::ReportMissing);
        }
        Err(e) => {
            error!("group '{}': {e:#}", group.name);
            return Ok(GroupVerdict::ReportMalformed);
        }
    };

    if !opts.silent {
        report::print_suite(&suite);
    }
    if suite.failures == 0 {
        Ok(GroupVerdict::Passed)
    } else {
        Ok(GroupVerdict::TestFailures(suite.failures))
    }
}

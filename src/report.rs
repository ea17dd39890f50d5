use crate::groups::TestGroup;
use crate::types::{CampaignSummary, TestSuiteReport};
use colored::Colorize;

pub fn render_group_banner(group: &TestGroup, target: &str) -> String {
    let mut out = String::new();
    let rule = "#==============================================================================#";
    out.push_str(&format!("\n{}\n", rule.blue()));
    out.push_str(&format!(
        "{}\n",
        format!(" > Executing group {}", group.name).blue()
    ));
    out.push_str(&format!(
        "{}\n",
        format!(" > Flags: {}", group.flags.join(", ")).blue()
    ));
    out.push_str(&format!("{}\n", format!(" > Target: {target}").blue()));
    out.push_str(&format!("{}\n\n", rule.blue()));
    out
}

pub fn render_suite(report: &TestSuiteReport) -> String {
    let mut out = String::new();
    let rule = "#--------------------------------------------------#";
    out.push_str(&format!("{}\n", rule.cyan().bold()));
    out.push_str(&format!(
        "{}\n",
        format!("| Version:  {:39}|", report.version).cyan()
    ));
    out.push_str(&format!(
        "{}\n",
        format!("| Suite:    {:39}|", report.name).cyan()
    ));
    out.push_str(&format!("{}\n", rule.cyan()));
    out.push_str(&format!(
        "{}\n",
        "| N# of tests    | N# of success  | N# of failures |".cyan()
    ));
    out.push_str(&format!(
        "{}\n",
        format!(
            "| {:14} | {:14} | {:14} |",
            report.number_of_tests, report.success, report.failures
        )
        .cyan()
    ));
    out.push_str(&format!("{}\n", rule.cyan()));

    // Detail only the failing cases; passing ones are just counted above.
    for (id, case) in &report.cases {
        if case.status {
            continue;
        }
        out.push_str(&format!("===> Test {id}\n"));
        out.push_str(&format!(
            "    > Outcome: {} | Expected: 0x{:X} -- Result: 0x{:X} | Type: {}\n",
            "FAIL".red().bold(),
            case.expected,
            case.result,
            case.r#type
        ));
    }

    let banner = format!("==== {} RESULT: ", report.name);
    if report.failures == 0 {
        out.push_str(&format!("\n{}{}\n", banner.green().bold(), "PASS ====".green().bold()));
    } else {
        out.push_str(&format!("\n{}{}\n", banner.red().bold(), "FAIL ====".red().bold()));
    }
    out
}

pub fn render_final(summary: &CampaignSummary) -> String {
    let mut out = String::new();
    let rule = "#==============================================================================#";
    out.push_str(&format!("\n{}\n", rule.blue().bold()));
    out.push_str(&format!(
        "{}\n",
        "| FINAL REPORT                                                                 |"
            .blue()
            .bold()
    ));
    out.push_str(&format!("{}\n", rule.blue().bold()));
    out.push_str(&format!(
        "{}\n",
        format!("| Total:   {:<67} |", summary.total).blue().bold()
    ));
    out.push_str(&format!(
        "{}\n",
        format!("| Success: {:<67} |", summary.success).blue().bold()
    ));
    out.push_str(&format!(
        "{}\n",
        format!("| Errors:  {:<67} |", summary.error).blue().bold()
    ));
    out.push_str(&format!("{}\n", rule.blue().bold()));
    out
}

pub fn print_group_banner(group: &TestGroup, target: &str) {
    print!("{}", render_group_banner(group, target));
}

pub fn print_suite(report: &TestSuiteReport) {
    print!("{}", render_suite(report));
}

pub fn print_final(summary: &CampaignSummary) {
    print!("{}", render_final(summary));
}

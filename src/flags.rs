use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::debug;

/// Column at which the 0/1 value of a flag definition starts.
const VALUE_COLUMN: usize = 50;

/// Directive naming the running campaign, rewritten once per group.
const NAME_MARKER: &str = "TEST_FRAMEWORK_TEST_NAME";

/// Section comment used as insertion anchor when the file carries no flag
/// definitions at all.
const SECTION_MARKER: &str = "* TESTING ENABLE FLAGS";

fn flag_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\s*#define\s+TEST_([A-Za-z0-9_]+)_ENABLED\b").unwrap())
}

/// One flag definition found in (or added to) the configuration file.
#[derive(Debug, Clone)]
struct FlagRecord {
    name: String,
    enabled: bool,
    line: usize,
}

/// In-memory view of the test configuration header: the raw line sequence
/// plus an ordered universe of flag records layered on top of it. All flag
/// edits go through the records; `save` re-renders their lines in the fixed
/// column format and leaves every other line untouched.
#[derive(Debug)]
pub struct ConfigFile {
    lines: Vec<String>,
    flags: Vec<FlagRecord>,
    name_line: Option<usize>,
    anchor: Option<usize>,
}

impl ConfigFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration '{}'", path.display()))?;
        let lines: Vec<String> = content.lines().map(str::to_string).collect();

        let mut flags = Vec::new();
        let mut name_line = None;
        let mut anchor = None;
        for (i, line) in lines.iter().enumerate() {
            if name_line.is_none() && line.contains(NAME_MARKER) {
                name_line = Some(i);
                continue;
            }
            if let Some(caps) = flag_pattern().captures(line) {
                if anchor.is_none() {
                    anchor = Some(i);
                }
                let enabled = line.trim_end().ends_with('1');
                flags.push(FlagRecord {
                    name: caps[1].to_string(),
                    enabled,
                    line: i,
                });
            }
        }
        // No flag line anywhere: fall back to the section comment, two
        // lines below it.
        if anchor.is_none() {
            anchor = lines
                .iter()
                .position(|l| l.contains(SECTION_MARKER))
                .map(|i| i + 2);
        }

        Ok(Self {
            lines,
            flags,
            name_line,
            anchor,
        })
    }

    /// Line index after which new flag definitions are inserted, if one
    /// exists.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    /// Rewrites the first campaign-name directive; later occurrences are
    /// left alone.
    pub fn set_campaign_name(&mut self, name: &str) {
        if let Some(i) = self.name_line {
            self.lines[i] = format!("#define {NAME_MARKER} \"{name}\"");
        }
    }

    /// Turns every known flag off. Always the first step of a patch, so no
    /// flag from a previous group survives.
    pub fn disable_all(&mut self) {
        for record in &mut self.flags {
            record.enabled = false;
        }
    }

    /// Turns one flag on: in place when a definition exists, otherwise as a
    /// new definition right after the anchor.
    pub fn enable(&mut self, flag: &str) -> Result<()> {
        if let Some(record) = self.flags.iter_mut().find(|r| r.name == flag) {
            record.enabled = true;
            return Ok(());
        }
        let anchor = self.anchor.ok_or_else(|| {
            anyhow!("no flag definition or '{SECTION_MARKER}' section to insert after")
        })?;
        let at = (anchor + 1).min(self.lines.len());
        debug!("inserting new flag {flag} at line {at}");
        self.lines.insert(at, render_flag_line(flag, true));
        for record in &mut self.flags {
            if record.line >= at {
                record.line += 1;
            }
        }
        if let Some(i) = &mut self.name_line {
            if *i >= at {
                *i += 1;
            }
        }
        self.flags.push(FlagRecord {
            name: flag.to_string(),
            enabled: true,
            line: at,
        });
        Ok(())
    }

    /// Names of the currently enabled flags, in file order.
    pub fn enabled(&self) -> Vec<String> {
        self.flags
            .iter()
            .filter(|r| r.enabled)
            .map(|r| r.name.clone())
            .collect()
    }

    /// Serializes back to disk, truncating the file. Flag lines are
    /// re-rendered in the fixed column format; everything else is written
    /// as loaded.
    pub fn save(&mut self, path: &Path) -> Result<()> {
        for record in &self.flags {
            self.lines[record.line] = render_flag_line(&record.name, record.enabled);
        }
        let mut content = self.lines.join("\n");
        content.push('\n');
        fs::write(path, content)
            .with_context(|| format!("failed to write configuration '{}'", path.display()))
    }
}

fn render_flag_line(name: &str, enabled: bool) -> String {
    let directive = format!("#define TEST_{name}_ENABLED");
    let width = VALUE_COLUMN.max(directive.len() + 1);
    format!("{directive:<width$}{}", u8::from(enabled))
}

/// Rewrites the configuration for one campaign group: sets the campaign
/// name, turns every known flag off, then turns on exactly `flags`,
/// introducing definitions for flags the file has never seen. A file with
/// no usable anchor is a configuration error the caller must treat as
/// fatal.
pub fn patch(path: &Path, campaign_name: &str, flags: &[String]) -> Result<()> {
    let mut config = ConfigFile::load(path)?;
    config.anchor().ok_or_else(|| {
        anyhow!(
            "configuration '{}' has no flag definitions and no '{SECTION_MARKER}' section",
            path.display()
        )
    })?;
    config.set_campaign_name(campaign_name);
    config.disable_all();
    for flag in flags {
        config.enable(flag)?;
    }
    config.save(path)
}

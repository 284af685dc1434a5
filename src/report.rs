/// Report generation for trajectory regressions
use crate::pipeline::PipelineContext;
use crate::trajectory::{ChannelStatus, ComparisonResult};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Regression report data
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionReport {
    pub simulation: String,
    pub reference: String,
    pub comparison: ComparisonResult,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl RegressionReport {
    pub fn new(simulation: String, reference: String, comparison: ComparisonResult) -> Self {
        Self {
            simulation,
            reference,
            comparison,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Report for a finished pipeline run, if it reached the Compare stage
    pub fn from_context(ctx: &PipelineContext, reference: &Path) -> Option<Self> {
        ctx.comparison.as_ref().map(|comparison| {
            Self::new(
                ctx.simulation.name().to_string(),
                reference.display().to_string(),
                comparison.clone(),
            )
        })
    }

    fn verdict_label(&self) -> &'static str {
        match self.comparison.passed() {
            Some(true) => "PASS",
            Some(false) => "FAIL",
            None => "NOT EVALUATED",
        }
    }

    /// Generate Markdown report
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Regression Report: {}\n\n", self.simulation));
        md.push_str(&format!(
            "**Generated:** {}\n\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Reference:** `{}`\n", self.reference));
        md.push_str(&format!(
            "- **Common Channels:** {}\n",
            self.comparison.common_channels.len()
        ));
        md.push_str(&format!("- **Verdict:** {}\n\n", self.verdict_label()));

        md.push_str("## Channels\n\n");
        match &self.comparison.verdict {
            Some(verdict) => {
                md.push_str("| Channel | RMS | Max | Tolerance | Status |\n");
                md.push_str("|---------|-----|-----|-----------|--------|\n");
                for ch in &verdict.channels {
                    md.push_str(&format!(
                        "| {} | {} | {} | {:e} | {} |\n",
                        ch.channel,
                        fmt_error(ch.rms),
                        fmt_error(ch.max),
                        ch.tolerance.rms,
                        ch.status
                    ));
                }
            }
            None => {
                md.push_str("| Channel | RMS | Max |\n");
                md.push_str("|---------|-----|-----|\n");
                for (channel, rms) in &self.comparison.rms {
                    md.push_str(&format!(
                        "| {} | {:.6e} | {} |\n",
                        channel,
                        rms,
                        fmt_error(self.comparison.max.get(channel).copied())
                    ));
                }
            }
        }
        md.push('\n');

        md
    }

    /// Generate JSON report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Generate plain text report
    pub fn to_text(&self) -> String {
        let mut text = String::new();

        text.push_str(&format!("REGRESSION REPORT: {}\n", self.simulation));
        text.push_str(&format!(
            "Generated: {}\n",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        ));
        text.push_str(&"=".repeat(80));
        text.push_str("\n\n");

        text.push_str("SUMMARY\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        text.push_str(&format!("Reference: {}\n", self.reference));
        text.push_str(&format!(
            "Common Channels: {}\n",
            self.comparison.common_channels.len()
        ));
        text.push_str(&format!("Verdict: {}\n\n", self.verdict_label()));

        text.push_str("CHANNELS\n");
        text.push_str(&"-".repeat(80));
        text.push('\n');
        match &self.comparison.verdict {
            Some(verdict) => {
                for ch in &verdict.channels {
                    text.push_str(&format!(
                        "{:20} rms {:>14}  max {:>14}  tol {:<12e} {}\n",
                        ch.channel,
                        fmt_error(ch.rms),
                        fmt_error(ch.max),
                        ch.tolerance.rms,
                        ch.status
                    ));
                }
            }
            None => {
                for (channel, rms) in &self.comparison.rms {
                    text.push_str(&format!(
                        "{:20} rms {:>14.6e}  max {:>14}\n",
                        channel,
                        rms,
                        fmt_error(self.comparison.max.get(channel).copied())
                    ));
                }
            }
        }
        text.push('\n');

        if let Some(verdict) = &self.comparison.verdict {
            let failures: Vec<_> = verdict.failures().collect();
            if !failures.is_empty() {
                text.push_str("FAILURES\n");
                text.push_str(&"-".repeat(80));
                text.push('\n');
                for ch in failures {
                    let reason = match ch.status {
                        ChannelStatus::Missing => "missing from one trajectory".to_string(),
                        _ => format!("exceeds tolerance {:e}", ch.tolerance.rms),
                    };
                    text.push_str(&format!("• {}: {}\n", ch.channel, reason));
                }
                text.push('\n');
            }
        }

        text
    }

    /// Render in the requested format
    pub fn render(&self, format: ReportFormat) -> Result<String> {
        Ok(match format {
            ReportFormat::Markdown => self.to_markdown(),
            ReportFormat::Json => self.to_json()?,
            ReportFormat::Text => self.to_text(),
        })
    }

    /// Save report to file
    pub fn save(&self, path: &Path, format: ReportFormat) -> Result<()> {
        std::fs::write(path, self.render(format)?)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Markdown,
    Json,
    Text,
}

fn fmt_error(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.6e}", v))
}

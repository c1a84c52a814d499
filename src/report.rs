use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use serde::Serialize;
use tracing::debug;

use crate::models::AnalysisResult;
use crate::orchestrator::RunOutput;
use crate::render::render_report_markdown;
use crate::scoring::RunSummary;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPaths {
    pub dir: PathBuf,
    pub run_number: u32,
    pub json: PathBuf,
    pub markdown: PathBuf,
}

#[derive(Serialize)]
struct ReportJson<'a> {
    date: &'a str,
    generated_at: &'a str,
    run_number: u32,
    summary: &'a RunSummary,
    results: &'a [AnalysisResult],
}

/// One past the highest `report_<n>.{json,md}` already in `dir`; 1 if none.
pub fn next_run_number(dir: &Path) -> Result<u32> {
    if !dir.exists() {
        return Ok(1);
    }
    let re = Regex::new(r"^report_(\d+)\.(?:json|md)$")?;
    let mut max = 0u32;
    for entry in std::fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let name = entry?.file_name();
        let Some(name) = name.to_str() else { continue };
        if let Some(n) = re
            .captures(name)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<u32>().ok())
        {
            max = max.max(n);
        }
    }
    Ok(max + 1)
}

/// Write `report_<n>.json` and `report_<n>.md` into `<output_dir>/<ymd>/`.
pub fn write_report(output_dir: &Path, ymd: &str, out: &RunOutput, generated_at: &str) -> Result<ReportPaths> {
    let dir = output_dir.join(ymd);
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    debug!("Output directory: {}", dir.display());

    let run_number = next_run_number(&dir)?;
    let json = dir.join(format!("report_{}.json", run_number));
    let markdown = dir.join(format!("report_{}.md", run_number));

    let doc = ReportJson {
        date: ymd,
        generated_at,
        run_number,
        summary: &out.summary,
        results: &out.ranked,
    };
    std::fs::write(&json, serde_json::to_vec_pretty(&doc)?).with_context(|| format!("writing {}", json.display()))?;
    debug!("Wrote {}", json.display());

    std::fs::write(&markdown, render_report_markdown(out, generated_at).as_bytes())
        .with_context(|| format!("writing {}", markdown.display()))?;
    debug!("Wrote {}", markdown.display());

    Ok(ReportPaths {
        dir,
        run_number,
        json,
        markdown,
    })
}

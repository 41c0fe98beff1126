//! CSV export of the result tables.

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use csv::Writer;

use crate::analyzer::AnalysisResult;
use crate::error::{Result, WaterMetalError};

/// One row per sample: per-metal Er, PERI, class and coverage.
pub fn write_risk_table<W: io::Write>(result: &AnalysisResult, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    let metals = &result.risk.scored_metals;

    let mut header = vec!["sample_id".to_string()];
    header.extend(metals.iter().map(|m| format!("{}_Er", m)));
    header.extend(["PERI", "class", "partial_coverage", "excluded"].map(String::from));
    wtr.write_record(&header)?;

    for r in &result.risk.results {
        let mut record = vec![r.sample_id.clone()];
        for metal in metals {
            record.push(
                r.metals
                    .get(metal)
                    .map(|m| format!("{:.4}", m.risk_factor))
                    .unwrap_or_default(),
            );
        }
        record.push(format!("{:.4}", r.index));
        record.push(r.class.label().to_string());
        record.push(r.partial_coverage.to_string());
        record.push(
            r.excluded
                .iter()
                .map(|e| e.metal.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        );
        wtr.write_record(&record)?;
    }

    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// One row per scored metal: total Er and share of the total.
pub fn write_metal_table<W: io::Write>(result: &AnalysisResult, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["metal", "total_risk", "percent"])?;
    for c in &result.contributions {
        wtr.write_record([
            c.metal.clone(),
            format!("{:.4}", c.total_risk),
            format!("{:.2}", c.percent),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// The full ranking with hotspot flags.
pub fn write_hotspot_table<W: io::Write>(result: &AnalysisResult, writer: W) -> Result<()> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(["rank", "sample_id", "PERI", "class", "hotspot"])?;
    for row in &result.hotspots.ranking {
        wtr.write_record([
            row.rank.to_string(),
            row.sample_id.clone(),
            format!("{:.4}", row.index),
            row.class.label().to_string(),
            row.hotspot.to_string(),
        ])?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Principal component scores per retained sample. Returns false when PCA
/// was skipped and nothing was written.
pub fn write_score_table<W: io::Write>(result: &AnalysisResult, writer: W) -> Result<bool> {
    let Some(ref pca) = result.pattern.pca else {
        return Ok(false);
    };

    let mut wtr = Writer::from_writer(writer);
    let mut header = vec!["sample_id".to_string()];
    header.extend(pca.components.iter().map(|pc| format!("PC{}", pc.number)));
    wtr.write_record(&header)?;

    for s in &pca.scores {
        let mut record = vec![s.sample_id.clone()];
        record.extend(s.scores.iter().map(|v| format!("{:.6}", v)));
        wtr.write_record(&record)?;
    }
    wtr.flush().map_err(csv::Error::from)?;
    Ok(true)
}

/// Write `<stem>_risk.csv`, `<stem>_metals.csv`, `<stem>_hotspots.csv` and,
/// when available, `<stem>_pca_scores.csv` into `dir`.
pub fn export_tables(result: &AnalysisResult, dir: &Path, stem: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).map_err(|e| WaterMetalError::Io {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut written = Vec::new();

    let path = dir.join(format!("{}_risk.csv", stem));
    write_risk_table(result, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("{}_metals.csv", stem));
    write_metal_table(result, create(&path)?)?;
    written.push(path);

    let path = dir.join(format!("{}_hotspots.csv", stem));
    write_hotspot_table(result, create(&path)?)?;
    written.push(path);

    if result.pattern.pca.is_some() {
        let path = dir.join(format!("{}_pca_scores.csv", stem));
        write_score_table(result, create(&path)?)?;
        written.push(path);
    }

    log::debug!("exported {} tables to {}", written.len(), dir.display());
    Ok(written)
}

fn create(path: &Path) -> Result<File> {
    File::create(path).map_err(|e| WaterMetalError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

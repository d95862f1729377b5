use crate::config::Settings;
use crate::ingest::DealSource;
use crate::normalize::normalize;
use crate::rank::rank;
use crate::render::{render, RenderOptions};
use crate::theme;
use anyhow::Context;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    NoData,
    FetchFailed,
    RenderFailed,
}

/// Result record handed to the notification collaborator. Every status
/// carries a valid caption; delivery and retry are the collaborator's
/// concern.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub status: RunStatus,
    pub artifact_path: Option<PathBuf>,
    pub caption: String,
}

pub const CAPTION_FETCH_FAILED: &str = "今日快餐优惠数据获取失败，请稍后重试。";
pub const CAPTION_NO_DATA: &str = "今日暂无监控到的快餐优惠活动。";
pub const CAPTION_RENDER_FAILED: &str = "今日快餐优惠海报生成失败，请稍后重试。";
pub const CAPTION_SUCCESS: &str = "为您奉上今日快餐优惠货比三家早报，请查阅。";

impl RunOutcome {
    fn fetch_failed() -> Self {
        Self {
            status: RunStatus::FetchFailed,
            artifact_path: None,
            caption: CAPTION_FETCH_FAILED.to_string(),
        }
    }

    fn no_data() -> Self {
        Self {
            status: RunStatus::NoData,
            artifact_path: None,
            caption: CAPTION_NO_DATA.to_string(),
        }
    }

    fn render_failed() -> Self {
        Self {
            status: RunStatus::RenderFailed,
            artifact_path: None,
            caption: CAPTION_RENDER_FAILED.to_string(),
        }
    }

    fn success(artifact_path: PathBuf) -> Self {
        Self {
            status: RunStatus::Success,
            artifact_path: Some(artifact_path),
            caption: CAPTION_SUCCESS.to_string(),
        }
    }
}

/// One full report run: fetch → normalize → rank → resolve theme → render →
/// write. Strictly sequential, stateless across runs, and total — every
/// failure class maps to a status, nothing escapes uncaught.
pub async fn run(settings: &Settings, source: &dyn DealSource, date: NaiveDate) -> RunOutcome {
    let raw_records = match source.fetch(&settings.brands).await {
        Ok(records) => records,
        Err(err) => {
            tracing::error!(source = source.source_name(), error = %err, "deal fetch failed");
            return RunOutcome::fetch_failed();
        }
    };

    let deals: Vec<_> = raw_records
        .into_iter()
        .map(|raw| normalize(raw, date))
        .collect();

    if deals.is_empty() {
        tracing::warn!(source = source.source_name(), %date, "no deals for today");
        return RunOutcome::no_data();
    }

    let (ordered, best_index) = rank(deals);
    let theme = theme::resolve(date);
    tracing::info!(
        %date,
        deals = ordered.len(),
        ?best_index,
        theme = theme.map(|t| t.name),
        "rendering poster"
    );

    let render_opts = RenderOptions {
        asset_dir: settings.asset_dir.clone(),
        font_path: settings.font_path.clone(),
    };
    let poster = match render(date, &ordered, best_index, theme.as_ref(), &render_opts) {
        Ok(poster) => poster,
        Err(err) => {
            tracing::error!(error = %err, stage = err.stage, "poster render failed");
            return RunOutcome::render_failed();
        }
    };

    let path = artifact_path(&settings.out_dir, date);
    if let Err(err) = write_artifact(&path, &poster.png) {
        // The artifact never made it to disk, which is a render-stage loss
        // from the collaborator's point of view.
        tracing::error!(path = %path.display(), error = %err, "failed to write poster");
        return RunOutcome::render_failed();
    }

    tracing::info!(path = %path.display(), width = poster.width, height = poster.height, "poster written");
    RunOutcome::success(path)
}

/// One file per run, keyed by the run date; a same-day rerun overwrites
/// (last writer wins).
pub fn artifact_path(out_dir: &Path, date: NaiveDate) -> PathBuf {
    out_dir.join(format!("dealpost_{}.png", date.format("%Y%m%d")))
}

fn write_artifact(path: &Path, png: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create dir {}", parent.display()))?;
    }
    std::fs::write(path, png).with_context(|| format!("write {}", path.display()))?;
    Ok(())
}

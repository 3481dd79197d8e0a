use crate::domain::model::PersistedRow;
use crate::domain::ports::{CountryStore, SummaryGenerator};
use crate::utils::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_IMAGE_PATH: &str = "cache/summary.png";
pub const DEFAULT_TOP_N: usize = 5;
/// Beyond this the bars get narrower than a pixel.
pub const MAX_TOP_N: usize = 50;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 400;
const MARGIN: u32 = 40;
const HEADER: u32 = 24;

const BACKGROUND: Rgb<u8> = Rgb([250, 250, 250]);
const AXIS: Rgb<u8> = Rgb([60, 60, 60]);
const PALETTE: [Rgb<u8>; 5] = [
    Rgb([31, 119, 180]),
    Rgb([255, 127, 14]),
    Rgb([44, 160, 44]),
    Rgb([214, 39, 40]),
    Rgb([148, 103, 189]),
];

#[derive(Debug, Clone, PartialEq)]
pub struct SummarySnapshot {
    pub total: usize,
    pub top: Vec<(String, f64)>,
    pub last_refreshed_at: Option<DateTime<Utc>>,
}

/// 依估算 GDP 取前 N 名；沒有估算值的國家不列入
pub fn snapshot(rows: &[PersistedRow], top_n: usize) -> SummarySnapshot {
    let mut ranked: Vec<(String, f64)> = rows
        .iter()
        .filter_map(|r| r.estimated_gdp.map(|gdp| (r.name.clone(), gdp)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    ranked.truncate(top_n);

    SummarySnapshot {
        total: rows.len(),
        top: ranked,
        last_refreshed_at: rows.iter().map(|r| r.last_refreshed_at).max(),
    }
}

fn fill_rect(img: &mut RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, color: Rgb<u8>) {
    for y in y0..y1.min(img.height()) {
        for x in x0..x1.min(img.width()) {
            img.put_pixel(x, y, color);
        }
    }
}

/// Bar chart of the top countries, tallest bar scaled to the plot height.
/// The header strip shows the share of countries that have an estimate.
pub fn render(snapshot: &SummarySnapshot) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    if snapshot.total > 0 {
        let ranked_share = snapshot.top.len() as f64 / snapshot.total as f64;
        let strip = ((WIDTH - 2 * MARGIN) as f64 * ranked_share.min(1.0)) as u32;
        fill_rect(&mut img, MARGIN, MARGIN / 2, MARGIN + strip, MARGIN / 2 + HEADER / 2, AXIS);
    }

    let baseline = HEIGHT - MARGIN;
    fill_rect(&mut img, MARGIN, baseline, WIDTH - MARGIN, baseline + 2, AXIS);

    let max = snapshot
        .top
        .iter()
        .map(|(_, gdp)| *gdp)
        .fold(0.0_f64, f64::max);
    if snapshot.top.is_empty() || max <= 0.0 {
        return img;
    }

    let plot_height = (baseline - MARGIN - HEADER) as f64;
    let slot = (WIDTH - 2 * MARGIN) / snapshot.top.len() as u32;
    let gap = slot / 5;

    for (i, (_, gdp)) in snapshot.top.iter().enumerate() {
        let bar = ((gdp / max) * plot_height).round().max(1.0) as u32;
        let x0 = MARGIN + i as u32 * slot + gap / 2;
        let x1 = x0 + slot - gap;
        fill_rect(&mut img, x0, baseline - bar, x1, baseline, PALETTE[i % PALETTE.len()]);
    }

    img
}

pub struct PngSummaryGenerator {
    store: Arc<dyn CountryStore>,
    path: PathBuf,
    top_n: usize,
}

impl PngSummaryGenerator {
    pub fn new(store: Arc<dyn CountryStore>, path: impl Into<PathBuf>) -> Self {
        Self {
            store,
            path: path.into(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n.clamp(1, MAX_TOP_N);
        self
    }
}

#[async_trait]
impl SummaryGenerator for PngSummaryGenerator {
    async fn generate(&self) -> Result<PathBuf> {
        let rows = self.store.list_all().await?;
        let snapshot = snapshot(&rows, self.top_n);
        tracing::debug!(
            "Rendering summary for {} countries ({} ranked)",
            snapshot.total,
            snapshot.top.len()
        );

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let img = render(&snapshot);
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || img.save_with_format(&path, ImageFormat::Png))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))??;

        tracing::info!("🖼️ Summary image saved to {}", self.path.display());
        Ok(self.path.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::sqlite::SqliteCountryStore;
    use crate::domain::model::ReconciledRecord;
    use chrono::TimeZone;

    fn row(id: i64, name: &str, gdp: Option<f64>) -> PersistedRow {
        PersistedRow {
            id,
            name: name.to_string(),
            capital: None,
            region: None,
            population: 1,
            currency_code: None,
            exchange_rate: None,
            estimated_gdp: gdp,
            flag_url: None,
            last_refreshed_at: Utc.with_ymd_and_hms(2025, 10, 20, 12, id as u32, 0).unwrap(),
        }
    }

    #[test]
    fn test_snapshot_ranks_by_gdp() {
        let rows = vec![
            row(1, "A", Some(10.0)),
            row(2, "B", None),
            row(3, "C", Some(30.0)),
            row(4, "D", Some(20.0)),
        ];

        let snap = snapshot(&rows, 2);
        assert_eq!(snap.total, 4);
        let names: Vec<_> = snap.top.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["C", "D"]);
        assert_eq!(
            snap.last_refreshed_at,
            Some(Utc.with_ymd_and_hms(2025, 10, 20, 12, 4, 0).unwrap())
        );
    }

    #[test]
    fn test_render_draws_tallest_bar_to_full_height() {
        let snap = snapshot(&[row(1, "A", Some(50.0)), row(2, "B", Some(100.0))], 5);
        let img = render(&snap);

        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));
        let slot = (WIDTH - 2 * MARGIN) / 2;
        let center = MARGIN + slot / 2;
        // 第一根是最大值，頂端應該在標題列下方
        assert_eq!(*img.get_pixel(center, MARGIN + HEADER + 1), PALETTE[0]);
        assert_eq!(*img.get_pixel(center + slot, MARGIN + HEADER + 1), BACKGROUND);
        assert_eq!(*img.get_pixel(center + slot, HEIGHT - MARGIN - 1), PALETTE[1]);
    }

    #[test]
    fn test_render_draws_every_bar_at_max_top_n() {
        let rows: Vec<_> = (1..=55)
            .map(|i| row(i, &format!("C{}", i), Some(1000.0 - i as f64)))
            .collect();
        let snap = snapshot(&rows, MAX_TOP_N);
        assert_eq!(snap.top.len(), MAX_TOP_N);

        let img = render(&snap);
        let slot = (WIDTH - 2 * MARGIN) / MAX_TOP_N as u32;
        assert!(slot > 0);
        let last = MARGIN + (MAX_TOP_N as u32 - 1) * slot + slot / 2;
        assert_ne!(*img.get_pixel(last, HEIGHT - MARGIN - 1), BACKGROUND);
    }

    #[test]
    fn test_top_n_is_capped() {
        let store = Arc::new(SqliteCountryStore::open_in_memory().unwrap());
        let generator = PngSummaryGenerator::new(store, "summary.png").with_top_n(721);
        assert_eq!(generator.top_n, MAX_TOP_N);
    }

    #[test]
    fn test_render_empty_catalog() {
        let img = render(&snapshot(&[], 5));
        assert_eq!(*img.get_pixel(WIDTH / 2, HEIGHT / 2), BACKGROUND);
    }

    #[tokio::test]
    async fn test_generate_writes_png() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("cache").join("summary.png");
        let store = Arc::new(SqliteCountryStore::open_in_memory().unwrap());
        store
            .upsert_at(
                &ReconciledRecord {
                    name: "Chad".to_string(),
                    capital: None,
                    region: Some("Africa".to_string()),
                    population: 16_425_859,
                    currency_code: Some("XAF".to_string()),
                    exchange_rate: Some(600.0),
                    estimated_gdp: Some(41_064_647.5),
                    flag_url: String::new(),
                },
                Utc::now(),
            )
            .unwrap();

        let generator = PngSummaryGenerator::new(store, &path).with_top_n(3);
        let written = generator.generate().await.unwrap();

        assert_eq!(written, path);
        let decoded = image::open(&path).unwrap();
        assert_eq!(decoded.width(), WIDTH);
        assert_eq!(decoded.height(), HEIGHT);
    }
}

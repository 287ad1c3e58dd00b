//! 行车记录仪视频导入

use std::path::Path;

use chrono::{Local, TimeZone};
use log::info;
use thiserror::Error;

use crate::core::config::{ConfigError, PipelineConfig};
use crate::core::glyph::{GlyphCatalog, GlyphError};
use crate::core::telemetry::{
    record_name, Rejection, TelemetryError, TelemetrySample, TelemetrySink, TelemetryValidator,
    Verdict,
};
use crate::core::video::{CharLine, OpenFrameSource, VideoError};
use crate::frame_extractor::{LineExtractor, TemporalSampler};

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Glyph error: {0}")]
    Glyph(#[from] GlyphError),
    #[error("Video error: {0}")]
    Video(#[from] VideoError),
    #[error("Telemetry error: {0}")]
    Telemetry(#[from] TelemetryError),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImportOutcome {
    Stored { record_name: String, samples: usize },
    Rejected(Rejection),
}

/// Everything read from one video, nothing stored.
#[derive(Debug, Clone)]
pub struct VideoInspection {
    pub lines: Vec<CharLine>,
    pub samples: Vec<TelemetrySample>,
    pub verdict: Verdict,
}

/// 视频导入器 - 采样 → 校验 → 入库
///
/// ```ignore
/// let importer = DashcamImporter::create(PipelineConfig::default(), Path::new("font.png"))?;
/// let outcome = importer.import_video(&opener, "RO/20240831090220_004709.TS", &mut sink)?;
/// ```
pub struct DashcamImporter<Tz: TimeZone = Local> {
    catalog: GlyphCatalog,
    sampler: TemporalSampler,
    validator: TelemetryValidator<Tz>,
}

impl DashcamImporter<Local> {
    /// Load the glyph reference and build an importer in local time.
    pub fn create(config: PipelineConfig, reference: &Path) -> Result<Self, ImportError> {
        crate::init_logging();
        info!("🚗 DashcamImporter: initializing with reference {:?}", reference);

        config.validate()?;
        let catalog = GlyphCatalog::from_path(reference, &config.layout)?;
        Ok(Self::with_parts(config, catalog, Local))
    }
}

impl<Tz: TimeZone> DashcamImporter<Tz> {
    pub fn with_parts(config: PipelineConfig, catalog: GlyphCatalog, tz: Tz) -> Self {
        Self {
            catalog,
            sampler: TemporalSampler::new(config.sampler),
            validator: TelemetryValidator::with_time_zone(config.validation, tz),
        }
    }

    pub fn catalog(&self) -> &GlyphCatalog {
        &self.catalog
    }

    /// Sample, validate and store one video.
    ///
    /// A video without any line is an error and is not marked as imported.
    /// An accepted video is marked even when none of its lines holds a fix.
    pub fn import_video<O, S>(
        &self,
        opener: &O,
        locator: &str,
        sink: &mut S,
    ) -> Result<ImportOutcome, ImportError>
    where
        O: OpenFrameSource + ?Sized,
        S: TelemetrySink + ?Sized,
    {
        let name = record_name(locator)?;
        let lines = self.read_lines(opener, locator)?;
        if lines.is_empty() {
            return Err(VideoError::NoLines(locator.to_string()).into());
        }

        if let Verdict::Rejected(reason) = self.validator.check_lines(locator, &lines)? {
            info!("🚫 Rejected {}: {}", locator, reason);
            return Ok(ImportOutcome::Rejected(reason));
        }

        let records = self.validator.records(&lines);
        sink.store_video(name, &records)?;
        info!("✅ Imported {} ({} points)", name, records.len());

        Ok(ImportOutcome::Stored {
            record_name: name.to_string(),
            samples: records.len(),
        })
    }

    /// Same reading and checks as `import_video`, without storing.
    pub fn inspect_video<O>(&self, opener: &O, locator: &str) -> Result<VideoInspection, ImportError>
    where
        O: OpenFrameSource + ?Sized,
    {
        let lines = self.read_lines(opener, locator)?;
        let verdict = self.validator.check_lines(locator, &lines)?;
        let samples = lines
            .iter()
            .map(|line| self.validator.convert_line(line))
            .collect();

        for line in &lines {
            info!("{}", line);
        }
        info!("🔎 {}: {} lines, {:?}", locator, lines.len(), verdict);

        Ok(VideoInspection {
            lines,
            samples,
            verdict,
        })
    }

    fn read_lines<O>(&self, opener: &O, locator: &str) -> Result<Vec<CharLine>, ImportError>
    where
        O: OpenFrameSource + ?Sized,
    {
        // Bad names fail before any decoding.
        self.validator.nominal_start(locator)?;

        let extractor = LineExtractor::new(&self.catalog);
        Ok(self.sampler.sample(opener, locator, &extractor)?)
    }
}

impl<Tz: TimeZone> Drop for DashcamImporter<Tz> {
    fn drop(&mut self) {
        info!("🗑️ DashcamImporter: released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    use chrono::Utc;
    use tempfile::TempDir;

    use crate::core::telemetry::MemorySink;
    use crate::core::video::{PacketInfo, ScriptedSource, TimeBase};
    use crate::test_support::{render_frame, render_reference, wide_layout};

    const POSITION: &str = " 100 __ _ _26 434600 _71 608715";

    struct ClipOpener {
        layout: crate::core::config::OverlayLayout,
        frames: i64,
        position: &'static str,
        opens: Cell<usize>,
    }

    impl ClipOpener {
        fn new() -> Self {
            Self::with_frames(30)
        }

        fn with_frames(frames: i64) -> Self {
            Self {
                layout: wide_layout(),
                frames,
                position: POSITION,
                opens: Cell::new(0),
            }
        }
    }

    impl OpenFrameSource for ClipOpener {
        type Source = ScriptedSource;

        /// 10 frames per second, overlay clock starting at 09:02:20.
        fn open(&self, _locator: &str) -> Result<ScriptedSource, VideoError> {
            self.opens.set(self.opens.get() + 1);
            let packets = (0..self.frames)
                .map(|pts| {
                    let secs = 20 + (pts + 3) / 10;
                    let clock = format!("{:>40}", format!("31 08 2024 09 02 {:02} ", secs));
                    let info = PacketInfo {
                        pts,
                        dts: pts,
                        keyframe: true,
                    };
                    (info, render_frame(&self.layout, self.position, &clock, pts))
                })
                .collect();
            Ok(ScriptedSource::new(TimeBase::new(1, 10), packets))
        }
    }

    fn config() -> PipelineConfig {
        PipelineConfig {
            layout: wide_layout(),
            ..Default::default()
        }
    }

    fn importer() -> DashcamImporter<Utc> {
        let layout = wide_layout();
        let catalog = GlyphCatalog::from_image(&render_reference(&layout), &layout).unwrap();
        DashcamImporter::with_parts(config(), catalog, Utc)
    }

    #[test]
    fn test_import_stores_accepted_video() {
        let opener = ClipOpener::new();
        let mut sink = MemorySink::new();

        let outcome = importer()
            .import_video(&opener, "file:RO/20240831090220_004709.TS", &mut sink)
            .unwrap();

        assert_eq!(
            outcome,
            ImportOutcome::Stored {
                record_name: "20240831090220_004709.TS".to_string(),
                samples: 4
            }
        );
        assert!(sink.contains("20240831090220_004709.TS"));
        let records: Vec<_> = sink.locations().copied().collect();
        let times: Vec<i64> = records.iter().map(|r| r.timestamp).collect();
        assert_eq!(
            times,
            vec![1_725_094_940, 1_725_094_941, 1_725_094_942, 1_725_094_943]
        );
        assert!((records[0].lat - 26.4346).abs() < 1e-9);
        assert!((records[0].lon + 71.608715).abs() < 1e-9);
    }

    #[test]
    fn test_rejected_video_not_stored() {
        let opener = ClipOpener::new();
        let mut sink = MemorySink::new();

        let outcome = importer()
            .import_video(&opener, "20240831085050_004709.TS", &mut sink)
            .unwrap();

        assert!(matches!(
            outcome,
            ImportOutcome::Rejected(Rejection::StartDrift { .. })
        ));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_second_import_replaces() {
        let opener = ClipOpener::new();
        let mut sink = MemorySink::new();
        let importer = importer();

        importer
            .import_video(&opener, "20240831090220_004709.TS", &mut sink)
            .unwrap();
        let outcome = importer
            .import_video(&opener, "other/20240831090220_004709.TS", &mut sink)
            .unwrap();

        assert!(matches!(outcome, ImportOutcome::Stored { samples: 4, .. }));
        assert_eq!(sink.imported_count(), 1);
        assert_eq!(sink.location_count(), 4);
    }

    #[test]
    fn test_video_without_lines_not_marked() {
        let opener = ClipOpener::with_frames(0);
        let mut sink = MemorySink::new();

        let result = importer().import_video(&opener, "20240831090220_004709.TS", &mut sink);

        assert!(matches!(
            result,
            Err(ImportError::Video(VideoError::NoLines(_)))
        ));
        assert_eq!(opener.opens.get(), 1);
        assert!(!sink.contains("20240831090220_004709.TS"));
        assert!(sink.is_empty());
    }

    #[test]
    fn test_accepted_video_without_fix_is_marked() {
        let opener = ClipOpener {
            position: "",
            ..ClipOpener::new()
        };
        let mut sink = MemorySink::new();

        let outcome = importer()
            .import_video(&opener, "20240831090220_004709.TS", &mut sink)
            .unwrap();

        assert!(matches!(outcome, ImportOutcome::Stored { samples: 0, .. }));
        assert!(sink.contains("20240831090220_004709.TS"));
        assert_eq!(sink.location_count(), 0);
    }

    #[test]
    fn test_bad_name_fails_before_open() {
        let opener = ClipOpener::new();
        let mut sink = MemorySink::new();

        let result = importer().import_video(&opener, "clip.TS", &mut sink);

        assert!(matches!(
            result,
            Err(ImportError::Telemetry(TelemetryError::InvalidSourceName(_)))
        ));
        assert_eq!(opener.opens.get(), 0);
    }

    #[test]
    fn test_inspect_does_not_store() {
        let opener = ClipOpener::new();

        let inspection = importer()
            .inspect_video(&opener, "20240831090220_004709.TS")
            .unwrap();

        assert_eq!(inspection.lines.len(), 4);
        assert_eq!(inspection.verdict, Verdict::Accepted);
        assert_eq!(inspection.samples.len(), 4);
        assert!(inspection.samples.iter().all(|s| s.point.valid));
        assert_eq!(inspection.samples[3].timestamp, Some(1_725_094_943));
    }

    #[test]
    fn test_create_from_reference_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("glyphs.png");
        render_reference(&wide_layout()).save(&path).unwrap();

        let importer = DashcamImporter::create(config(), &path).unwrap();

        assert_eq!(importer.catalog().len(), 11);
    }

    #[test]
    fn test_create_with_missing_reference() {
        let dir = TempDir::new().unwrap();

        let result = DashcamImporter::create(config(), &dir.path().join("missing.png"));

        assert!(matches!(result, Err(ImportError::Glyph(_))));
    }
}

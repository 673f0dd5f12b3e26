use deepcheck_lib::core::config::AnalysisLimits;
use deepcheck_lib::core::provenance::ReferenceLogo;
use deepcheck_lib::core::fusion::WeightProfile;
use deepcheck_lib::{
    AnalysisOutcome, AnalysisRequest, Analyzer, Axis, AxisReport, CancellationToken, DetectorConfig, Label,
    LogoStore, ProvenanceType, SampledFrame, TextHint, Verdict, VideoAnalyzer,
};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fs;
use std::thread;
use std::time::Duration;

const BACKGROUND: Rgba<u8> = Rgba([20, 140, 40, 255]);

fn sora_logo() -> RgbaImage {
    let mut img = RgbaImage::from_pixel(40, 20, Rgba([200, 30, 30, 255]));
    for x in 4..24 {
        for y in 8..12 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    for y in 3..17 {
        for x in 12..16 {
            img.put_pixel(x, y, Rgba([255, 255, 255, 255]));
        }
    }
    for y in 5..15 {
        for x in 28..36 {
            img.put_pixel(x, y, Rgba([30, 30, 220, 255]));
        }
    }
    img
}

/// 160x120 frames; the logo sits in the top-right corner of the frames where
/// `with_logo(i)` holds.
fn frames(count: usize, with_logo: impl Fn(usize) -> bool) -> Vec<SampledFrame> {
    let logo = sora_logo();
    (0..count)
        .map(|i| {
            let mut img = RgbaImage::from_pixel(160, 120, BACKGROUND);
            if with_logo(i) {
                for (x, y, px) in logo.enumerate_pixels() {
                    img.put_pixel(120 + x, y, *px);
                }
            }
            SampledFrame::from_image(i as u64 * 500, i as u64 * 15, img)
        })
        .collect()
}

fn config(workers: usize) -> DetectorConfig {
    DetectorConfig {
        limits: AnalysisLimits {
            worker_threads: workers,
            ..Default::default()
        },
        ..Default::default()
    }
}

fn sora_store() -> LogoStore {
    LogoStore::from_logos([ReferenceLogo {
        provider: "sora".to_string(),
        label: "sora_logo.png".to_string(),
        image: sora_logo(),
    }])
}

fn run(analyzer: &Analyzer, request: &AnalysisRequest) -> Verdict {
    match analyzer.analyze(request, &CancellationToken::new()) {
        AnalysisOutcome::Complete { verdict } => verdict,
        other => panic!("expected a verdict, got {other:?}"),
    }
}

fn reports(values: &[(Axis, f64)]) -> Vec<AxisReport> {
    values.iter().map(|(axis, v)| AxisReport::new(*axis, *v)).collect()
}

#[test]
fn test_clean_footage_is_authentic() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let request = AnalysisRequest::new(frames(6, |_| false)).with_axis_reports(reports(&[
        (Axis::Motion, 0.1),
        (Axis::Bio, 0.1),
        (Axis::Scene, 0.1),
        (Axis::Texture, 0.1),
    ]));
    let verdict = run(&analyzer, &request);

    assert_eq!(verdict.label, Label::Authentic);
    assert!(verdict.final_score <= 0.35);
    assert_eq!(verdict.provenance.kind, ProvenanceType::None);
    assert_eq!(verdict.weight_profile, WeightProfile::Default);
    assert!(!verdict.degraded);
}

#[test]
fn test_persistent_corner_logo_is_verified() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let request = AnalysisRequest::new(frames(10, |i| i < 8));
    let verdict = run(&analyzer, &request);

    assert_eq!(
        verdict.provenance.kind,
        ProvenanceType::VerifiedProvider("sora".to_string())
    );
    assert_eq!(verdict.provenance.generator_hint.as_deref(), Some("sora"));
    assert!((verdict.provenance.persistence_fraction - 0.8).abs() < 1e-9);
    assert!(verdict.provenance.confidence >= 0.8);
    assert_eq!(verdict.weight_profile, WeightProfile::ProvenanceDominant);
    assert_eq!(verdict.weights_used[&Axis::Provenance], 0.50);
    assert_eq!(verdict.label, Label::AiGenerated);
    assert!(verdict.final_score >= 0.70);
    assert_eq!(verdict.frames_analyzed, 10);
}

#[test]
fn test_logo_in_too_few_frames_is_not_verified() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let verdict = run(&analyzer, &AnalysisRequest::new(frames(10, |i| i < 3)));

    assert_eq!(verdict.provenance.kind, ProvenanceType::GenericOrUntrusted);
    assert!(verdict.provenance.confidence <= 0.30);
    assert_eq!(verdict.weight_profile, WeightProfile::Default);
}

#[test]
fn test_keyword_without_logo_is_generic() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let request = AnalysisRequest::new(frames(6, |_| false)).with_text_hint(TextHint::Text("sora.ai".to_string()));
    let verdict = run(&analyzer, &request);

    assert_eq!(verdict.provenance.kind, ProvenanceType::GenericOrUntrusted);
    assert_eq!(verdict.provenance.weight_recommendation, 0.15);
    assert_eq!(verdict.weight_profile, WeightProfile::Default);
    assert_eq!(verdict.weights_used[&Axis::Provenance], 0.05);
}

#[test]
fn test_several_strong_axes_force_ai_floor() {
    let analyzer = Analyzer::new(config(2), LogoStore::empty()).unwrap();
    let request = AnalysisRequest::new(frames(5, |_| false)).with_axis_reports(reports(&[
        (Axis::Motion, 0.75),
        (Axis::Bio, 0.72),
        (Axis::Scene, 0.20),
        (Axis::Texture, 0.71),
    ]));
    let verdict = run(&analyzer, &request);

    assert!(verdict.final_score >= 0.70);
    assert_eq!(verdict.label, Label::AiGenerated);
    assert!(verdict.explanations.iter().any(|e| e.starts_with("Holistic:")));
}

#[test]
fn test_semantic_boost_is_clamped() {
    let analyzer = Analyzer::new(config(2), LogoStore::empty()).unwrap();
    let request = AnalysisRequest::new(frames(5, |_| false))
        .with_text_hint(TextHint::Text("Made with Sora".to_string()))
        .with_subject("Kobe Bryant")
        .with_axis_reports(reports(&[
            (Axis::Motion, 0.9),
            (Axis::Bio, 0.9),
            (Axis::Scene, 0.9),
            (Axis::Texture, 0.9),
        ]));
    let verdict = run(&analyzer, &request);

    assert_eq!(verdict.semantic_boost.value, 0.30);
    assert_eq!(verdict.final_score, 1.0);
    assert_eq!(verdict.label, Label::AiGenerated);
}

#[test]
fn test_subject_without_ai_signal_gets_no_boost() {
    let analyzer = Analyzer::new(config(2), LogoStore::empty()).unwrap();
    let request = AnalysisRequest::new(frames(5, |_| false)).with_subject("Kobe Bryant");
    let verdict = run(&analyzer, &request);
    assert_eq!(verdict.semantic_boost.value, 0.0);
}

#[test]
fn test_verdict_independent_of_worker_count() {
    let request = AnalysisRequest::new(frames(12, |i| i % 4 != 0))
        .with_text_hint(TextHint::Text("sora".to_string()))
        .with_axis_reports(reports(&[(Axis::Motion, 0.4), (Axis::Texture, 0.6)]));

    let single = Analyzer::new(config(1), sora_store()).unwrap();
    let parallel = Analyzer::new(config(4), sora_store()).unwrap();

    let first = run(&single, &request);
    assert_eq!(first, run(&single, &request));
    assert_eq!(first, run(&parallel, &request));
}

#[test]
fn test_cancelled_run_has_no_verdict() {
    let analyzer = VideoAnalyzer::create(config(2), sora_store()).unwrap();
    let token = CancellationToken::new();
    token.cancel();
    let outcome = analyzer.analyze_with_token(&AnalysisRequest::new(frames(10, |_| true)), &token);

    assert!(matches!(outcome, AnalysisOutcome::Incomplete { frames_processed: 0, .. }));
    let json: serde_json::Value = serde_json::from_str(&outcome.to_json().unwrap()).unwrap();
    assert_eq!(json["status"], "incomplete");
}

#[test]
fn test_unreadable_frames_degrade_verdict() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let mut input = frames(2, |_| false);
    input.push(SampledFrame::rgba(2_000, 60, 160, 120, vec![0; 10]));
    let verdict = run(&analyzer, &AnalysisRequest::new(input));

    assert!(verdict.degraded);
    assert_eq!(verdict.frames_analyzed, 2);
    assert!(verdict.explanations.iter().any(|e| e.contains("buffer length 10")));
}

#[test]
fn test_verdict_json_shape() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let verdict = run(&analyzer, &AnalysisRequest::new(frames(10, |i| i < 8)));
    let json: serde_json::Value = serde_json::from_str(&verdict.to_json().unwrap()).unwrap();

    assert_eq!(json["label"], "AI_GENERATED");
    assert!(json["final_score"].as_f64().unwrap() >= 0.7);
    assert_eq!(json["weight_profile"], "provenance_dominant");
    assert_eq!(json["weights_used"]["provenance"], 0.5);
    assert!(json["axis_scores"]["motion"].is_number());
    assert!(json["axis_scores"]["provenance"].is_number());
    assert_eq!(json["provenance"]["type"], "verified_provider");
    assert_eq!(json["provenance"]["provider"], "sora");
    assert_eq!(json["semantic_boost"]["value"], 0.0);
    assert!(json["explanations"].as_array().unwrap().len() > 5);
}

#[test]
fn test_end_to_end_from_files() {
    let dir = tempfile::tempdir().unwrap();
    let logo_dir = dir.path().join("logos");
    fs::create_dir(&logo_dir).unwrap();
    sora_logo().save(logo_dir.join("sora_logo.png")).unwrap();
    let config_path = dir.path().join("detector.json5");
    fs::write(
        &config_path,
        r#"{
            // 只覆盖需要的字段
            limits: { worker_threads: 2 },
            lexicon: { sora: ["sora", "openai sora"] },
        }"#,
    )
    .unwrap();

    let analyzer = VideoAnalyzer::from_files(&config_path, &logo_dir).unwrap();
    let outcome = analyzer.analyze(&AnalysisRequest::new(frames(10, |i| i < 8)));
    let verdict = outcome.verdict().unwrap();

    assert!(verdict.provenance.kind.is_verified());
    assert_eq!(verdict.label, Label::AiGenerated);
    assert_eq!(analyzer.stats().frames_decoded, 10);
}

/// Frames where the watermark is smaller than its corner region and sits
/// `margin` pixels in from the top-right edges.
fn watermarked_frames(count: usize, width: u32, height: u32, logo_width: u32, margin: u32) -> Vec<SampledFrame> {
    let logo = imageops::resize(&sora_logo(), logo_width, logo_width / 2, FilterType::Triangle);
    (0..count)
        .map(|i| {
            let mut img = RgbaImage::from_pixel(width, height, BACKGROUND);
            let x0 = width - margin - logo.width();
            for (x, y, px) in logo.enumerate_pixels() {
                img.put_pixel(x0 + x, margin + y, *px);
            }
            SampledFrame::from_image(i as u64 * 500, i as u64 * 15, img)
        })
        .collect()
}

#[test]
fn test_watermark_smaller_than_corner_region_is_verified() {
    let analyzer = Analyzer::new(config(2), sora_store()).unwrap();
    let verdict = run(&analyzer, &AnalysisRequest::new(watermarked_frames(10, 640, 360, 80, 8)));

    assert_eq!(
        verdict.provenance.kind,
        ProvenanceType::VerifiedProvider("sora".to_string())
    );
    assert!(verdict.provenance.max_similarity >= 0.9);
    assert_eq!(verdict.provenance.persistence_fraction, 1.0);
    assert_eq!(verdict.weight_profile, WeightProfile::ProvenanceDominant);
    assert_eq!(verdict.label, Label::AiGenerated);
}

#[test]
fn test_end_card_watermark_survives_frame_cap() {
    let mut cfg = config(2);
    cfg.limits.max_frames = 10;
    let analyzer = Analyzer::new(cfg, sora_store()).unwrap();
    let verdict = run(&analyzer, &AnalysisRequest::new(frames(20, |i| i >= 16)));

    assert_eq!(verdict.frames_analyzed, 10);
    assert!(verdict.provenance.max_similarity > 0.9);
    assert_eq!(verdict.provenance.kind, ProvenanceType::GenericOrUntrusted);
}

#[test]
fn test_cancel_from_another_thread_mid_run() {
    let mut cfg = config(1);
    cfg.limits.max_frames = 300;
    let analyzer = VideoAnalyzer::create(cfg, sora_store()).unwrap();
    let request = AnalysisRequest::new(frames(300, |i| i % 2 == 0));

    let outcome = thread::scope(|s| {
        s.spawn(|| {
            thread::sleep(Duration::from_millis(30));
            analyzer.cancel();
        });
        analyzer.analyze(&request)
    });

    match outcome {
        AnalysisOutcome::Incomplete { frames_processed, .. } => assert!(frames_processed < 300),
        AnalysisOutcome::Complete { .. } => panic!("cancelled run produced a verdict"),
    }
    assert_eq!(analyzer.stats().analyses, 0);
}

use std::path::Path;

use crate::runner::BenchmarkResult;

/// A complete baseline containing results from all scenes.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Baseline {
    pub timestamp: String,
    pub results: Vec<BenchmarkResult>,
}

/// Load a baseline from a JSON file. Returns None if the file is missing or unreadable.
pub fn load_baseline(path: &Path) -> Option<Baseline> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_json::from_str(&contents) {
        Ok(baseline) => Some(baseline),
        Err(e) => {
            log::warn!("Ignoring malformed baseline {}: {e}", path.display());
            None
        }
    }
}

/// Save a baseline to a JSON file.
pub fn save_baseline(path: &Path, baseline: &Baseline) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(baseline).map_err(std::io::Error::other)?;
    std::fs::write(path, json)
}

/// A scene that got slower, or started rebuilding materials it did not
/// rebuild before.
#[derive(Debug, Clone, PartialEq)]
pub enum Regression {
    Slower { scene: String, pct: f64 },
    MoreRebuilds { scene: String, before: u64, after: u64 },
}

/// Compare current results against a baseline. Scenes missing from the
/// baseline are skipped.
pub fn compare(
    current: &[BenchmarkResult],
    baseline: &Baseline,
    threshold_pct: f64,
) -> Vec<Regression> {
    let mut regressions = Vec::new();

    for result in current {
        let Some(base) = baseline
            .results
            .iter()
            .find(|b| b.scene_name == result.scene_name)
        else {
            continue;
        };

        if base.timings.mean_ms > 0.0 {
            let pct =
                (result.timings.mean_ms - base.timings.mean_ms) / base.timings.mean_ms * 100.0;
            if pct > threshold_pct {
                regressions.push(Regression::Slower {
                    scene: result.scene_name.clone(),
                    pct,
                });
            }
        }
        // Rebuild counts are deterministic, so any increase is a regression.
        if result.rebuilds > base.rebuilds {
            regressions.push(Regression::MoreRebuilds {
                scene: result.scene_name.clone(),
                before: base.rebuilds,
                after: result.rebuilds,
            });
        }
    }

    regressions
}

/// Format results as a markdown summary table.
pub fn format_markdown(results: &[BenchmarkResult]) -> String {
    let mut out = String::new();
    out.push_str("| Scene | Frames | Rebuilds | Writes | Loads | Mean (ms) | Median (ms) | P95 (ms) | P99 (ms) | Min (ms) | Max (ms) |\n");
    out.push_str("|-------|--------|----------|--------|-------|-----------|-------------|----------|----------|----------|----------|\n");

    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} | {:.3} |\n",
            r.scene_name,
            r.frame_count,
            r.rebuilds,
            r.uniform_writes,
            r.texture_loads,
            r.timings.mean_ms,
            r.timings.median_ms,
            r.timings.p95_ms,
            r.timings.p99_ms,
            r.timings.min_ms,
            r.timings.max_ms,
        ));
    }

    out
}

/// Format a comparison report showing regressions.
pub fn format_comparison(regressions: &[Regression], threshold_pct: f64) -> String {
    if regressions.is_empty() {
        return format!(
            "All scenes within {:.0}% threshold. No regressions detected.\n",
            threshold_pct
        );
    }

    let mut out = String::new();
    out.push_str(&format!(
        "REGRESSIONS DETECTED (>{:.0}% threshold):\n",
        threshold_pct
    ));
    for regression in regressions {
        match regression {
            Regression::Slower { scene, pct } => {
                out.push_str(&format!("  - {}: +{:.1}%\n", scene, pct));
            }
            Regression::MoreRebuilds {
                scene,
                before,
                after,
            } => {
                out.push_str(&format!(
                    "  - {}: material rebuilds {} -> {}\n",
                    scene, before, after
                ));
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::compute_timings;

    fn result(scene: &str, mean: f64, rebuilds: u64) -> BenchmarkResult {
        BenchmarkResult {
            scene_name: scene.to_string(),
            frame_count: 1,
            rebuilds,
            uniform_writes: 0,
            texture_loads: 0,
            timings: compute_timings(&[mean]),
        }
    }

    fn baseline(results: Vec<BenchmarkResult>) -> Baseline {
        Baseline {
            timestamp: "t".into(),
            results,
        }
    }

    #[test]
    fn test_compare_flags_slowdown_over_threshold() {
        let base = baseline(vec![result("idle", 1.0, 0), result("drag", 1.0, 0)]);
        let current = [result("idle", 1.05, 0), result("drag", 1.5, 0)];
        let regressions = compare(&current, &base, 10.0);
        assert_eq!(regressions.len(), 1);
        match &regressions[0] {
            Regression::Slower { scene, pct } => {
                assert_eq!(scene, "drag");
                assert!((pct - 50.0).abs() < 1e-9);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_compare_flags_extra_rebuilds() {
        let base = baseline(vec![result("drag", 1.0, 0)]);
        let regressions = compare(&[result("drag", 1.0, 2)], &base, 10.0);
        assert_eq!(
            regressions,
            vec![Regression::MoreRebuilds {
                scene: "drag".into(),
                before: 0,
                after: 2
            }]
        );
        assert!(format_comparison(&regressions, 10.0).contains("0 -> 2"));
    }

    #[test]
    fn test_compare_skips_unknown_and_zero_baselines() {
        let base = baseline(vec![result("idle", 0.0, 0)]);
        let current = [result("idle", 3.0, 0), result("new-scene", 9.0, 5)];
        assert!(compare(&current, &base, 10.0).is_empty());
    }

    #[test]
    fn test_baseline_json_survives_disk() {
        let dir = std::env::temp_dir().join(format!("terrascope-bench-{}", std::process::id()));
        let path = dir.join("baseline.json");
        let saved = baseline(vec![result("idle", 0.5, 0)]);
        save_baseline(&path, &saved).unwrap();
        let loaded = load_baseline(&path).unwrap();
        assert_eq!(loaded.results.len(), 1);
        assert_eq!(loaded.results[0].scene_name, "idle");
        assert!(load_baseline(&dir.join("missing.json")).is_none());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_markdown_has_one_row_per_scene() {
        let table = format_markdown(&[result("idle", 1.0, 0), result("drag", 2.0, 1)]);
        assert_eq!(table.lines().count(), 4);
        assert!(table.contains("| drag | 1 | 1 |"));
    }
}

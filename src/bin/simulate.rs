use chrono::{SecondsFormat, Utc};
use clap::Parser;
use hexpaint::constants::TICK_MS;
use hexpaint::engine::GameEngine;
use hexpaint::hex::{hex_distance, Hex};
use hexpaint::types::{DeathCause, MotionState, OutputEvent, Phase, SessionConfig, Snapshot};
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashSet};
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Run a single custom scenario instead of the default battery.
    #[arg(long)]
    single: bool,
    #[arg(long)]
    seed: Option<u64>,
    /// Stop after clearing this many levels.
    #[arg(long)]
    levels: Option<u32>,
    /// Wall-clock budget of simulated minutes per scenario.
    #[arg(long)]
    minutes: Option<i32>,
    #[arg(long)]
    run_id: Option<String>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize)]
struct Scenario {
    name: String,
    seed: u32,
    #[serde(rename = "levelTarget")]
    level_target: u32,
    minutes: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum StopReason {
    LevelTarget,
    AdversaryContact,
    SpikeContact,
    TimeBudget,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioResultLine {
    scenario: String,
    seed: u32,
    reason: StopReason,
    #[serde(rename = "durationMs")]
    duration_ms: u64,
    #[serde(rename = "levelsCleared")]
    levels_cleared: u32,
    score: i64,
    #[serde(rename = "tilesPainted")]
    tiles_painted: usize,
    #[serde(rename = "maxCombo")]
    max_combo: u32,
    defeats: i32,
    #[serde(rename = "powerUps")]
    power_ups: i32,
    teleports: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct AnomalyRecord {
    tick: u64,
    message: String,
}

#[derive(Clone, Debug, Serialize)]
struct ScenarioRunResult {
    #[serde(flatten)]
    result: ScenarioResultLine,
    #[serde(rename = "anomalyRecords")]
    anomaly_records: Vec<AnomalyRecord>,
    finished_tick: u64,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(rename = "startedAt")]
    started_at: String,
    #[serde(rename = "finishedAt")]
    finished_at: String,
    #[serde(rename = "scenarioCount")]
    scenario_count: usize,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
    #[serde(rename = "averageDurationMs")]
    average_duration_ms: u64,
    #[serde(rename = "reasonCounts")]
    reason_counts: BTreeMap<String, usize>,
    scenarios: Vec<ScenarioResultLine>,
}

#[derive(Clone, Debug, Serialize)]
struct StructuredLogLine {
    timestamp: String,
    level: String,
    event: String,
    #[serde(rename = "runId")]
    run_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenario: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    seed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tick: Option<u64>,
    details: Value,
}

fn main() {
    let cli = Cli::parse();
    let scenarios = resolve_scenarios(&cli);
    let run_started_at = rfc3339_now();
    let seed_hint = scenarios.first().map(|scenario| scenario.seed).unwrap_or(0);
    let run_id = cli
        .run_id
        .clone()
        .unwrap_or_else(|| default_run_id(seed_hint));
    let mut has_anomaly = false;
    let mut scenario_results = Vec::new();
    let mut reason_counts: BTreeMap<String, usize> = BTreeMap::new();
    let mut total_duration_ms = 0u64;
    let mut total_anomalies = 0usize;

    for scenario in scenarios {
        emit_log(
            "info",
            "scenario_started",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            None,
            json!({
                "levelTarget": scenario.level_target,
                "minutes": scenario.minutes,
            }),
        );
        let scenario_run = run_scenario(&scenario);

        for anomaly in &scenario_run.anomaly_records {
            emit_log(
                "warn",
                "anomaly_detected",
                &run_id,
                Some(&scenario.name),
                Some(scenario.seed),
                Some(anomaly.tick),
                json!({
                    "message": anomaly.message,
                }),
            );
        }

        if !scenario_run.result.anomalies.is_empty() {
            has_anomaly = true;
        }
        total_anomalies += scenario_run.anomaly_records.len();
        total_duration_ms += scenario_run.result.duration_ms;
        *reason_counts
            .entry(stop_reason_key(scenario_run.result.reason))
            .or_insert(0) += 1;

        emit_log(
            "info",
            "scenario_finished",
            &run_id,
            Some(&scenario.name),
            Some(scenario.seed),
            Some(scenario_run.finished_tick),
            json!({
                "reason": scenario_run.result.reason,
                "durationMs": scenario_run.result.duration_ms,
                "levelsCleared": scenario_run.result.levels_cleared,
                "score": scenario_run.result.score,
                "anomalyCount": scenario_run.anomaly_records.len(),
            }),
        );

        println!(
            "{}",
            serde_json::to_string(&scenario_run.result).expect("scenario result should serialize")
        );
        scenario_results.push(scenario_run.result);
    }

    let run_finished_at = rfc3339_now();
    let summary = build_run_summary(
        run_id.clone(),
        run_started_at,
        run_finished_at,
        scenario_results,
        reason_counts,
        total_anomalies,
        total_duration_ms,
    );

    let mut summary_out_written: Option<String> = None;
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            emit_log(
                "error",
                "summary_write_failed",
                &run_id,
                None,
                None,
                None,
                json!({
                    "path": path.to_string_lossy(),
                    "error": error.to_string(),
                }),
            );
            std::process::exit(2);
        }
        summary_out_written = Some(path.to_string_lossy().to_string());
    }

    emit_log(
        "info",
        "run_finished",
        &run_id,
        None,
        None,
        None,
        json!({
            "scenarioCount": summary.scenario_count,
            "anomalyCount": summary.anomaly_count,
            "averageDurationMs": summary.average_duration_ms,
            "reasonCounts": summary.reason_counts,
            "summaryOut": summary_out_written,
        }),
    );

    if has_anomaly {
        std::process::exit(1);
    }
}

fn run_scenario(scenario: &Scenario) -> ScenarioRunResult {
    let mut engine = GameEngine::new(SessionConfig {
        seed: scenario.seed,
        ..SessionConfig::default()
    });

    let tick_budget = (scenario.minutes as u64 * 60_000) / TICK_MS;
    let mut max_combo = 0u32;
    let mut defeats = 0;
    let mut power_ups = 0;
    let mut teleports = 0;
    let mut death_cause: Option<DeathCause> = None;
    let mut anomalies = Vec::new();
    let mut anomaly_records = Vec::new();
    let mut anomaly_seen = HashSet::new();
    let mut last_tick = 0u64;
    let mut last_snapshot: Option<Snapshot> = None;
    let mut reason = StopReason::TimeBudget;

    for _ in 0..tick_budget {
        pilot(&mut engine);
        engine.step(TICK_MS);
        let snapshot = engine.build_snapshot(true);
        last_tick = snapshot.tick;

        max_combo = max_combo.max(snapshot.combo);
        for event in &snapshot.events {
            match event {
                OutputEvent::AdversaryDefeated { .. } => defeats += 1,
                OutputEvent::PowerUpActivated { .. } => power_ups += 1,
                OutputEvent::PlayerTeleported { .. } => teleports += 1,
                OutputEvent::PlayerDied { cause } => death_cause = Some(*cause),
                _ => {}
            }
        }
        for message in collect_snapshot_anomalies(&snapshot, last_snapshot.as_ref()) {
            push_anomaly(
                &mut anomalies,
                &mut anomaly_records,
                &mut anomaly_seen,
                snapshot.tick,
                message,
            );
        }

        if snapshot.phase == Phase::GameOver {
            reason = match death_cause {
                Some(DeathCause::Spike) => StopReason::SpikeContact,
                _ => StopReason::AdversaryContact,
            };
            last_snapshot = Some(snapshot);
            break;
        }
        if snapshot.level > scenario.level_target {
            reason = StopReason::LevelTarget;
            last_snapshot = Some(snapshot);
            break;
        }
        last_snapshot = Some(snapshot);
    }

    let final_snapshot = last_snapshot.unwrap_or_else(|| engine.build_snapshot(false));
    ScenarioRunResult {
        result: ScenarioResultLine {
            scenario: scenario.name.clone(),
            seed: scenario.seed,
            reason,
            duration_ms: final_snapshot.now_ms,
            levels_cleared: final_snapshot.level.saturating_sub(1),
            score: final_snapshot.score,
            tiles_painted: final_snapshot.painted_tiles,
            max_combo,
            defeats,
            power_ups,
            teleports,
            anomalies,
        },
        anomaly_records,
        finished_tick: last_tick,
    }
}

/// Scripted player: walk to the nearest unclaimed tile, grab the first perk
/// on offer. Dumb on purpose; the interesting behavior is in the engine.
fn pilot(engine: &mut GameEngine) {
    match engine.phase() {
        Phase::Playing => {
            if let Some(target) = nearest_unclaimed(engine) {
                engine.move_to(target);
            }
        }
        Phase::PerkSelection => {
            if let Some(perk) = engine.perk_offers().first().copied() {
                engine.choose_perk(perk);
            }
        }
        _ => {}
    }
}

fn nearest_unclaimed(engine: &GameEngine) -> Option<Hex> {
    let here = engine.player_hex();
    engine
        .unclaimed_hexes()
        .into_iter()
        .min_by_key(|hex| hex_distance(*hex, here))
}

fn collect_snapshot_anomalies(snapshot: &Snapshot, previous: Option<&Snapshot>) -> Vec<String> {
    let mut anomalies = Vec::new();
    if snapshot.painted_tiles > snapshot.paintable_tiles {
        anomalies.push(format!(
            "painted exceeds paintable: {}/{}",
            snapshot.painted_tiles, snapshot.paintable_tiles
        ));
    }
    if snapshot.paintable_tiles == 0 {
        anomalies.push("board has no paintable tiles".to_string());
    }
    if snapshot.score < 0 {
        anomalies.push(format!("negative score: {}", snapshot.score));
    }
    if snapshot.player.motion == MotionState::Idle && snapshot.player.jump_budget == 0 {
        anomalies.push("jump budget collapsed to zero".to_string());
    }
    if let Some(previous) = previous {
        if snapshot.score < previous.score {
            anomalies.push(format!(
                "score regressed: {} -> {}",
                previous.score, snapshot.score
            ));
        }
        if snapshot.level < previous.level {
            anomalies.push(format!(
                "level regressed: {} -> {}",
                previous.level, snapshot.level
            ));
        }
        if snapshot.adversaries.len() < previous.adversaries.len() {
            anomalies.push(format!(
                "adversary disappeared: {} -> {}",
                previous.adversaries.len(),
                snapshot.adversaries.len()
            ));
        }
    }
    if snapshot.collectibles.len() > 1 {
        anomalies.push(format!(
            "multiple collectibles alive: {}",
            snapshot.collectibles.len()
        ));
    }
    anomalies
}

fn resolve_scenarios(cli: &Cli) -> Vec<Scenario> {
    let seed = normalize_seed(cli.seed.unwrap_or_else(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64
    }));

    if cli.single || cli.levels.is_some() || cli.minutes.is_some() {
        let levels = cli.levels.unwrap_or(3).clamp(1, 50);
        return vec![Scenario {
            name: format!("custom-l{levels}"),
            seed,
            level_target: levels,
            minutes: cli.minutes.unwrap_or(5).clamp(1, 30),
        }];
    }

    vec![
        Scenario {
            name: "quick-check-l2".to_string(),
            seed,
            level_target: 2,
            minutes: 3,
        },
        Scenario {
            name: "progression-check-l5".to_string(),
            seed: normalize_seed(seed as u64 + 1),
            level_target: 5,
            minutes: 10,
        },
    ]
}

fn normalize_seed(seed: u64) -> u32 {
    seed as u32
}

fn push_anomaly(
    anomalies: &mut Vec<String>,
    anomaly_records: &mut Vec<AnomalyRecord>,
    anomaly_seen: &mut HashSet<String>,
    tick: u64,
    message: String,
) {
    anomaly_records.push(AnomalyRecord {
        tick,
        message: message.clone(),
    });
    if anomaly_seen.insert(message.clone()) {
        anomalies.push(message);
    }
}

fn default_run_id(seed: u32) -> String {
    format!("sim-{seed}-{}", Utc::now().timestamp_millis())
}

fn build_run_summary(
    run_id: String,
    started_at: String,
    finished_at: String,
    scenarios: Vec<ScenarioResultLine>,
    reason_counts: BTreeMap<String, usize>,
    anomaly_count: usize,
    total_duration_ms: u64,
) -> RunSummary {
    let scenario_count = scenarios.len();
    let average_duration_ms = if scenario_count == 0 {
        0
    } else {
        total_duration_ms / scenario_count as u64
    };
    RunSummary {
        run_id,
        started_at,
        finished_at,
        scenario_count,
        anomaly_count,
        average_duration_ms,
        reason_counts,
        scenarios,
    }
}

fn emit_log(
    level: &str,
    event: &str,
    run_id: &str,
    scenario: Option<&str>,
    seed: Option<u32>,
    tick: Option<u64>,
    details: Value,
) {
    let log_line = StructuredLogLine {
        timestamp: rfc3339_now(),
        level: level.to_string(),
        event: event.to_string(),
        run_id: run_id.to_string(),
        scenario: scenario.map(|value| value.to_string()),
        seed,
        tick,
        details,
    };
    eprintln!(
        "{}",
        serde_json::to_string(&log_line).expect("structured log should serialize")
    );
}

fn stop_reason_key(reason: StopReason) -> String {
    match reason {
        StopReason::LevelTarget => "level_target",
        StopReason::AdversaryContact => "adversary_contact",
        StopReason::SpikeContact => "spike_contact",
        StopReason::TimeBudget => "time_budget",
    }
    .to_string()
}

fn rfc3339_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Writes via a temp file in the same directory and renames into place, so
/// a crash mid-write never leaves a truncated summary.
fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let summary_text = serde_json::to_string_pretty(summary).expect("run summary should serialize");
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| "summary.json".to_string());
    let tmp_path = path.with_file_name(format!("{file_name}.{}.tmp", rand::random::<u32>()));
    std::fs::write(&tmp_path, summary_text)?;
    match std::fs::rename(&tmp_path, path) {
        Ok(()) => Ok(()),
        Err(error) => {
            let _ = std::fs::remove_file(&tmp_path);
            Err(error)
        }
    }
}

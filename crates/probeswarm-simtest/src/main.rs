//! Probe Swarm Headless Simulation Harness
//!
//! Runs the core engine in-process for a fixed number of ticks, prints a
//! periodic status line and checks swarm-wide invariants at the end.
//! No rendering, no networking.
//!
//! Usage:
//!   cargo run -p probeswarm-simtest
//!   cargo run -p probeswarm-simtest -- --ticks 20000 --seed 7 --verbose
//!   cargo run -p probeswarm-simtest -- --config swarm.json --json

use probeswarm_core::prelude::*;
use serde::Serialize;

// ── Command line ────────────────────────────────────────────────────────

struct Args {
    verbose: bool,
    json: bool,
    ticks: u64,
    interval: u64,
    seed: Option<u64>,
    config_path: Option<String>,
}

fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        verbose: false,
        json: false,
        ticks: 10_000,
        interval: 1_000,
        seed: None,
        config_path: None,
    };

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--verbose" => args.verbose = true,
            "--json" => args.json = true,
            "--ticks" => args.ticks = parse_number(&arg, iter.next())?,
            "--interval" => args.interval = parse_number(&arg, iter.next())?.max(1),
            "--seed" => args.seed = Some(parse_number(&arg, iter.next())?),
            "--config" => {
                args.config_path = Some(iter.next().ok_or("--config needs a path")?);
            }
            other => return Err(format!("unknown argument: {}", other)),
        }
    }
    Ok(args)
}

fn parse_number(flag: &str, value: Option<String>) -> Result<u64, String> {
    let value = value.ok_or_else(|| format!("{} needs a value", flag))?;
    value
        .parse()
        .map_err(|e| format!("{} {}: {}", flag, value, e))
}

fn load_config(args: &Args) -> Result<SimConfig, String> {
    let mut config = match &args.config_path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {}", path, e))?;
            SimConfig::from_json(&text).map_err(|e| e.to_string())?
        }
        None => SimConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

#[derive(Serialize)]
struct RunSummary {
    seed: u64,
    ticks: u64,
    probes: usize,
    research_labs: u32,
    probe_speed_researched: bool,
    treasury: Resources,
    delivered: Resources,
    stars: usize,
    depleted_stars: usize,
    passed: usize,
    failed: usize,
}

fn main() {
    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let default_filter = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    if !args.json {
        println!("=== Probe Swarm Simulation Harness ===\n");
    }

    let mut engine = match SimulationEngine::new(config.clone()) {
        Ok(engine) => engine,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    let mut results = Vec::new();
    results.extend(validate_galaxy(&engine, args.verbose));

    let initial_stock = engine.total_star_stock();
    let mut conservation_ok = true;
    let mut depletion_ok = true;
    let mut cap_ok = true;
    let mut last_depleted = engine.depleted_star_count();

    while engine.tick() < args.ticks {
        let step = args.interval.min(args.ticks - engine.tick());
        engine.advance(step);

        let mut accounted = engine.total_star_stock();
        accounted.add(&engine.cargo_in_transit());
        accounted.add(&engine.colony.stats.delivered);
        conservation_ok &= accounted == initial_stock;

        let depleted = engine.depleted_star_count();
        depletion_ok &= depleted >= last_depleted;
        last_depleted = depleted;

        cap_ok &= engine.probe_count() <= config.colony.max_probes;

        if !args.json {
            println!("{}", status_line(&engine));
        }
    }

    results.push(TestResult {
        name: "resources_conserved".into(),
        passed: conservation_ok,
        detail: "star stock + cargo + deliveries equals initial stock at every interval".into(),
    });
    results.push(TestResult {
        name: "depletion_terminal".into(),
        passed: depletion_ok,
        detail: format!("{} stars depleted, count never decreased", last_depleted),
    });
    results.push(TestResult {
        name: "population_cap".into(),
        passed: cap_ok,
        detail: format!(
            "{} probes, cap {}",
            engine.probe_count(),
            config.colony.max_probes
        ),
    });
    results.extend(validate_determinism(&config, args.verbose));

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;

    if args.json {
        let summary = RunSummary {
            seed: config.seed,
            ticks: engine.tick(),
            probes: engine.probe_count(),
            research_labs: engine.colony.research_labs,
            probe_speed_researched: engine.colony.probe_speed_researched,
            treasury: engine.colony.treasury,
            delivered: engine.colony.stats.delivered,
            stars: engine.star_count(),
            depleted_stars: last_depleted,
            passed,
            failed,
        };
        match serde_json::to_string_pretty(&summary) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("error: {}", e),
        }
    } else {
        println!();
        for r in &results {
            let icon = if r.passed { "✓" } else { "✗" };
            if !r.passed || args.verbose {
                println!("  {} {}: {}", icon, r.name, r.detail);
            }
        }
        println!(
            "\n=== RESULT: {}/{} passed, {} failed ===",
            passed,
            results.len(),
            failed
        );
    }

    if failed > 0 {
        std::process::exit(1);
    }
}

fn status_line(engine: &SimulationEngine) -> String {
    let colony = &engine.colony;
    let t = &colony.treasury;
    format!(
        "tick {:>7} | probes {:>3} | labs {:>2} | speed+ {} | M {:>6} G {:>6} E {:>6} R {:>5} | depleted {}/{}",
        engine.tick(),
        engine.probe_count(),
        colony.research_labs,
        if colony.probe_speed_researched { "yes" } else { "no " },
        t.minerals,
        t.gases,
        t.energy,
        t.research,
        engine.depleted_star_count(),
        engine.star_count(),
    )
}

// ── Galaxy ──────────────────────────────────────────────────────────────

fn validate_galaxy(engine: &SimulationEngine, verbose: bool) -> Vec<TestResult> {
    let config = &engine.config().galaxy;
    let snap = engine.snapshot();
    let mut results = Vec::new();

    results.push(TestResult {
        name: "galaxy_star_count".into(),
        passed: snap.stars.len() == config.star_count,
        detail: format!("{} of {} stars", snap.stars.len(), config.star_count),
    });

    let min_sq = config.min_star_distance * config.min_star_distance;
    let mut crowded = 0;
    for (i, a) in snap.stars.iter().enumerate() {
        for b in &snap.stars[i + 1..] {
            if a.position.distance_squared(&b.position) < min_sq {
                crowded += 1;
            }
        }
    }
    results.push(TestResult {
        name: "galaxy_spacing".into(),
        passed: crowded == 0,
        detail: format!(
            "{} pairs closer than {}",
            crowded, config.min_star_distance
        ),
    });

    let (lo, hi) = config.material_range;
    let out_of_range = snap
        .stars
        .iter()
        .filter(|s| {
            ResourceKind::MATERIALS
                .iter()
                .any(|&k| !(lo..=hi).contains(&s.stock.get(k)))
        })
        .count();
    results.push(TestResult {
        name: "galaxy_stock_ranges".into(),
        passed: out_of_range == 0,
        detail: format!("{} stars outside {}..={}", out_of_range, lo, hi),
    });

    if verbose {
        let stock = engine.total_star_stock();
        println!(
            "  galaxy: {} stars, stock M {} G {} E {} R {}",
            snap.stars.len(),
            stock.minerals,
            stock.gases,
            stock.energy,
            stock.research
        );
    }
    results
}

// ── Determinism ─────────────────────────────────────────────────────────

fn validate_determinism(config: &SimConfig, verbose: bool) -> Vec<TestResult> {
    const TICKS: u64 = 500;
    let run = || -> Option<String> {
        let mut engine = SimulationEngine::new(config.clone()).ok()?;
        engine.advance(TICKS);
        serde_json::to_string(&engine.snapshot()).ok()
    };

    let (a, b) = (run(), run());
    let passed = a.is_some() && a == b;
    if verbose {
        println!("  determinism: two {}-tick runs compared", TICKS);
    }
    vec![TestResult {
        name: "deterministic_replay".into(),
        passed,
        detail: format!("seed {} replayed for {} ticks", config.seed, TICKS),
    }]
}

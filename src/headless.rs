// ============================================================================
// headless.rs — LifeRewind
// Windowless batch runner: seeds a random soup and ticks the core for a
// fixed number of generations.
// ============================================================================

use std::time::Instant;

use crate::config::SandboxConfig;
use crate::metrics::GridStats;
use crate::playback::{Command, Sandbox};

#[derive(Clone, Debug)]
pub struct HeadlessConfig {
    pub generations: u32,
    pub soup_fill: f64,
    pub progress_interval: u32,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            generations: 1000,
            soup_fill: 0.3,
            progress_interval: 100,
        }
    }
}

pub fn run_headless(config: &SandboxConfig, headless: &HeadlessConfig) {
    let mut sandbox = Sandbox::new(config);
    let mut rng = rand::thread_rng();
    sandbox.sprinkle_with(&mut rng, headless.soup_fill);
    sandbox.tick(0.0, &[Command::Play]);

    let period = sandbox.simulate_period();
    let initial = GridStats::from_grid(sandbox.view().grid);
    log::info!(
        "Headless run started: {} generations on {}x{}, soup fill {:.0}% ({} live)",
        headless.generations,
        config.grid_width,
        config.grid_height,
        headless.soup_fill * 100.0,
        initial.population,
    );

    let started = Instant::now();
    for generation in 1..=headless.generations {
        // One simulated period per tick: exactly one generation each.
        sandbox.tick(period, &[]);

        if headless.progress_interval > 0 && generation % headless.progress_interval == 0 {
            let elapsed = started.elapsed().as_secs_f64().max(1e-6);
            let rate = generation as f64 / elapsed;
            let stats = GridStats::from_grid(sandbox.view().grid);
            log::info!(
                "Headless progress: {}/{} | {:.0} gen/s | population {} ({:.2}%)",
                generation,
                headless.generations,
                rate,
                stats.population,
                stats.density * 100.0,
            );
        }
    }

    let stats = GridStats::from_grid(sandbox.view().grid);
    log::info!(
        "Headless run finished in {:.2}s: final population {} ({:.2}%), {} frames retained",
        started.elapsed().as_secs_f64(),
        stats.population,
        stats.density * 100.0,
        sandbox.ring().len(),
    );
}

// ======================== Tests ========================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headless_run_retains_a_bounded_window() {
        let config = SandboxConfig {
            grid_width: 32,
            grid_height: 32,
            history_size: 8,
            simulate_period: 0.1,
            ..SandboxConfig::default()
        };
        let headless = HeadlessConfig {
            generations: 50,
            soup_fill: 0.3,
            progress_interval: 0,
        };
        run_headless(&config, &headless);
    }
}

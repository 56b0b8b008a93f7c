// ============================================================================
// main.rs — LifeRewind
// Entry point. Initializes logging, parses arguments, and dispatches to the
// windowed app or the headless runner.
// ============================================================================

mod app;
mod camera;
mod config;
mod grid;
mod headless;
mod history;
mod input;
mod metrics;
mod pipeline;
mod playback;
mod renderer;
mod ui;

use app::App;
use headless::HeadlessConfig;
use winit::event_loop::EventLoop;

fn main() {
    env_logger::init();

    let mut config = config::SandboxConfig::default();
    let mut headless: Option<HeadlessConfig> = None;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    eprintln!("--config requires a file path");
                    std::process::exit(2);
                };
                match config::load_config(&path) {
                    Ok(loaded) => {
                        log::info!("Loaded configuration from {}", path);
                        config = loaded;
                    }
                    Err(err) => {
                        eprintln!("Failed to load config {}: {}", path, err);
                        std::process::exit(2);
                    }
                }
            }
            "--headless" => {
                let Some(generations) = args.next().and_then(|n| n.parse().ok()) else {
                    eprintln!("--headless requires a generation count");
                    std::process::exit(2);
                };
                headless = Some(HeadlessConfig {
                    generations,
                    ..HeadlessConfig::default()
                });
            }
            "--help" | "-h" => {
                println!(
                    "liferewind [--config path.json] [--headless GENERATIONS]\n\
                     \n\
                     Interactive Game of Life sandbox with a scrubbable,\n\
                     bounded generation history."
                );
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                std::process::exit(2);
            }
        }
    }

    if let Some(headless_config) = headless {
        headless::run_headless(&config, &headless_config);
        return;
    }

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(winit::event_loop::ControlFlow::Poll);

    let mut app = App::new(config);
    event_loop.run_app(&mut app).unwrap();
}

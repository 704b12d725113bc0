mod app;
mod export;
mod label;
mod pattern;
mod renderer;
mod survey;
mod ui;

use std::env;

use winit::event_loop::EventLoop;

use survey::SurveyParams;

const USAGE: &str = "Usage: hancock <base> [N] [vertical_spacing]";

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        println!("{USAGE}");
        std::process::exit(1);
    }
    let base: u64 = args[1].parse().expect("base must be an integer");
    assert!(base >= 2, "base must be at least 2");
    let limit: u64 = if args.len() > 2 {
        args[2].parse().expect("N must be an integer")
    } else {
        survey::DEFAULT_LIMIT
    };
    let spacing: u32 = if args.len() > 3 {
        args[3].parse().expect("vertical_spacing must be an integer")
    } else {
        ui::DEFAULT_SPACING
    };

    log::info!("Hancock pattern explorer (base {base}, n = 1..={limit})");
    log::info!("Controls:");
    log::info!("  K           - Toggle pattern key");
    log::info!("  S           - Export snapshot");
    log::info!("  Escape      - Quit");
    log::info!("  Drag/Scroll - Pan / zoom the plot");
    log::info!("  Use the menu bar and sidebar to change survey parameters.");

    let event_loop = EventLoop::new().expect("Failed to create event loop");
    let mut app = app::App::new(SurveyParams::new(base, limit), spacing.max(1));
    event_loop.run_app(&mut app).expect("Event loop error");
}

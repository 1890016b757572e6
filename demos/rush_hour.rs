//! Rush Hour
//!
//! Five hall calls arrive one second apart, two of them flagged as priority.
//! The same calls are replayed under FCFS and PRIORITY queue modes to show
//! the difference in service order and waiting time.
//!
//! Run with: cargo run --example rush_hour

use liftsim::{ControllerBuilder, ControllerEvent, Direction, EventLog, QueueMode};
use std::time::Duration;
use tracing_subscriber::{fmt, EnvFilter};

const CALLS: [(i64, Direction, bool); 5] = [
    (4, Direction::Up, true),
    (2, Direction::Down, false),
    (3, Direction::Up, false),
    (0, Direction::Down, true),
    (1, Direction::Up, false),
];

fn simulate(mode: QueueMode) {
    let log = EventLog::new();
    let mut controller = ControllerBuilder::new()
        .queue_mode(mode)
        .sink(Box::new(log.clone()))
        .build()
        .unwrap();

    for (floor, direction, priority) in CALLS {
        controller.request_floor(floor, Some(direction), priority);
        controller.advance(Duration::from_secs(1));
    }
    controller.run_until_settled(Duration::from_secs(600));

    println!("{} mode:", mode);
    for event in log.events() {
        if let ControllerEvent::RequestCompleted {
            request,
            wait_time_seconds,
        } = event
        {
            println!(
                "  {} floor {}{} waited {}s",
                request.id,
                liftsim::outputs::floor_label(request.floor),
                if request.priority { " (priority)" } else { "" },
                wait_time_seconds
            );
        }
    }

    let stats = controller.stats();
    println!(
        "  average wait {:.1}s, {} floors traveled, finished after {:?}\n",
        stats.average_wait().unwrap_or(0.0),
        stats.floors_traveled,
        controller.history().duration().unwrap_or_default()
    );
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt().with_env_filter(filter).with_target(false).init();

    println!("=== Rush Hour ===\n");
    simulate(QueueMode::Fcfs);
    simulate(QueueMode::Priority);
    println!("=== Example Complete ===");
}

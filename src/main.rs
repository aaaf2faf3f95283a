//! Curve Bounce entry point
//!
//! Headless runner: loads a config (or uses the default bowl), ticks the scene
//! and logs contact events. Rendering belongs to the host application.
//!
//! Usage: `curve-bounce [CONFIG.json] [TICKS] [--realtime] [--dump-config]`

#[cfg(not(target_arch = "wasm32"))]
use curve_bounce::SimConfig;
#[cfg(not(target_arch = "wasm32"))]
use curve_bounce::consts::SIM_DT;
#[cfg(not(target_arch = "wasm32"))]
use curve_bounce::sim::SimEvent;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_TICKS: u64 = 240;

#[cfg(not(target_arch = "wasm32"))]
struct Args {
    config: Option<String>,
    ticks: u64,
    realtime: bool,
    dump_config: bool,
}

#[cfg(not(target_arch = "wasm32"))]
fn parse_args() -> Result<Args, String> {
    let mut args = Args {
        config: None,
        ticks: DEFAULT_TICKS,
        realtime: false,
        dump_config: false,
    };
    let mut positional = 0;
    for arg in std::env::args().skip(1) {
        match arg.as_str() {
            "--realtime" => args.realtime = true,
            "--dump-config" => args.dump_config = true,
            _ if arg.starts_with("--") => return Err(format!("unknown flag {arg}")),
            _ => {
                match positional {
                    0 => args.config = Some(arg),
                    1 => {
                        args.ticks = arg
                            .parse()
                            .map_err(|e| format!("invalid tick count {arg:?}: {e}"))?
                    }
                    _ => return Err(format!("unexpected argument {arg:?}")),
                }
                positional += 1;
            }
        }
    }
    Ok(args)
}

#[cfg(not(target_arch = "wasm32"))]
fn run(args: &Args) -> curve_bounce::CurveResult<()> {
    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    if args.dump_config {
        println!("{}", config.to_json()?);
        return Ok(());
    }

    let mut scene = config.build_scene()?;
    log::info!(
        "Simulating {} ball(s) against {} curve(s) for {} ticks at {} Hz",
        scene.bodies.len(),
        scene.curves.len(),
        args.ticks,
        config.tick_hz
    );

    let period = config.tick_duration()?;
    for tick in 0..args.ticks {
        for event in scene.step(SIM_DT) {
            match event {
                SimEvent::ContactBegan { ball_id, point } => {
                    log::info!("tick {tick}: ball {ball_id} hit curve at ({:.2}, {:.2})", point.x, point.y)
                }
                SimEvent::ContactEnded { ball_id } => log::debug!("tick {tick}: ball {ball_id} left curve"),
                SimEvent::DegenerateBounce { ball_id } => {
                    log::warn!("tick {tick}: ball {ball_id} touched curve with no bounce direction")
                }
            }
        }
        for ball in scene.balls() {
            log::debug!(
                "tick {tick}: ball {} at ({:.2}, {:.2}) v=({:.2}, {:.2})",
                ball.id,
                ball.center.x,
                ball.center.y,
                ball.velocity.x,
                ball.velocity.y
            );
        }
        if args.realtime {
            std::thread::sleep(period);
        }
    }

    for ball in scene.balls() {
        log::info!("ball {} final position ({:.2}, {:.2})", ball.id, ball.center.x, ball.center.y);
    }
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Curve Bounce (native) starting...");

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            log::error!("{e}");
            eprintln!("usage: curve-bounce [CONFIG.json] [TICKS] [--realtime] [--dump-config]");
            std::process::exit(2);
        }
    };

    if let Err(e) = run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is driven by the host page; no standalone wasm entry point
}
